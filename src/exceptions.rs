//! Error types for oraimage

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for manifest generation, staging and inventories
#[derive(Debug)]
pub enum OraImageError {
    /// Bad or missing directories, input files or arguments
    ConfigError(String),

    /// Release update version could not be extracted from the log
    ParseError(String),

    /// Output file already exists and overwriting was not requested
    ConflictError(PathBuf),

    /// Atomic write (temp file + rename) failed
    WriteError { path: PathBuf, source: io::Error },

    /// IO error
    IoError(io::Error),

    /// JSON serialization error
    JsonError(serde_json::Error),

    /// Generic error with message
    Generic(String),
}

impl OraImageError {
    /// Wrap an IO error that happened while producing `path`
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OraImageError::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for OraImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OraImageError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            OraImageError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            OraImageError::ConflictError(path) => write!(
                f,
                "Output already exists: {} (use --force to overwrite)",
                path.display()
            ),
            OraImageError::WriteError { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
            OraImageError::IoError(err) => write!(f, "IO error: {err}"),
            OraImageError::JsonError(err) => write!(f, "JSON error: {err}"),
            OraImageError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for OraImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OraImageError::WriteError { source, .. } => Some(source),
            OraImageError::IoError(err) => Some(err),
            OraImageError::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for OraImageError {
    fn from(err: io::Error) -> Self {
        OraImageError::IoError(err)
    }
}

impl From<serde_json::Error> for OraImageError {
    fn from(err: serde_json::Error) -> Self {
        OraImageError::JsonError(err)
    }
}

impl From<glob::PatternError> for OraImageError {
    fn from(err: glob::PatternError) -> Self {
        OraImageError::ConfigError(format!("Invalid log file pattern: {err}"))
    }
}

/// Result type for oraimage operations
pub type Result<T> = std::result::Result<T, OraImageError>;
