//! Standard exit codes for oraimage binaries
//!
//! Shared by the manifest generator, the stager and the inventory tool so
//! that wrapper scripts can tell failure classes apart.

use crate::exceptions::OraImageError;

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Invalid command-line arguments
pub const EXIT_INVALID_ARGS: i32 = 105;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 106;

/// Configuration error (missing directories, unreadable input log)
pub const EXIT_CONFIG_ERROR: i32 = 109;

/// Release update version missing from the log
pub const EXIT_PARSE_ERROR: i32 = 111;

/// Output exists and --force was not given
pub const EXIT_CONFLICT_ERROR: i32 = 112;

/// Atomic write failed
pub const EXIT_WRITE_ERROR: i32 = 113;

/// Staging finished but some files were not found (--strict only)
pub const EXIT_UNRESOLVED_FILES: i32 = 114;

/// Map an error to the exit code reported by the binaries
pub fn exit_code_for(err: &OraImageError) -> i32 {
    match err {
        OraImageError::ConfigError(_) => EXIT_CONFIG_ERROR,
        OraImageError::ParseError(_) => EXIT_PARSE_ERROR,
        OraImageError::ConflictError(_) => EXIT_CONFLICT_ERROR,
        OraImageError::WriteError { .. } => EXIT_WRITE_ERROR,
        OraImageError::IoError(_) => EXIT_IO_ERROR,
        OraImageError::JsonError(_) | OraImageError::Generic(_) => EXIT_ERROR,
    }
}
