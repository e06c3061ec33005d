//! Target CPU architectures and file name affinity

use super::defaults::{SUFFIX_AMD64, SUFFIX_ARM64, SUFFIX_GENERIC};
use crate::exceptions::OraImageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    Amd64,
    Arm64,
}

impl Architecture {
    /// Every supported architecture, in manifest generation order
    pub const ALL: [Architecture; 2] = [Architecture::Amd64, Architecture::Arm64];

    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Architecture of the machine running the tool, if supported
    pub fn host() -> Option<Self> {
        crate::utils::host_arch().parse().ok()
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = OraImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" | "x86-64" => Ok(Architecture::Amd64),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            other => Err(OraImageError::ConfigError(format!(
                "Unknown architecture: {other}"
            ))),
        }
    }
}

/// Which package sets a file name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Arm64,
    Amd64,
    Generic,
    None,
}

impl Affinity {
    /// Classify a patch file name by its platform suffix
    pub fn of(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        let table = [
            (SUFFIX_ARM64, Affinity::Arm64),
            (SUFFIX_AMD64, Affinity::Amd64),
            (SUFFIX_GENERIC, Affinity::Generic),
        ];
        table
            .iter()
            .find(|(suffix, _)| lower.ends_with(&suffix.to_ascii_lowercase()))
            .map(|(_, affinity)| *affinity)
            .unwrap_or(Affinity::None)
    }

    /// Architectures whose package sets receive the file
    pub fn targets(self) -> &'static [Architecture] {
        match self {
            Affinity::Arm64 => &[Architecture::Arm64],
            Affinity::Amd64 => &[Architecture::Amd64],
            Affinity::Generic => &Architecture::ALL,
            Affinity::None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_by_suffix() {
        assert_eq!(
            Affinity::of("p12345_190000_Linux-x86-64.zip"),
            Affinity::Amd64
        );
        assert_eq!(
            Affinity::of("p12345_190000_Linux-ARM-64.zip"),
            Affinity::Arm64
        );
        assert_eq!(Affinity::of("p6880880_190000_Generic.zip"), Affinity::Generic);
        assert_eq!(Affinity::of("p12345_190000_LINUX-X86-64.ZIP"), Affinity::Amd64);
        assert_eq!(Affinity::of("p12345_190000_SOLARIS64.zip"), Affinity::None);
    }

    #[test]
    fn test_generic_targets_both() {
        assert_eq!(Affinity::Generic.targets(), &Architecture::ALL);
        assert!(Affinity::None.targets().is_empty());
    }

    #[test]
    fn test_parse_architecture() {
        assert_eq!("AMD64".parse::<Architecture>().unwrap(), Architecture::Amd64);
        assert_eq!("aarch64".parse::<Architecture>().unwrap(), Architecture::Arm64);
        assert!("sparc".parse::<Architecture>().is_err());
        assert_eq!(Architecture::Arm64.to_string(), "arm64");
    }
}
