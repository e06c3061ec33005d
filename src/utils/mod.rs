//! Utility functions for oraimage

pub mod atomic;

use std::env;
use std::path::PathBuf;

pub use atomic::{copy_atomic, ensure_writable_target, write_atomic};

/// Check if an environment variable is set to a truthy value
/// Accepts: "1", "true", "on", "yes", "t" (case insensitive)
pub fn is_env_true(key: &str) -> bool {
    match env::var(key) {
        Ok(val) => {
            let val_lower = val.to_lowercase();
            matches!(val_lower.as_str(), "1" | "true" | "on" | "yes" | "t")
        }
        Err(_) => false,
    }
}

/// Read a non-empty environment variable
pub fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Read a non-empty environment variable as a path
pub fn env_path(key: &str) -> Option<PathBuf> {
    env_non_empty(key).map(PathBuf::from)
}

/// Normalized name of the host CPU architecture ("amd64", "arm64", ...)
pub fn host_arch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_env_true_unset() {
        assert!(!is_env_true("ORAIMAGE_TEST_SURELY_UNSET_VARIABLE"));
    }

    #[test]
    fn test_env_non_empty_unset() {
        assert_eq!(env_non_empty("ORAIMAGE_TEST_SURELY_UNSET_VARIABLE"), None);
        assert_eq!(env_path("ORAIMAGE_TEST_SURELY_UNSET_VARIABLE"), None);
    }

    #[test]
    fn test_host_arch_is_normalized() {
        let arch = host_arch();
        assert_ne!(arch, "x86_64");
        assert_ne!(arch, "aarch64");
    }
}
