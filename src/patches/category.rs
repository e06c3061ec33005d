//! Patch categories and the header phrase table that detects them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of patch announced by an AutoUpgrade log header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageCategory {
    /// Database release update; fills the `patch` slot
    BaseRelease,
    OjvmReleaseUpdate,
    OPatch,
    JdkBundlePatch,
    PerlBundlePatch,
    /// Recognized as a patch but of no dedicated kind
    OtherPatch,
    Unknown,
}

/// Header phrases in priority order. Specific phrases must precede the
/// generic `PATCH`, which they all contain or resemble.
const CATEGORY_PHRASES: &[(&str, PackageCategory)] = &[
    ("DATABASE RELEASE UPDATE", PackageCategory::BaseRelease),
    ("OJVM RELEASE UPDATE", PackageCategory::OjvmReleaseUpdate),
    ("OPATCH", PackageCategory::OPatch),
    ("JDK BUNDLE PATCH", PackageCategory::JdkBundlePatch),
    ("PERL BUNDLE PATCH", PackageCategory::PerlBundlePatch),
    ("PATCH", PackageCategory::OtherPatch),
];

impl PackageCategory {
    /// Classify a header line; `None` when no phrase matches
    pub fn detect(line: &str) -> Option<Self> {
        let upper = line.to_ascii_uppercase();
        CATEGORY_PHRASES
            .iter()
            .find(|(phrase, _)| upper.contains(phrase))
            .map(|(_, category)| *category)
    }

    /// True for categories that own a single manifest slot
    pub fn has_slot(self) -> bool {
        !matches!(self, PackageCategory::OtherPatch | PackageCategory::Unknown)
    }
}

impl fmt::Display for PackageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageCategory::BaseRelease => "database release update",
            PackageCategory::OjvmReleaseUpdate => "OJVM release update",
            PackageCategory::OPatch => "OPatch",
            PackageCategory::JdkBundlePatch => "JDK bundle patch",
            PackageCategory::PerlBundlePatch => "Perl bundle patch",
            PackageCategory::OtherPatch => "other patch",
            PackageCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert_eq!(
            PackageCategory::detect("Database Release Update 19.27.0.0.250415"),
            Some(PackageCategory::BaseRelease)
        );
        assert_eq!(
            PackageCategory::detect("OJVM RELEASE UPDATE 19.27.0.0.250415"),
            Some(PackageCategory::OjvmReleaseUpdate)
        );
        assert_eq!(
            PackageCategory::detect("OPatch 12.2.0.1.46 for DB 19.0.0.0.0"),
            Some(PackageCategory::OPatch)
        );
        assert_eq!(
            PackageCategory::detect("JDK BUNDLE PATCH 19.0.0.0.250415"),
            Some(PackageCategory::JdkBundlePatch)
        );
        assert_eq!(
            PackageCategory::detect("PERL BUNDLE PATCH 19.0.0.0.250415"),
            Some(PackageCategory::PerlBundlePatch)
        );
        assert_eq!(
            PackageCategory::detect("DATAPUMP BUNDLE PATCH 19.27.0.0.0"),
            Some(PackageCategory::OtherPatch)
        );
    }

    #[test]
    fn test_unrecognized_line() {
        assert_eq!(PackageCategory::detect("Downloading files to /opt/stage"), None);
        assert_eq!(PackageCategory::detect(""), None);
    }

    #[test]
    fn test_slot_ownership() {
        assert!(PackageCategory::OPatch.has_slot());
        assert!(!PackageCategory::OtherPatch.has_slot());
        assert!(!PackageCategory::Unknown.has_slot());
    }
}
