//! AutoUpgrade download log classification
//!
//! The log announces each patch with a header line ("DATABASE RELEASE UPDATE
//! 19.27.0.0.250415", "OPatch ...") followed by one or more file lines of the
//! form `File: <name> - LOCATED <path>`. A header's category carries forward
//! to every following file line until the next recognized header.

use super::arch::Affinity;
use super::category::PackageCategory;
use super::defaults::{FILE_LABEL, LOCATION_MARKER, RELEASE_UPDATE_PHRASE};
use super::package_set::ArchPackageSets;
use log::{debug, trace};
use regex::Regex;
use std::sync::OnceLock;

/// Accumulator threaded through the line fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierState {
    pub current: PackageCategory,
    pub sets: ArchPackageSets,
}

impl ClassifierState {
    pub fn new(sets: ArchPackageSets) -> Self {
        Self {
            current: PackageCategory::Unknown,
            sets,
        }
    }
}

/// Pull the file name out of a `File: <name> - LOCATED ...` line
pub fn extract_filename(line: &str) -> Option<&str> {
    let label = line.find(FILE_LABEL)?;
    let rest = &line[label + FILE_LABEL.len()..];
    let end = rest.find(LOCATION_MARKER)?;
    let name = rest[..end].trim_matches(|c: char| c.is_whitespace() || c == '\r');
    if name.is_empty() { None } else { Some(name) }
}

/// Advance the classifier by one log line
pub fn step(mut state: ClassifierState, line: &str) -> ClassifierState {
    if !line.contains(LOCATION_MARKER) {
        if let Some(category) = PackageCategory::detect(line) {
            trace!("🏷️ Category {} from: {}", category, line.trim_end());
            state.current = category;
        }
        return state;
    }

    let Some(filename) = extract_filename(line) else {
        trace!("Skipping location line without file label: {}", line.trim_end());
        return state;
    };

    let targets = Affinity::of(filename).targets();
    if targets.is_empty() {
        debug!("⚠️ No architecture affinity for {filename}, skipping");
        return state;
    }

    for &arch in targets {
        let placement = state
            .sets
            .get_mut(arch)
            .assign(state.current, filename.to_string());
        trace!(
            "📦 {} [{}] {} -> {:?}",
            arch, state.current, filename, placement
        );
    }
    state
}

/// Classify log lines into the given per-architecture accumulators
pub fn classify<I, S>(lines: I, sets: ArchPackageSets) -> ArchPackageSets
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .fold(ClassifierState::new(sets), |state, line| {
            step(state, line.as_ref())
        })
        .sets
}

/// Classify a whole log text starting from empty package sets
pub fn classify_log(text: &str) -> ArchPackageSets {
    classify(text.lines(), ArchPackageSets::new())
}

// Constant pattern, covered by the extraction tests
#[allow(clippy::expect_used)]
fn version_token() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| Regex::new(r"^\d+(?:\.\d+){3,4}$").expect("version pattern compiles"))
}

/// Reduce a 5-component RU version to its first four components
pub fn normalize_release_update(version: &str) -> String {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() == 5 {
        parts[..4].join(".")
    } else {
        version.to_string()
    }
}

/// Find the release update identifier announced by the log
pub fn extract_release_update<I, S>(lines: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines.into_iter().find_map(|line| {
        let line = line.as_ref();
        let upper = line.to_ascii_uppercase();
        let at = upper.find(RELEASE_UPDATE_PHRASE)?;
        line[at + RELEASE_UPDATE_PHRASE.len()..]
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_ascii_digit()))
            .find(|token| version_token().is_match(token))
            .map(normalize_release_update)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patches::arch::Architecture;
    use crate::patches::package_set::SlotState;

    const SAMPLE_LOG: &str = "\
2025-04-20 10:00:01 Starting AutoUpgrade download
DATABASE RELEASE UPDATE 19.27.0.0.250415
File: p37642901_190000_Linux-x86-64.zip - LOCATED at /opt/stage/p37642901_190000_Linux-x86-64.zip
File: p37642901_190000_Linux-ARM-64.zip - LOCATED at /opt/stage/p37642901_190000_Linux-ARM-64.zip
OJVM RELEASE UPDATE 19.27.0.0.250415
File: p37499406_190000_Linux-x86-64.zip - LOCATED at /opt/stage
OPatch 12.2.0.1.46 for DB 19.0.0.0.0 (Apr 2025)
File: p6880880_190000_Linux-x86-64.zip - LOCATED at /opt/stage
File: p6880880_190000_Linux-ARM-64.zip - LOCATED at /opt/stage
JDK BUNDLE PATCH 19.0.0.0.250415
File: p37542054_190000_Linux-x86-64.zip - LOCATED at /opt/stage
DATAPUMP BUNDLE PATCH 19.27.0.0.0
File: p37777295_1927000DBRU_Generic.zip - LOCATED at /opt/stage
";

    #[test]
    fn test_sample_log() {
        let sets = classify_log(SAMPLE_LOG);

        let amd = &sets.amd64;
        assert_eq!(amd.patch.as_deref(), Some("p37642901_190000_Linux-x86-64.zip"));
        assert_eq!(amd.ojvm.as_deref(), Some("p37499406_190000_Linux-x86-64.zip"));
        assert_eq!(amd.opatch.as_deref(), Some("p6880880_190000_Linux-x86-64.zip"));
        assert_eq!(
            amd.jdk_patch.as_deref(),
            Some("p37542054_190000_Linux-x86-64.zip")
        );
        assert_eq!(amd.perl_patch, SlotState::Empty);
        assert_eq!(
            amd.oneoffs.iter().collect::<Vec<_>>(),
            vec!["p37777295_1927000DBRU_Generic.zip"]
        );

        let arm = &sets.arm64;
        assert_eq!(arm.patch.as_deref(), Some("p37642901_190000_Linux-ARM-64.zip"));
        assert_eq!(arm.ojvm, SlotState::Empty);
        assert_eq!(arm.opatch.as_deref(), Some("p6880880_190000_Linux-ARM-64.zip"));
        assert_eq!(
            arm.oneoffs.iter().collect::<Vec<_>>(),
            vec!["p37777295_1927000DBRU_Generic.zip"]
        );

        assert_eq!(
            extract_release_update(SAMPLE_LOG.lines()),
            Some("19.27.0.0".to_string())
        );
    }

    #[test]
    fn test_release_update_header_with_x86_file() {
        let log = "DATABASE RELEASE UPDATE 19.27.0.0.1\r\n\
                   File: p12345_190000_Linux-x86-64.zip - LOCATED at /stage\r\n";
        let sets = classify_log(log);
        assert_eq!(
            sets.amd64.patch.as_deref(),
            Some("p12345_190000_Linux-x86-64.zip")
        );
        assert!(sets.arm64.filenames().is_empty());
        assert_eq!(extract_release_update(log.lines()), Some("19.27.0.0".into()));
    }

    #[test]
    fn test_second_file_for_filled_slot_is_oneoff() {
        let log = "DATABASE RELEASE UPDATE 19.27.0.0.1
File: p1_190000_Linux-x86-64.zip - LOCATED at /stage
File: p2_190000_Linux-x86-64.zip - LOCATED at /stage";
        let sets = classify_log(log);
        assert_eq!(sets.amd64.patch.as_deref(), Some("p1_190000_Linux-x86-64.zip"));
        assert_eq!(
            sets.amd64.oneoffs.iter().collect::<Vec<_>>(),
            vec!["p2_190000_Linux-x86-64.zip"]
        );
    }

    #[test]
    fn test_file_before_any_header_is_oneoff() {
        let log = "File: p99_190000_Linux-x86-64.zip - LOCATED at /stage
DATABASE RELEASE UPDATE 19.27.0.0.1";
        let sets = classify_log(log);
        assert_eq!(sets.amd64.patch, SlotState::Empty);
        assert_eq!(
            sets.amd64.oneoffs.iter().collect::<Vec<_>>(),
            vec!["p99_190000_Linux-x86-64.zip"]
        );
    }

    #[test]
    fn test_category_carries_over_unrecognized_lines() {
        let log = "OJVM RELEASE UPDATE 19.27.0.0.250415
Checking download status ...
File: p5_190000_Linux-x86-64.zip - LOCATED at /stage";
        let sets = classify_log(log);
        assert_eq!(sets.amd64.ojvm.as_deref(), Some("p5_190000_Linux-x86-64.zip"));
    }

    #[test]
    fn test_generic_file_lands_in_both_sets() {
        let log = "PERL BUNDLE PATCH 19.0.0.0.250415
File: p7_190000_Generic.zip - LOCATED at /stage";
        let sets = classify_log(log);
        for arch in Architecture::ALL {
            assert_eq!(
                sets.get(arch).perl_patch.as_deref(),
                Some("p7_190000_Generic.zip")
            );
        }
    }

    #[test]
    fn test_duplicate_file_lines_suppressed() {
        let log = "DATAPUMP BUNDLE PATCH
File: a_Generic.zip - LOCATED
File: b_Generic.zip - LOCATED
File: a_Generic.zip - LOCATED";
        let sets = classify_log(log);
        assert_eq!(
            sets.arm64.oneoffs.iter().collect::<Vec<_>>(),
            vec!["a_Generic.zip", "b_Generic.zip"]
        );
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(
            extract_filename("  File:  p1_Generic.zip\r - LOCATED at /x"),
            Some("p1_Generic.zip")
        );
        assert_eq!(extract_filename("File: - LOCATED"), None);
        assert_eq!(extract_filename("p1_Generic.zip - LOCATED"), None);
    }

    #[test]
    fn test_release_update_versions() {
        assert_eq!(normalize_release_update("19.27.0.0.250415"), "19.27.0.0");
        assert_eq!(normalize_release_update("19.27.0.0"), "19.27.0.0");
        assert_eq!(
            extract_release_update(["Database Release Update : 19.26.0.0"]),
            Some("19.26.0.0".to_string())
        );
        assert_eq!(
            extract_release_update(["DATABASE RELEASE UPDATE (19.25.0.0.241015)"]),
            Some("19.25.0.0".to_string())
        );
        assert_eq!(extract_release_update(["DATABASE RELEASE UPDATE 19.27"]), None);
        assert_eq!(extract_release_update(["OJVM RELEASE UPDATE 19.27.0.0.1"]), None);
    }

    #[test]
    fn test_version_token_shapes() {
        assert!(version_token().is_match("19.27.0.0"));
        assert!(version_token().is_match("19.27.0.0.250415"));
        assert!(!version_token().is_match("19.27.0"));
        assert!(!version_token().is_match("19.27.0.0.1.2"));
        assert!(!version_token().is_match("19.x.0.0"));
    }

    #[test]
    fn test_first_release_update_wins() {
        let lines = [
            "noise",
            "DATABASE RELEASE UPDATE 19.26.0.0.250121",
            "DATABASE RELEASE UPDATE 19.27.0.0.250415",
        ];
        assert_eq!(extract_release_update(lines), Some("19.26.0.0".to_string()));
    }
}
