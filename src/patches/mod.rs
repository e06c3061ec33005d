//! Oracle patch handling: log classification, manifests, staging, inventories

pub mod arch;
pub mod category;
pub mod classifier;
pub mod cli;
pub mod defaults;
pub mod inventory;
pub mod manifest;
pub mod package_set;
pub mod paths;
pub mod stager;

pub use arch::{Affinity, Architecture};
pub use category::PackageCategory;
pub use classifier::{classify, classify_log, extract_release_update};
pub use manifest::{PackageManifest, write_manifest};
pub use package_set::{ArchPackageSets, PackageSet, Placement, SlotState};
pub use stager::{BuildStager, ResolutionWarning, StageOptions, StageReport, clean_stage};
