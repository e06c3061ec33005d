// Centralized default values for log parsing, manifests and staging

// =================================
// AutoUpgrade download log tokens
// =================================
pub const FILE_LABEL: &str = "File:";
pub const LOCATION_MARKER: &str = "- LOCATED";
pub const RELEASE_UPDATE_PHRASE: &str = "DATABASE RELEASE UPDATE";

// =================================
// Patch file name suffixes (matched case-insensitively)
// =================================
pub const SUFFIX_ARM64: &str = "Linux-ARM-64.zip";
pub const SUFFIX_AMD64: &str = "Linux-x86-64.zip";
pub const SUFFIX_GENERIC: &str = "Generic.zip";

// =================================
// Manifest format
// =================================
pub const MANIFEST_PREFIX: &str = "oracle_package_names";
pub const KEY_BASE: &str = "DB_BASE_PKG";
pub const KEY_PATCH: &str = "DB_PATCH_PKG";
pub const KEY_OJVM: &str = "DB_OJVM_PKG";
pub const KEY_OPATCH: &str = "DB_OPATCH_PKG";
pub const KEY_JDK_PATCH: &str = "DB_JDKPATCH_PKG";
pub const KEY_PERL_PATCH: &str = "DB_PERLPATCH_PKG";
pub const KEY_ONEOFFS: &str = "DB_ONEOFF_PKGS";
pub const PACKAGE_KEY_SUFFIX: &str = "_PKG";

// =================================
// Directory layout
// =================================
pub const DEFAULT_SOFTWARE_SUBDIR: &str = "software";
pub const DEFAULT_LOG_PATTERN: &str = "*.log";
pub const DEFAULT_STAGE_SUBDIR: &str = "staging";
pub const DEFAULT_INVENTORY_FILE: &str = "PATCHES.md";

// =================================
// Build context ignore file
// =================================
pub const IGNORE_FILE: &str = ".dockerignore";
pub const IGNORE_BACKUP_FILE: &str = ".dockerignore.orig";
pub const IGNORE_MARKER: &str = "# generated by oraimage-stage";

// =================================
// Environment overrides
// =================================
pub const ENV_SOFTWARE_DIR: &str = "ORAIMAGE_SOFTWARE_DIR";
pub const ENV_LOG_PATTERN: &str = "ORAIMAGE_LOG_PATTERN";
pub const ENV_FORCE: &str = "ORAIMAGE_FORCE";

// =================================
// Base release packages by major version: (major, amd64, arm64)
// =================================
pub const BASE_PACKAGES: &[(&str, Option<&str>, Option<&str>)] = &[
    (
        "19",
        Some("LINUX.X64_193000_db_home.zip"),
        Some("LINUX.ARM64_1919000_db_home.zip"),
    ),
    ("21", Some("LINUX.X64_213000_db_home.zip"), None),
];
