//! Package manifest files (`oracle_package_names_<arch>_<RU>`)
//!
//! One `KEY="value"` assignment per line, shell-sourceable by the image build
//! scripts.

use super::defaults::{
    KEY_BASE, KEY_JDK_PATCH, KEY_OJVM, KEY_ONEOFFS, KEY_OPATCH, KEY_PATCH, KEY_PERL_PATCH,
};
use super::package_set::{PackageSet, SlotState};
use crate::exceptions::{OraImageError, Result};
use crate::utils::{ensure_writable_target, write_atomic};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Flattened package set for one (version, architecture, RU)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub base_package: String,
    pub patch_package: String,
    pub ojvm_package: String,
    pub opatch_package: String,
    pub jdk_patch_package: String,
    pub perl_patch_package: String,
    /// Space separated file names
    pub oneoff_packages: String,
}

/// Ordered `KEY=value` pairs as read from a manifest file
pub type ManifestEntries = Vec<(String, String)>;

impl PackageManifest {
    /// Flatten a package set; unset slots become empty strings
    pub fn from_package_set(set: &PackageSet, base_package: &str) -> Self {
        let slot = |s: &SlotState| s.as_deref().unwrap_or_default().to_string();
        Self {
            base_package: base_package.to_string(),
            patch_package: slot(&set.patch),
            ojvm_package: slot(&set.ojvm),
            opatch_package: slot(&set.opatch),
            jdk_patch_package: slot(&set.jdk_patch),
            perl_patch_package: slot(&set.perl_patch),
            oneoff_packages: set.oneoffs.iter().collect::<Vec<_>>().join(" "),
        }
    }

    /// Fields in file order, paired with their keys
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            (KEY_BASE, self.base_package.as_str()),
            (KEY_PATCH, self.patch_package.as_str()),
            (KEY_OJVM, self.ojvm_package.as_str()),
            (KEY_OPATCH, self.opatch_package.as_str()),
            (KEY_JDK_PATCH, self.jdk_patch_package.as_str()),
            (KEY_PERL_PATCH, self.perl_patch_package.as_str()),
            (KEY_ONEOFFS, self.oneoff_packages.as_str()),
        ]
    }

    /// One-off file names
    pub fn oneoffs(&self) -> impl Iterator<Item = &str> {
        self.oneoff_packages.split_whitespace()
    }

    /// Render as assignment lines
    pub fn to_text(&self) -> String {
        self.fields()
            .iter()
            .map(|(key, value)| format!("{key}=\"{value}\"\n"))
            .collect()
    }

    /// Pick the seven known keys out of parsed entries; missing keys are empty
    pub fn from_entries(entries: &[(String, String)]) -> Self {
        let get = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        Self {
            base_package: get(KEY_BASE),
            patch_package: get(KEY_PATCH),
            ojvm_package: get(KEY_OJVM),
            opatch_package: get(KEY_OPATCH),
            jdk_patch_package: get(KEY_JDK_PATCH),
            perl_patch_package: get(KEY_PERL_PATCH),
            oneoff_packages: get(KEY_ONEOFFS),
        }
    }

    /// Parse manifest text into a manifest
    pub fn parse(text: &str) -> Self {
        Self::from_entries(&parse_entries(text))
    }

    /// Read and parse a manifest file
    pub fn read(path: &Path) -> Result<Self> {
        Ok(Self::from_entries(&read_entries(path)?))
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Parse `KEY=value` lines, keeping file order
pub fn parse_entries(text: &str) -> ManifestEntries {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

/// Read manifest entries from disk
pub fn read_entries(path: &Path) -> Result<ManifestEntries> {
    let text = fs::read_to_string(path).map_err(|e| {
        OraImageError::ConfigError(format!("Cannot read manifest {}: {e}", path.display()))
    })?;
    Ok(parse_entries(&text))
}

/// Write a manifest atomically; refuses to replace an existing file unless `force`
pub fn write_manifest(path: &Path, manifest: &PackageManifest, force: bool) -> Result<()> {
    ensure_writable_target(path, force)?;
    if path.exists() {
        debug!("♻️ Overwriting existing manifest {}", path.display());
    }
    write_atomic(path, manifest.to_text().as_bytes())?;
    info!("📄 Wrote manifest {}", path.display());
    Ok(())
}
