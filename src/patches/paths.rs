//! Path conventions for product directories, manifests and input logs

use super::arch::Architecture;
use super::defaults::{BASE_PACKAGES, DEFAULT_SOFTWARE_SUBDIR, MANIFEST_PREFIX};
use crate::exceptions::{OraImageError, Result};
use log::{debug, trace};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Paths belonging to one product (database version) directory
#[derive(Debug, Clone)]
pub struct ProductPaths {
    product_dir: PathBuf,
    version: String,
}

impl ProductPaths {
    /// Resolve a product directory; it must exist
    pub fn new(product_dir: &Path) -> Result<Self> {
        if !product_dir.is_dir() {
            return Err(OraImageError::ConfigError(format!(
                "Product directory not found: {}",
                product_dir.display()
            )));
        }
        let product_dir = fs::canonicalize(product_dir)?;
        let version = product_dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        trace!("Product directory {} (version '{}')", product_dir.display(), version);
        Ok(Self {
            product_dir,
            version,
        })
    }

    pub fn product_dir(&self) -> &Path {
        &self.product_dir
    }

    /// Product version taken from the directory name, e.g. `19.0.0.0`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Major release, e.g. `19`
    pub fn major_version(&self) -> &str {
        self.version.split('.').next().unwrap_or_default()
    }

    /// Conventional software directory below the product directory
    pub fn default_software_dir(&self) -> PathBuf {
        self.product_dir.join(DEFAULT_SOFTWARE_SUBDIR)
    }

    /// Manifest path for an architecture and release update
    pub fn manifest(&self, arch: Architecture, release_update: &str) -> PathBuf {
        self.product_dir.join(manifest_file_name(arch, release_update))
    }
}

/// `oracle_package_names_<arch>_<RU>`
pub fn manifest_file_name(arch: Architecture, release_update: &str) -> String {
    format!("{MANIFEST_PREFIX}_{arch}_{release_update}")
}

/// Recover architecture and release update from a manifest file name
pub fn parse_manifest_file_name(path: &Path) -> Option<(Architecture, String)> {
    let name = path.file_name()?.to_str()?;
    let rest = name.strip_prefix(MANIFEST_PREFIX)?.strip_prefix('_')?;
    let (arch, release_update) = rest.split_once('_')?;
    if release_update.is_empty() {
        return None;
    }
    Some((arch.parse().ok()?, release_update.to_string()))
}

/// Built-in base release archive for a major version and architecture
pub fn default_base_package(major_version: &str, arch: Architecture) -> Option<&'static str> {
    BASE_PACKAGES
        .iter()
        .find(|(major, _, _)| *major == major_version)
        .and_then(|(_, amd64, arm64)| match arch {
            Architecture::Amd64 => *amd64,
            Architecture::Arm64 => *arm64,
        })
}

/// Most recently modified file matching `pattern` inside `dir`
pub fn latest_log(dir: &Path, pattern: &str) -> Result<Option<PathBuf>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full_pattern = Path::new(&escaped_dir).join(pattern);
    let full_pattern = full_pattern.to_string_lossy();
    debug!("🔍 Looking for input logs matching {full_pattern}");

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in glob::glob(&full_pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                debug!("⚠️ Skipping unreadable log candidate: {e}");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        trace!("Candidate log {} modified {:?}", path.display(), modified);
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Check a release update override before it becomes part of a file name
pub fn validate_release_update(release_update: &str) -> Result<&str> {
    let trimmed = release_update.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed.contains(char::is_whitespace)
    {
        return Err(OraImageError::ConfigError(format!(
            "Invalid release update '{release_update}'"
        )));
    }
    Ok(trimmed)
}
