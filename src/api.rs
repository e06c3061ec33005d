//! High-level API for oraimage operations

use crate::exceptions::{OraImageError, Result};
use crate::patches::defaults::{DEFAULT_LOG_PATTERN, ENV_FORCE, ENV_LOG_PATTERN, ENV_SOFTWARE_DIR};
use crate::patches::paths::{
    ProductPaths, default_base_package, latest_log, validate_release_update,
};
use crate::patches::{
    ArchPackageSets, Architecture, BuildStager, PackageManifest, StageOptions, StageReport,
    classify, extract_release_update, write_manifest,
};
use crate::utils::{ensure_writable_target, env_non_empty, env_path, is_env_true};
use log::{debug, info, trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for generating package manifests from an AutoUpgrade log
#[derive(Debug, Default, Clone)]
pub struct GenerateOptions {
    /// Product (database version) directory; manifests are written here
    pub product_dir: PathBuf,
    /// Software directory holding the logs (default `<product>/software`)
    pub software_dir: Option<PathBuf>,
    /// Release update override; skips extraction from the log
    pub release_update: Option<String>,
    /// Base release archive override for AMD64
    pub base_amd64: Option<String>,
    /// Base release archive override for ARM64
    pub base_arm64: Option<String>,
    /// Overwrite existing manifests
    pub force: bool,
    /// Glob pattern for picking the input log inside the software directory
    pub log_pattern: Option<String>,
    /// Explicit input log
    pub input: Option<PathBuf>,
}

impl GenerateOptions {
    /// Options for a product directory with environment overrides applied
    pub fn from_env(product_dir: impl Into<PathBuf>) -> Self {
        Self {
            product_dir: product_dir.into(),
            software_dir: env_path(ENV_SOFTWARE_DIR),
            log_pattern: env_non_empty(ENV_LOG_PATTERN),
            force: is_env_true(ENV_FORCE),
            ..Self::default()
        }
    }

    fn base_override(&self, arch: Architecture) -> Option<&str> {
        match arch {
            Architecture::Amd64 => self.base_amd64.as_deref(),
            Architecture::Arm64 => self.base_arm64.as_deref(),
        }
    }
}

/// A manifest produced by [`generate_manifests`]
#[derive(Debug, Clone)]
pub struct GeneratedManifest {
    pub architecture: Architecture,
    pub path: PathBuf,
    pub manifest: PackageManifest,
}

/// Result of a manifest generation run
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub release_update: String,
    pub input: PathBuf,
    pub manifests: Vec<GeneratedManifest>,
}

fn resolve_input(options: &GenerateOptions, software_dir: &Path) -> Result<PathBuf> {
    if let Some(input) = &options.input {
        if !input.is_file() {
            return Err(OraImageError::ConfigError(format!(
                "Input log not found: {}",
                input.display()
            )));
        }
        return Ok(input.clone());
    }
    let pattern = options.log_pattern.as_deref().unwrap_or(DEFAULT_LOG_PATTERN);
    latest_log(software_dir, pattern)?.ok_or_else(|| {
        OraImageError::ConfigError(format!(
            "No log matching '{}' in {}",
            pattern,
            software_dir.display()
        ))
    })
}

fn read_log(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        OraImageError::ConfigError(format!("Cannot read input log {}: {e}", path.display()))
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Classify an AutoUpgrade log and write one manifest per architecture
pub fn generate_manifests(options: &GenerateOptions) -> Result<GenerateReport> {
    trace!("🔍 Generate options: {:?}", options);
    let product = ProductPaths::new(&options.product_dir)?;

    let software_dir = options
        .software_dir
        .clone()
        .unwrap_or_else(|| product.default_software_dir());
    if !software_dir.is_dir() {
        return Err(OraImageError::ConfigError(format!(
            "Software directory not found: {}",
            software_dir.display()
        )));
    }

    let input = resolve_input(options, &software_dir)?;
    info!("📖 Reading AutoUpgrade log {}", input.display());
    let text = read_log(&input)?;

    let release_update = match &options.release_update {
        Some(ru) => {
            let ru = validate_release_update(ru)?.to_string();
            debug!("Using release update override {ru}");
            ru
        }
        None => extract_release_update(text.lines()).ok_or_else(|| {
            OraImageError::ParseError(format!(
                "No DATABASE RELEASE UPDATE version found in {}",
                input.display()
            ))
        })?,
    };
    info!("🏷️ Release update {release_update}");

    let sets = classify(text.lines(), ArchPackageSets::new());

    let mut planned = Vec::new();
    for arch in Architecture::ALL {
        let path = product.manifest(arch, &release_update);
        ensure_writable_target(&path, options.force)?;

        let base = match options.base_override(arch) {
            Some(base) => base.to_string(),
            None => match default_base_package(product.major_version(), arch) {
                Some(base) => base.to_string(),
                None => {
                    warn!(
                        "⚠️ No default base package for version '{}' on {}",
                        product.version(),
                        arch
                    );
                    String::new()
                }
            },
        };
        let manifest = PackageManifest::from_package_set(sets.get(arch), &base);
        planned.push(GeneratedManifest {
            architecture: arch,
            path,
            manifest,
        });
    }

    for generated in &planned {
        write_manifest(&generated.path, &generated.manifest, options.force)?;
    }

    Ok(GenerateReport {
        release_update,
        input,
        manifests: planned,
    })
}

/// Manifest path for a release update in a product directory
///
/// Without an explicit architecture the host's is used.
pub fn locate_manifest(
    product_dir: &Path,
    release_update: &str,
    arch: Option<Architecture>,
) -> Result<PathBuf> {
    let arch = arch.or_else(Architecture::host).ok_or_else(|| {
        OraImageError::ConfigError(format!(
            "Host architecture '{}' is not supported; pass --arch",
            crate::utils::host_arch()
        ))
    })?;
    let product = ProductPaths::new(product_dir)?;
    let path = product.manifest(arch, validate_release_update(release_update)?);
    if !path.is_file() {
        return Err(OraImageError::ConfigError(format!(
            "No {} manifest for release update {}: {}",
            arch,
            release_update,
            path.display()
        )));
    }
    Ok(path)
}

/// Stage the files of a manifest into a build context
pub fn stage_build_context(options: StageOptions) -> Result<StageReport> {
    BuildStager::new(options)?.stage()
}

/// Remove a staging tree and restore the context's ignore file
pub fn clean_build_context(context_dir: &Path, stage_subdir: &str) -> Result<()> {
    crate::patches::clean_stage(context_dir, stage_subdir)
}

/// Write the advisory archive inventory of a patch directory
pub fn write_patch_inventory(dir: &Path, output: Option<&Path>, force: bool) -> Result<PathBuf> {
    crate::patches::inventory::write_inventory(dir, output, force)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LOG: &str = "\
DATABASE RELEASE UPDATE 19.27.0.0.250415
File: p37642901_190000_Linux-x86-64.zip - LOCATED at /stage
File: p37642901_190000_Linux-ARM-64.zip - LOCATED at /stage
OPatch 12.2.0.1.46
File: p6880880_190000_Generic.zip - LOCATED at /stage
";

    fn product_with_log(log: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let product = temp.path().join("19.0.0.0");
        fs::create_dir_all(product.join("software")).unwrap();
        fs::write(product.join("software/download.log"), log).unwrap();
        (temp, product)
    }

    fn options(product: &Path) -> GenerateOptions {
        GenerateOptions {
            product_dir: product.to_path_buf(),
            ..GenerateOptions::default()
        }
    }

    #[test]
    fn test_generate_writes_both_manifests() {
        let (_temp, product) = product_with_log(LOG);

        let report = generate_manifests(&options(&product)).unwrap();
        assert_eq!(report.release_update, "19.27.0.0");
        assert_eq!(report.manifests.len(), 2);

        let amd = PackageManifest::read(&product.join("oracle_package_names_amd64_19.27.0.0"))
            .unwrap();
        assert_eq!(amd.base_package, "LINUX.X64_193000_db_home.zip");
        assert_eq!(amd.patch_package, "p37642901_190000_Linux-x86-64.zip");
        assert_eq!(amd.opatch_package, "p6880880_190000_Generic.zip");

        let arm = PackageManifest::read(&product.join("oracle_package_names_arm64_19.27.0.0"))
            .unwrap();
        assert_eq!(arm.base_package, "LINUX.ARM64_1919000_db_home.zip");
        assert_eq!(arm.patch_package, "p37642901_190000_Linux-ARM-64.zip");
        assert_eq!(arm.opatch_package, "p6880880_190000_Generic.zip");
    }

    #[test]
    fn test_rerun_requires_force() {
        let (_temp, product) = product_with_log(LOG);
        generate_manifests(&options(&product)).unwrap();

        let err = generate_manifests(&options(&product)).unwrap_err();
        assert!(matches!(err, OraImageError::ConflictError(_)));

        let mut forced = options(&product);
        forced.force = true;
        forced.base_amd64 = Some("custom.zip".into());
        generate_manifests(&forced).unwrap();
        let amd = PackageManifest::read(&product.join("oracle_package_names_amd64_19.27.0.0"))
            .unwrap();
        assert_eq!(amd.base_package, "custom.zip");
    }

    #[test]
    fn test_conflict_detected_before_any_write() {
        let (_temp, product) = product_with_log(LOG);
        let arm = product.join("oracle_package_names_arm64_19.27.0.0");
        fs::write(&arm, "existing").unwrap();

        let err = generate_manifests(&options(&product)).unwrap_err();
        assert!(matches!(err, OraImageError::ConflictError(_)));
        assert!(!product.join("oracle_package_names_amd64_19.27.0.0").exists());
        assert_eq!(fs::read_to_string(&arm).unwrap(), "existing");
    }

    #[test]
    fn test_missing_release_update_is_parse_error() {
        let (_temp, product) = product_with_log("File: p1_Generic.zip - LOCATED\n");
        let err = generate_manifests(&options(&product)).unwrap_err();
        assert!(matches!(err, OraImageError::ParseError(_)));
        assert_eq!(fs::read_dir(&product).unwrap().count(), 1);
    }

    #[test]
    fn test_release_update_override() {
        let (_temp, product) = product_with_log("File: p1_Generic.zip - LOCATED\n");
        let mut opts = options(&product);
        opts.release_update = Some("19.28.0.0".into());

        let report = generate_manifests(&opts).unwrap();
        assert_eq!(report.release_update, "19.28.0.0");
        let amd = PackageManifest::read(&product.join("oracle_package_names_amd64_19.28.0.0"))
            .unwrap();
        assert_eq!(amd.oneoff_packages, "p1_Generic.zip");
    }

    #[test]
    fn test_missing_software_dir_is_config_error() {
        let temp = TempDir::new().unwrap();
        let err = generate_manifests(&options(temp.path())).unwrap_err();
        assert!(matches!(err, OraImageError::ConfigError(_)));
    }

    #[test]
    fn test_explicit_missing_input_is_config_error() {
        let (_temp, product) = product_with_log(LOG);
        let mut opts = options(&product);
        opts.input = Some(product.join("software/missing.log"));
        let err = generate_manifests(&opts).unwrap_err();
        assert!(matches!(err, OraImageError::ConfigError(_)));
    }

    #[test]
    fn test_locate_manifest() {
        let (_temp, product) = product_with_log(LOG);
        generate_manifests(&options(&product)).unwrap();

        let path = locate_manifest(&product, "19.27.0.0", Some(Architecture::Arm64)).unwrap();
        assert!(path.ends_with("oracle_package_names_arm64_19.27.0.0"));

        assert!(matches!(
            locate_manifest(&product, "19.28.0.0", Some(Architecture::Arm64)),
            Err(OraImageError::ConfigError(_))
        ));
    }

    #[test]
    fn test_generate_then_stage() {
        let (_temp, product) = product_with_log(LOG);
        let software = product.join("software");
        fs::create_dir_all(software.join("19.27.0.0")).unwrap();
        fs::write(software.join("LINUX.X64_193000_db_home.zip"), "base").unwrap();
        fs::write(
            software.join("19.27.0.0/p37642901_190000_Linux-x86-64.zip"),
            "ru",
        )
        .unwrap();

        let report = generate_manifests(&options(&product)).unwrap();
        let amd = &report.manifests[0];
        assert_eq!(amd.architecture, Architecture::Amd64);

        let staged = stage_build_context(StageOptions::new(&amd.path, &software)).unwrap();
        assert_eq!(staged.staged.len(), 2);
        assert_eq!(staged.warnings.len(), 1);
        assert_eq!(staged.warnings[0].filename, "p6880880_190000_Generic.zip");

        clean_build_context(&product, "staging").unwrap();
        assert!(!product.join("staging").exists());
        assert!(!product.join(".dockerignore").exists());
    }
}
