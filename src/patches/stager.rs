//! Build-context staging from a package manifest
//!
//! Copies the archives a manifest names into `<context>/<stage_subdir>/` and
//! writes an allow-list `.dockerignore` so the container build only sees the
//! staged files and the manifest.

use super::defaults::{
    DEFAULT_STAGE_SUBDIR, IGNORE_BACKUP_FILE, IGNORE_FILE, IGNORE_MARKER, KEY_ONEOFFS,
    PACKAGE_KEY_SUFFIX,
};
use super::manifest::{ManifestEntries, parse_entries};
use super::paths::parse_manifest_file_name;
use crate::exceptions::{OraImageError, Result};
use crate::utils::{copy_atomic, write_atomic};
use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Options for staging a build context
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Manifest to stage from
    pub manifest: PathBuf,
    /// Base software directory, searched first
    pub base_dir: PathBuf,
    /// Release update directory, searched second (defaults to `<base>/<RU>`)
    pub ru_dir: Option<PathBuf>,
    /// Build context root (defaults to the manifest's directory)
    pub context_dir: Option<PathBuf>,
    /// Staging subtree inside the context
    pub stage_subdir: String,
}

impl StageOptions {
    pub fn new(manifest: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            base_dir: base_dir.into(),
            ru_dir: None,
            context_dir: None,
            stage_subdir: DEFAULT_STAGE_SUBDIR.to_string(),
        }
    }
}

/// A manifest-listed file found in none of the source directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionWarning {
    pub filename: String,
    pub searched: Vec<PathBuf>,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dirs: Vec<String> = self
            .searched
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        write!(f, "{} not found in [{}]", self.filename, dirs.join(", "))
    }
}

/// A file copied into the staging tree
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub filename: String,
    pub source: PathBuf,
    pub dest: PathBuf,
    pub bytes: u64,
}

/// Outcome of a staging run
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage_dir: PathBuf,
    pub ignore_file: PathBuf,
    /// Manifest path relative to the context, as allowed by the ignore file
    pub manifest_in_context: String,
    pub staged: Vec<StagedFile>,
    pub warnings: Vec<ResolutionWarning>,
}

impl StageReport {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// File names a manifest requires, in manifest order
///
/// Values of every `*_PKG` key come first as they appear, one-off tokens are
/// expanded in place. Duplicates are kept.
pub fn required_files(entries: &ManifestEntries) -> Vec<String> {
    let mut files = Vec::new();
    for (key, value) in entries {
        if key == KEY_ONEOFFS {
            files.extend(value.split_whitespace().map(str::to_string));
        } else if key.ends_with(PACKAGE_KEY_SUFFIX) && !value.trim().is_empty() {
            files.push(value.trim().to_string());
        }
    }
    files
}

/// Relative path with forward slashes, or `None` if it escapes the base
fn relative_slash_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Allow-list ignore file for the container build
pub fn render_ignore(stage_subdir: &str, manifest_in_context: &str) -> String {
    let mut lines = vec![
        IGNORE_MARKER.to_string(),
        "*".to_string(),
        format!("!{stage_subdir}"),
        format!("!{stage_subdir}/**"),
    ];
    if !manifest_in_context.starts_with(&format!("{stage_subdir}/")) {
        lines.push(format!("!{manifest_in_context}"));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn is_generated_ignore(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| content.lines().next() == Some(IGNORE_MARKER))
        .unwrap_or(false)
}

/// Stages the files of one manifest into a build context
#[derive(Debug)]
pub struct BuildStager {
    manifest: PathBuf,
    source_dirs: Vec<PathBuf>,
    context_dir: PathBuf,
    stage_subdir: String,
}

impl BuildStager {
    pub fn new(options: StageOptions) -> Result<Self> {
        if !options.manifest.is_file() {
            return Err(OraImageError::ConfigError(format!(
                "Manifest not found: {}",
                options.manifest.display()
            )));
        }
        if !options.base_dir.is_dir() {
            return Err(OraImageError::ConfigError(format!(
                "Software directory not found: {}",
                options.base_dir.display()
            )));
        }
        let stage_subdir = relative_slash_path(Path::new(&options.stage_subdir)).ok_or_else(|| {
            OraImageError::ConfigError(format!(
                "Stage subdirectory must be a relative path inside the context: {}",
                options.stage_subdir
            ))
        })?;

        let manifest = fs::canonicalize(&options.manifest)?;
        let context_dir = match options.context_dir {
            Some(dir) => dir,
            None => manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        if !context_dir.is_dir() {
            return Err(OraImageError::ConfigError(format!(
                "Build context not found: {}",
                context_dir.display()
            )));
        }
        let context_dir = fs::canonicalize(&context_dir)?;

        let ru_dir = options.ru_dir.or_else(|| {
            parse_manifest_file_name(&manifest).map(|(_, ru)| options.base_dir.join(ru))
        });
        let mut source_dirs = vec![options.base_dir];
        match ru_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    warn!("⚠️ Release update directory {} does not exist", dir.display());
                }
                source_dirs.push(dir);
            }
            None => warn!(
                "⚠️ No release update directory given and none derivable from {}",
                manifest.display()
            ),
        }

        let stage_dir = context_dir.join(&stage_subdir);
        for dir in &source_dirs {
            let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.clone());
            if dir.starts_with(&stage_dir) {
                return Err(OraImageError::ConfigError(format!(
                    "Staging tree {} would contain source directory {}",
                    stage_dir.display(),
                    dir.display()
                )));
            }
        }

        Ok(Self {
            manifest,
            source_dirs,
            context_dir,
            stage_subdir,
        })
    }

    pub fn stage_dir(&self) -> PathBuf {
        self.context_dir.join(&self.stage_subdir)
    }

    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    /// First source directory holding a regular file with this exact name
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        if !is_plain_file_name(filename) {
            return None;
        }
        self.source_dirs
            .iter()
            .map(|dir| dir.join(filename))
            .find(|candidate| candidate.is_file())
    }

    /// Manifest location relative to the context; copies it in when outside
    ///
    /// A manifest inside the staging tree was removed with the previous tree
    /// and is written back from `contents`.
    fn place_manifest(&self, stage_dir: &Path, contents: &[u8]) -> Result<String> {
        if self.manifest.starts_with(stage_dir) {
            if let Some(parent) = self.manifest.parent() {
                fs::create_dir_all(parent).map_err(|e| OraImageError::write(parent, e))?;
            }
            write_atomic(&self.manifest, contents)?;
            debug!("📋 Restored manifest {} in staging tree", self.manifest.display());
        }
        if let Ok(rel) = self.manifest.strip_prefix(&self.context_dir) {
            if let Some(rel) = relative_slash_path(rel) {
                return Ok(rel);
            }
        }
        let name = self
            .manifest
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| OraImageError::Generic("Manifest has no file name".to_string()))?;
        copy_atomic(&self.manifest, &stage_dir.join(name))?;
        debug!("📋 Copied manifest into staging tree as {name}");
        Ok(format!("{}/{name}", self.stage_subdir))
    }

    fn write_ignore(&self, manifest_in_context: &str) -> Result<PathBuf> {
        let ignore_path = self.context_dir.join(IGNORE_FILE);
        if ignore_path.exists() && !is_generated_ignore(&ignore_path) {
            let backup = self.context_dir.join(IGNORE_BACKUP_FILE);
            if backup.exists() {
                return Err(OraImageError::ConflictError(backup));
            }
            fs::rename(&ignore_path, &backup).map_err(|e| OraImageError::write(&backup, e))?;
            info!("💾 Saved existing {} as {}", IGNORE_FILE, IGNORE_BACKUP_FILE);
        }
        write_atomic(
            &ignore_path,
            render_ignore(&self.stage_subdir, manifest_in_context).as_bytes(),
        )?;
        Ok(ignore_path)
    }

    /// Copy every resolvable manifest file into the staging tree
    pub fn stage(&self) -> Result<StageReport> {
        let contents = fs::read(&self.manifest).map_err(|e| {
            OraImageError::ConfigError(format!(
                "Cannot read manifest {}: {e}",
                self.manifest.display()
            ))
        })?;
        let entries = parse_entries(&String::from_utf8_lossy(&contents));
        let required = required_files(&entries);
        info!(
            "🚚 Staging {} file(s) from {}",
            required.len(),
            self.manifest.display()
        );

        let stage_dir = self.stage_dir();
        if stage_dir.exists() {
            debug!("🧹 Removing previous staging tree {}", stage_dir.display());
            fs::remove_dir_all(&stage_dir)?;
        }
        fs::create_dir_all(&stage_dir).map_err(|e| OraImageError::write(&stage_dir, e))?;

        let mut staged = Vec::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for filename in required {
            if !seen.insert(filename.clone()) {
                trace!("{filename} already staged");
                continue;
            }
            let Some(source) = self.resolve(&filename) else {
                let warning = ResolutionWarning {
                    filename,
                    searched: self.source_dirs.clone(),
                };
                warn!("⚠️ {warning}");
                warnings.push(warning);
                continue;
            };
            let dest = stage_dir.join(&filename);
            let bytes = copy_atomic(&source, &dest)?;
            debug!("📦 {} -> {} ({} bytes)", source.display(), dest.display(), bytes);
            staged.push(StagedFile {
                filename,
                source,
                dest,
                bytes,
            });
        }

        let manifest_in_context = self.place_manifest(&stage_dir, &contents)?;
        let ignore_file = self.write_ignore(&manifest_in_context)?;

        info!(
            "✅ Staged {} file(s), {} unresolved",
            staged.len(),
            warnings.len()
        );
        Ok(StageReport {
            stage_dir,
            ignore_file,
            manifest_in_context,
            staged,
            warnings,
        })
    }
}

/// Remove a staging tree and the generated ignore file, restoring any backup
pub fn clean_stage(context_dir: &Path, stage_subdir: &str) -> Result<()> {
    let subdir = relative_slash_path(Path::new(stage_subdir)).ok_or_else(|| {
        OraImageError::ConfigError(format!("Invalid stage subdirectory: {stage_subdir}"))
    })?;
    let stage_dir = context_dir.join(subdir);
    if stage_dir.exists() {
        fs::remove_dir_all(&stage_dir)?;
        info!("🧹 Removed staging tree {}", stage_dir.display());
    }

    let ignore_path = context_dir.join(IGNORE_FILE);
    if ignore_path.exists() {
        if is_generated_ignore(&ignore_path) {
            fs::remove_file(&ignore_path)?;
            debug!("🧹 Removed generated {}", ignore_path.display());
        } else {
            debug!("Leaving user-provided {} in place", ignore_path.display());
        }
    }

    let backup = context_dir.join(IGNORE_BACKUP_FILE);
    if backup.exists() && !ignore_path.exists() {
        fs::rename(&backup, &ignore_path)?;
        info!("♻️ Restored {} from backup", IGNORE_FILE);
    }
    Ok(())
}
