//! Advisory inventory of patch archives in a directory.
//!
//! Checksums use the prefixed format "algorithm:hexvalue" (e.g.
//! "sha256:cafe8008..."). They document what was on disk; nothing verifies
//! against them.

use super::defaults::DEFAULT_INVENTORY_FILE;
use crate::exceptions::{OraImageError, Result};
use crate::utils::{ensure_writable_target, write_atomic};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

/// One archive in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub name: String,
    pub size: u64,
    /// RFC 3339 modification time (UTC)
    pub modified: String,
    pub checksum: String,
}

/// Streaming SHA-256 of a reader, prefixed with the algorithm
pub fn sha256_checksum<R: Read>(mut reader: R) -> std::io::Result<String> {
    const BUFFER_SIZE: usize = 1024 * 1024;
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut hasher = Sha256::new();
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// List the `*.zip` archives of a directory, sorted by name
pub fn build_inventory(dir: &Path) -> Result<Vec<InventoryEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_archive(&path) {
            continue;
        }
        let metadata = entry.metadata()?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        let checksum = sha256_checksum(File::open(&path)?)?;
        debug!("🔢 {} {}", path.display(), checksum);
        entries.push(InventoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
            modified: modified.to_rfc3339_opts(SecondsFormat::Secs, true),
            checksum,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Markdown table describing the archives
pub fn render_markdown(title: &str, entries: &[InventoryEntry], generated: DateTime<Utc>) -> String {
    let mut out = format!("# {title}\n\n");
    out.push_str(&format!(
        "Generated {} ({} archive(s)). Checksums are informational only.\n\n",
        generated.to_rfc3339_opts(SecondsFormat::Secs, true),
        entries.len()
    ));
    out.push_str("| File | Size (bytes) | Modified | Checksum |\n");
    out.push_str("|------|-------------:|----------|----------|\n");
    for entry in entries {
        out.push_str(&format!(
            "| {} | {} | {} | `{}` |\n",
            entry.name, entry.size, entry.modified, entry.checksum
        ));
    }
    out
}

/// Write the inventory of `dir` to `output` (default `<dir>/PATCHES.md`)
pub fn write_inventory(dir: &Path, output: Option<&Path>, force: bool) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(OraImageError::ConfigError(format!(
            "Patch directory not found: {}",
            dir.display()
        )));
    }
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(DEFAULT_INVENTORY_FILE));
    ensure_writable_target(&output, force)?;

    let entries = build_inventory(dir)?;
    let title = format!(
        "Patch inventory: {}",
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string())
    );
    write_atomic(
        &output,
        render_markdown(&title, &entries, Utc::now()).as_bytes(),
    )?;
    info!(
        "📝 Wrote inventory of {} archive(s) to {}",
        entries.len(),
        output.display()
    );
    Ok(output)
}
