//! Whole-file writes that never leave a half-written target behind.
//!
//! Content goes to a temporary file in the destination directory and is then
//! renamed into place. On any failure the temporary file is dropped, which
//! removes it.

use crate::exceptions::{OraImageError, Result};
use log::trace;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;

fn temp_in_parent(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).map_err(|e| OraImageError::write(dest, e))
}

fn persist(tmp: NamedTempFile, dest: &Path) -> Result<()> {
    tmp.as_file()
        .sync_all()
        .map_err(|e| OraImageError::write(dest, e))?;
    tmp.persist(dest)
        .map_err(|e| OraImageError::write(dest, e.error))?;
    trace!("📝 Renamed temporary file into {}", dest.display());
    Ok(())
}

/// Refuse to touch an existing `dest` unless `force` is set
pub fn ensure_writable_target(dest: &Path, force: bool) -> Result<()> {
    if dest.exists() && !force {
        return Err(OraImageError::ConflictError(dest.to_path_buf()));
    }
    Ok(())
}

/// Atomically replace `dest` with `contents`
pub fn write_atomic(dest: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = temp_in_parent(dest)?;
    tmp.write_all(contents)
        .map_err(|e| OraImageError::write(dest, e))?;
    persist(tmp, dest)
}

/// Copy `src` to `dest` as one whole-file operation; returns bytes copied
pub fn copy_atomic(src: &Path, dest: &Path) -> Result<u64> {
    let mut reader = BufReader::new(File::open(src)?);
    let mut tmp = temp_in_parent(dest)?;
    let copied = io::copy(&mut reader, &mut tmp).map_err(|e| OraImageError::write(dest, e))?;
    persist(tmp, dest)?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out.txt");

        write_atomic(&dest, b"first").unwrap();
        write_atomic(&dest, b"second").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "second");
        // No temporary files left next to the target
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("missing").join("out.txt");

        let err = write_atomic(&dest, b"data").unwrap_err();
        assert!(matches!(err, OraImageError::WriteError { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_copy_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.zip");
        let dest = temp_dir.path().join("dest.zip");
        fs::write(&src, b"PK\x03\x04 payload").unwrap();

        let copied = copy_atomic(&src, &dest).unwrap();
        assert_eq!(copied, 12);
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
    }

    #[test]
    fn test_ensure_writable_target() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("manifest");
        assert!(ensure_writable_target(&dest, false).is_ok());

        fs::write(&dest, "x").unwrap();
        assert!(matches!(
            ensure_writable_target(&dest, false),
            Err(OraImageError::ConflictError(_))
        ));
        assert!(ensure_writable_target(&dest, true).is_ok());
    }
}
