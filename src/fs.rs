//! Filesystem collaborator
//!
//! Every disk access made by the config store, the reconciler and the image
//! intake goes through [`FileSystem`], so a platform that proxies storage
//! through a host runtime only has to provide another adapter.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Logical filesystem operations used by the customizer core
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    /// Copy `src` to `dst`. Fails if `dst` exists and `overwrite` is false.
    fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()>;

    fn delete_file(&self, path: &Path) -> Result<()>;

    fn rename_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Entries directly inside `path` (not recursive)
    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Create `path` and any missing parents
    fn create_directory(&self, path: &Path) -> Result<()>;

    fn read_text(&self, path: &Path) -> Result<String>;

    fn write_text(&self, path: &Path, contents: &str) -> Result<()>;

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}

/// Desktop adapter backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> Result<()> {
        if !overwrite && dst.exists() {
            bail!("Refusing to overwrite existing file {}", dst.display());
        }
        let bytes = fs::copy(src, dst)
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
        debug!(src = %src.display(), dst = %dst.display(), bytes = bytes, "Copied file");
        Ok(())
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).with_context(|| format!("Failed to delete {}", path.display()))
    }

    fn rename_file(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::rename(src, dst)
            .with_context(|| format!("Failed to rename {} to {}", src.display(), dst.display()))
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)
            .with_context(|| format!("Failed to read directory {}", path.display()))?
        {
            entries.push(entry?.path());
        }
        Ok(entries)
    }

    fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    fn write_text(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_without_overwrite_refuses_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("b.png");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        assert!(StdFileSystem.copy_file(&src, &dst, false).is_err());
        assert_eq!(fs::read(&dst).unwrap(), b"old");

        StdFileSystem.copy_file(&src, &dst, true).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn test_list_directory_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.png"), b"1").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("two.png"), b"2").unwrap();

        let mut entries = StdFileSystem.list_directory(dir.path()).unwrap();
        entries.sort();
        assert_eq!(entries, vec![dir.path().join("nested"), dir.path().join("one.png")]);
    }

    #[test]
    fn test_missing_file_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let err = StdFileSystem.delete_file(&missing).unwrap_err();
        assert!(format!("{err}").contains("missing.png"));
    }
}
