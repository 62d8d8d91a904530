//! File system utilities for packaging.
//!
//! Provides file operations with automatic directory creation, deletion
//! protection and path-carrying errors.

use crate::packager::error::{Error, ErrorExt, Result};
use std::path::Path;
use tokio::fs;

/// Deletion policy for recursive removal.
///
/// Without `force`, only strict descendants of `base` may be removed.
#[derive(Clone, Copy, Debug)]
pub struct DeleteGuard<'a> {
    base: &'a Path,
    force: bool,
}

impl<'a> DeleteGuard<'a> {
    /// Creates a guard rooted at `base`.
    pub fn new(base: &'a Path, force: bool) -> Self {
        Self { base, force }
    }

    /// Checks that `path` may be deleted.
    pub fn check(&self, path: &Path) -> Result<()> {
        if self.force || (path.starts_with(self.base) && path != self.base) {
            Ok(())
        } else {
            Err(Error::DeletionRefused {
                path: path.to_path_buf(),
                base: self.base.to_path_buf(),
            })
        }
    }
}

/// Removes the directory and its contents if it exists.
///
/// Returns whether anything was removed.
pub async fn remove_dir_all(path: &Path, guard: DeleteGuard<'_>) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    guard.check(path)?;
    fs::remove_dir_all(path)
        .await
        .fs_context("removing directory", path)?;
    Ok(true)
}

/// Creates the given directory, erasing it first if it already exists.
pub async fn recreate_dir(path: &Path, guard: DeleteGuard<'_>) -> Result<()> {
    if remove_dir_all(path, guard).await? {
        log::debug!("Removed stale directory {}", path.display());
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Creates the parent directory of `path` if it has one.
pub async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }
    Ok(())
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    ensure_parent(to).await?;
    fs::copy(from, to).await.fs_context("copying file", to)?;
    Ok(())
}

/// Moves a file by copying it and deleting the original.
///
/// Copy-then-delete works across filesystems, where a rename would not.
/// Moving a file onto itself leaves it in place.
pub async fn move_file(from: &Path, to: &Path) -> Result<()> {
    if same_file(from, to).await {
        log::debug!("{} is already in place", to.display());
        return Ok(());
    }

    copy_file(from, to).await?;
    fs::remove_file(from)
        .await
        .fs_context("removing file", from)
}

async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
