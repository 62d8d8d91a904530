//! Best-effort removal of the build directory after packing.

use crate::packager::settings::Settings;
use crate::packager::utils::fs::{self, DeleteGuard};

/// Removes the build directory when `clean` is enabled.
///
/// Failures are logged and swallowed. Returns whether the directory was
/// removed.
pub async fn clean_build_dir(settings: &Settings) -> bool {
    let build_dir = &settings.paths().build_dir;

    if !settings.clean() {
        log::debug!("Keeping build directory {}", build_dir.display());
        return false;
    }

    log::info!("Cleaning tmp dir [{}]..", build_dir.display());
    let guard = DeleteGuard::new(settings.base_dir(), settings.force());
    match fs::remove_dir_all(build_dir, guard).await {
        Ok(removed) => removed,
        Err(e) => {
            log::warn!("Failed to clean build directory: {e}");
            false
        }
    }
}
