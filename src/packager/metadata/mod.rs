//! Generated metadata files: `manifest.json` and `update.xml`.
//!
//! Both generators are independent of each other and are no-ops when their
//! description is absent from the configuration.

pub mod manifest;
pub mod update;

use crate::packager::error::Result;
use crate::packager::settings::Settings;
use std::path::PathBuf;

pub use manifest::{render_manifest, write_manifest, MANIFEST_FILE};
pub use update::{normalize_codebase, render_update_xml, write_update_xml, UPDATE_FILE};

/// Writes every configured metadata file into the build directory.
///
/// Returns the paths that were written.
pub async fn generate_metadata(settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    written.extend(write_manifest(settings).await?);
    written.extend(write_update_xml(settings).await?);
    Ok(written)
}
