//! `manifest.json` generation.

use crate::packager::error::{ErrorExt, Result};
use crate::packager::settings::Settings;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// File name of the generated manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes `manifest.json` into the build directory.
///
/// Returns `None` without touching the disk when no manifest is configured;
/// the staged resources are then expected to carry their own.
pub async fn write_manifest(settings: &Settings) -> Result<Option<PathBuf>> {
    let Some(manifest) = settings.manifest() else {
        log::info!("Manifest is undefined. Define your own {MANIFEST_FILE}");
        return Ok(None);
    };

    log::info!("Creating {MANIFEST_FILE}");
    let rendered = render_manifest(manifest, settings.update_url())?;
    let path = settings.paths().build_dir.join(MANIFEST_FILE);
    tokio::fs::write(&path, rendered)
        .await
        .fs_context("writing manifest", &path)?;

    Ok(Some(path))
}

/// Serializes the manifest compactly.
///
/// `update_url` is filled from `fallback_update_url` when the manifest has
/// none (or has it set to `null`). Key order is preserved.
pub fn render_manifest(
    manifest: &Map<String, Value>,
    fallback_update_url: Option<&str>,
) -> Result<String> {
    let mut manifest = manifest.clone();

    if let Some(url) = fallback_update_url {
        let missing = manifest.get("update_url").is_none_or(Value::is_null);
        if missing {
            manifest.insert("update_url".to_string(), Value::String(url.to_string()));
        }
    }

    Ok(serde_json::to_string(&Value::Object(manifest))?)
}
