//! `update.xml` generation for self-hosted automatic updates.
//!
//! # Codebase normalization
//!
//! | `url` | package | `codebase` |
//! |---|---|---|
//! | `https://cdn.example.com/ext/` | `foo.crx` | `https://cdn.example.com/ext/foo.crx` |
//! | `https://cdn.example.com/ext` | `foo.crx` | `https://cdn.example.com/ext/foo.crx` |
//! | `https://cdn.example.com//ext//` | `foo.crx` | `https://cdn.example.com/ext/foo.crx` |
//! | `https://cdn.example.com/ext/foo.CRX` | `foo.crx` | unchanged |
//!
//! Only `http` and `https` URLs without query string or fragment are
//! accepted; everything else is rejected with [`Error::InvalidUpdateUrl`].

use crate::packager::error::{Error, ErrorExt, Result};
use crate::packager::settings::{Settings, UpdateInfo};
use handlebars::Handlebars;
use std::path::PathBuf;
use url::Url;

/// File name of the generated update descriptor.
pub const UPDATE_FILE: &str = "update.xml";

const UPDATE_TEMPLATE: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<gupdate xmlns=\"http://www.google.com/update2/response\" protocol=\"2.0\">\n",
    "  <app appid=\"{{id}}\">\n",
    "    <updatecheck codebase=\"{{codebase}}\" version=\"{{version}}\" />\n",
    "  </app>\n",
    "</gupdate>",
);

/// Writes `update.xml` into the build directory.
///
/// Returns `None` without touching the disk when no update description is
/// configured.
pub async fn write_update_xml(settings: &Settings) -> Result<Option<PathBuf>> {
    let Some(info) = settings.update() else {
        log::info!("Update description is undefined. Define your own {UPDATE_FILE}");
        return Ok(None);
    };

    log::info!("Creating {UPDATE_FILE}");
    let rendered = render_update_xml(info, settings.crx_file_name())?;
    let path = settings.paths().build_dir.join(UPDATE_FILE);
    tokio::fs::write(&path, rendered)
        .await
        .fs_context("writing update descriptor", &path)?;

    Ok(Some(path))
}

/// Renders the update descriptor for `info`.
pub fn render_update_xml(info: &UpdateInfo, crx_file_name: &str) -> Result<String> {
    let codebase = normalize_codebase(&info.url, crx_file_name)?;

    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::html_escape);

    let data = serde_json::json!({
        "id": info.id,
        "codebase": codebase,
        "version": info.version,
    });
    Ok(handlebars.render_template(UPDATE_TEMPLATE, &data)?)
}

/// Points `url` at the package file.
///
/// URLs already ending in `.crx` (any case) are returned unchanged. Otherwise
/// the package file name is appended and runs of `/` after the scheme are
/// collapsed; the scheme prefix is kept exactly as written.
pub fn normalize_codebase(url: &str, crx_file_name: &str) -> Result<String> {
    let invalid = |reason: String| Error::InvalidUpdateUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "scheme '{}' is not supported, use http or https",
            parsed.scheme()
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid(
            "query strings and fragments are not supported".to_string(),
        ));
    }

    if url.to_ascii_lowercase().ends_with(".crx") {
        return Ok(url.to_string());
    }

    let split = url
        .find("://")
        .map(|i| i + 3)
        .ok_or_else(|| invalid("missing '://' after the scheme".to_string()))?;
    let (scheme, rest) = url.split_at(split);

    let mut normalized = String::with_capacity(url.len() + crx_file_name.len() + 1);
    normalized.push_str(scheme);
    let mut previous_slash = false;
    for c in rest.chars().chain(std::iter::once('/')).chain(crx_file_name.chars()) {
        if c == '/' && previous_slash {
            continue;
        }
        previous_slash = c == '/';
        normalized.push(c);
    }

    Ok(normalized)
}
