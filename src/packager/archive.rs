//! Web store archive creation.

use crate::packager::error::{Error, ErrorExt, Result};
use crate::packager::settings::Settings;
use crate::packager::utils::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// Compresses the build directory into the configured zip.
///
/// Every entry is rooted under a folder named after the extension. Returns
/// the number of entries written.
pub async fn create_archive(settings: &Settings) -> Result<usize> {
    let source = settings.paths().build_dir.clone();
    let zip_path = settings.paths().zip.clone();
    let root = settings.name().to_string();

    log::info!("Compressing {} into {}", source.display(), zip_path.display());
    fs::ensure_parent(&zip_path).await?;

    let entries = tokio::task::spawn_blocking(move || write_archive(&source, &zip_path, &root))
        .await
        .map_err(|e| Error::GenericError(format!("archive task failed: {e}")))??;

    log::info!("Archived {entries} entries");
    Ok(entries)
}

/// Writes `source_dir` into a new zip at `zip_path` under the folder `root`.
pub fn write_archive(source_dir: &Path, zip_path: &Path, root: &str) -> Result<usize> {
    let file = File::create(zip_path).fs_context("creating archive", zip_path)?;
    let mut zip = ZipWriter::new(file);

    let dir_options = SimpleFileOptions::default().unix_permissions(0o755);
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    zip.add_directory(format!("{root}/"), dir_options)?;
    let mut entries = 1;

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path == zip_path {
            continue;
        }

        let name = entry_name(root, path.strip_prefix(source_dir)?);
        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), dir_options)?;
        } else if path.is_file() {
            zip.start_file(name, file_options)?;
            let content = std::fs::read(path).fs_context("reading staged file", path)?;
            zip.write_all(&content)
                .fs_context("writing archive entry", zip_path)?;
        } else {
            continue;
        }
        entries += 1;
    }

    zip.finish()?;
    Ok(entries)
}

/// Archive entry name: `root` followed by `relative` with `/` separators.
fn entry_name(root: &str, relative: &Path) -> String {
    let mut name = root.to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}
