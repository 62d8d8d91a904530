//! Pipeline orchestration.
//!
//! [`Packager`] runs the stages strictly in order:
//!
//! 1. Stage: recreate the build directory and copy resources into it
//! 2. Metadata: write `manifest.json` and `update.xml` when configured
//! 3. Archive: compress the build directory into the web store zip
//! 4. Sign: run the packaging executable and move its outputs into place
//! 5. Clean: remove the build directory when `clean` is set
//!
//! Any failure in stages 1-4 aborts the run; cleanup never fails it.
//!
//! # Example
//!
//! ```no_run
//! use crx_packager::packager::{Packager, RawOptions, SettingsBuilder};
//!
//! # async fn example() -> crx_packager::packager::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .options(RawOptions {
//!         name: Some("my-ext".into()),
//!         chrome: Some("google-chrome".into()),
//!         cert_path: Some("keys/my-ext.pem".into()),
//!         crx_path: Some("dist/my-ext.crx".into()),
//!         build_dir: Some("build/my-ext".into()),
//!         zip_path: Some("dist/my-ext.zip".into()),
//!         clean: Some(true),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let report = Packager::new(settings).package().await?;
//! println!("{} ({} bytes, sha256 {})", report.crx.display(), report.size, report.checksum);
//! # Ok(())
//! # }
//! ```

use crate::packager::error::{Context, ErrorExt, Result};
use crate::packager::settings::Settings;
use crate::packager::sign::{ChromePackTool, PackTool};
use crate::packager::{archive, clean, metadata, sign, stage};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PackageReport {
    /// Extension name.
    pub name: String,
    /// Staged files, relative to the build directory.
    pub staged_files: Vec<PathBuf>,
    /// Generated metadata files.
    pub metadata_files: Vec<PathBuf>,
    /// Web store archive.
    pub zip: PathBuf,
    /// Number of entries in the archive.
    pub zip_entries: usize,
    /// Signed package.
    pub crx: PathBuf,
    /// Size of the signed package in bytes.
    pub size: u64,
    /// SHA-256 checksum of the signed package.
    pub checksum: String,
    /// Signing key.
    pub cert: PathBuf,
    /// Whether the key was generated during this run.
    pub key_generated: bool,
    /// Whether the build directory was removed.
    pub cleaned: bool,
}

/// Main packaging orchestrator.
#[derive(Debug)]
pub struct Packager<T: PackTool = ChromePackTool> {
    settings: Settings,
    tool: T,
}

impl Packager<ChromePackTool> {
    /// Creates a packager that signs with the configured browser executable.
    pub fn new(settings: Settings) -> Self {
        Self::with_tool(settings, ChromePackTool)
    }
}

impl<T: PackTool> Packager<T> {
    /// Creates a packager that signs with `tool`.
    pub fn with_tool(settings: Settings, tool: T) -> Self {
        Self { settings, tool }
    }

    /// Returns the settings this packager runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the full pipeline.
    pub async fn package(&self) -> Result<PackageReport> {
        let settings = &self.settings;
        let paths = settings.paths();

        log::info!("chrome-extension: {}", settings.name());
        log::info!("\tchrome: {}", settings.chrome().display());
        log::info!("\tpath: {}", paths.build_dir.display());
        log::info!("\tcert: {}", paths.cert.display());
        log::info!("\tcws zip: {}", paths.zip.display());

        let staged_files = stage::stage_resources(settings).await?;
        let metadata_files = metadata::generate_metadata(settings).await?;
        let zip_entries = archive::create_archive(settings)
            .await
            .context("creating web store archive")?;
        let signed = sign::sign_extension(settings, &self.tool).await?;
        let (size, checksum) = checksum(&signed.crx).await?;
        let cleaned = clean::clean_build_dir(settings).await;

        log::info!("Packaged {} ({size} bytes)", signed.crx.display());

        Ok(PackageReport {
            name: settings.name().to_string(),
            staged_files,
            metadata_files,
            zip: paths.zip.clone(),
            zip_entries,
            crx: signed.crx,
            size,
            checksum,
            cert: signed.cert,
            key_generated: signed.key_generated,
            cleaned,
        })
    }
}

async fn checksum(path: &Path) -> Result<(u64, String)> {
    let content = tokio::fs::read(path)
        .await
        .fs_context("reading signed package", path)?;
    Ok((content.len() as u64, hex::encode(Sha256::digest(&content))))
}
