//! Configuration structures for packaging operations.
//!
//! [`RawOptions`] mirrors the configuration surface exactly as the host
//! supplies it: every key optional, paths as written. [`SettingsBuilder`]
//! validates it, applies defaults and resolves every path once, producing
//! the immutable [`Settings`] value each pipeline stage reads from.

use crate::packager::error::{Error, ErrorExt, Result};
use crate::packager::paths;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Resource patterns staged when the configuration names none.
pub const DEFAULT_RESOURCES: &[&str] = &["js/**", "images/**", "*.html"];

/// Update check description rendered into `update.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    /// Extension id (`appid`).
    pub id: String,
    /// Where clients fetch the package from.
    pub url: String,
    /// Version advertised to clients.
    pub version: String,
}

/// Caller supplied options, before validation.
///
/// Keys use the camelCase spelling of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOptions {
    /// Extension name; also the top-level folder inside the zip.
    pub name: Option<String>,
    /// Resource patterns, relative to `cwd`.
    pub resources: Option<Vec<String>>,
    /// Packaging executable.
    #[serde(alias = "chromePath")]
    pub chrome: Option<PathBuf>,
    /// Private signing key.
    pub cert_path: Option<PathBuf>,
    /// Final location of the signed package.
    pub crx_path: Option<PathBuf>,
    /// Staging directory.
    pub build_dir: Option<PathBuf>,
    /// Final location of the web store archive.
    pub zip_path: Option<PathBuf>,
    /// Manifest written verbatim as `manifest.json`.
    pub manifest: Option<Map<String, Value>>,
    /// Update description rendered as `update.xml`.
    pub update: Option<UpdateInfo>,
    /// Fallback for the manifest's `update_url`.
    pub update_url: Option<String>,
    /// Base directory for resource patterns.
    pub cwd: Option<PathBuf>,
    /// Disable deletion protection.
    pub force: Option<bool>,
    /// Remove the build directory after packing.
    pub clean: Option<bool>,
}

/// Resolved output and staging locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPaths {
    /// Staging directory handed to the packaging executable.
    pub build_dir: PathBuf,
    /// Signing key.
    pub cert: PathBuf,
    /// Signed package.
    pub crx: PathBuf,
    /// Web store archive.
    pub zip: PathBuf,
}

/// Validated packaging configuration.
///
/// Every path is absolute. Constructed once by [`SettingsBuilder::build`] and
/// passed by reference to every stage.
#[derive(Debug, Clone)]
pub struct Settings {
    name: String,
    resources: Vec<String>,
    chrome: PathBuf,
    paths: ExtensionPaths,
    manifest: Option<Map<String, Value>>,
    update: Option<UpdateInfo>,
    update_url: Option<String>,
    crx_file_name: String,
    base_dir: PathBuf,
    cwd: PathBuf,
    force: bool,
    clean: bool,
}

impl Settings {
    /// Returns the extension name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the resource patterns.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Returns the absolute path of the packaging executable.
    pub fn chrome(&self) -> &Path {
        &self.chrome
    }

    /// Returns the resolved output and staging paths.
    pub fn paths(&self) -> &ExtensionPaths {
        &self.paths
    }

    /// Returns the manifest description, if any.
    pub fn manifest(&self) -> Option<&Map<String, Value>> {
        self.manifest.as_ref()
    }

    /// Returns the update description, if any.
    pub fn update(&self) -> Option<&UpdateInfo> {
        self.update.as_ref()
    }

    /// Returns the fallback manifest `update_url`.
    pub fn update_url(&self) -> Option<&str> {
        self.update_url.as_deref()
    }

    /// Returns the project base directory that relative paths resolve against.
    ///
    /// Recursive deletion is confined to this directory unless `force` is set.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the base directory for resource patterns.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether deletion protection is disabled.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Whether the build directory is removed after packing.
    pub fn clean(&self) -> bool {
        self.clean
    }

    /// File name of the signed package, e.g. `my-ext.crx`.
    pub fn crx_file_name(&self) -> &str {
        &self.crx_file_name
    }
}

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use crx_packager::packager::{RawOptions, SettingsBuilder};
///
/// # fn example() -> crx_packager::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .options(RawOptions {
///         name: Some("my-ext".into()),
///         chrome: Some("google-chrome".into()),
///         cert_path: Some("keys/my-ext.pem".into()),
///         crx_path: Some("dist/my-ext.crx".into()),
///         build_dir: Some("build/my-ext".into()),
///         zip_path: Some("dist/my-ext.zip".into()),
///         ..Default::default()
///     })
///     .base_dir("/work/my-ext")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    options: RawOptions,
    base_dir: Option<PathBuf>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the raw caller options.
    pub fn options(mut self, options: RawOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the directory relative paths are resolved against.
    ///
    /// Default: the process working directory
    pub fn base_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.base_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingOption`] for the first absent or empty option
    /// among `name`, `chrome`, `certPath`, `crxPath`, `buildDir`, `zipPath`,
    /// and for a `crxPath` that does not name a file.
    pub fn build(self) -> Result<Settings> {
        let RawOptions {
            name,
            resources,
            chrome,
            cert_path,
            crx_path,
            build_dir,
            zip_path,
            manifest,
            update,
            update_url,
            cwd,
            force,
            clean,
        } = self.options;

        let name = required_string(name, "name")?;
        let chrome = required_path(chrome, "chrome")?;
        let cert_path = required_path(cert_path, "certPath")?;
        let crx_path = required_path(crx_path, "crxPath")?;
        let build_dir = required_path(build_dir, "buildDir")?;
        let zip_path = required_path(zip_path, "zipPath")?;

        let base = match self.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().fs_context("reading working directory", ".")?,
        };
        let base = paths::resolve(&base, &base)?;

        let cwd = match cwd.filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => paths::resolve(&dir, &base)?,
            None => base.clone(),
        };

        let crx = paths::resolve(&crx_path, &base)?;
        let crx_file_name = crx
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or(Error::MissingOption { option: "crxPath" })?;

        Ok(Settings {
            name,
            resources: resources.unwrap_or_else(|| {
                DEFAULT_RESOURCES.iter().map(|s| s.to_string()).collect()
            }),
            chrome: locate_executable(&chrome, &base)?,
            paths: ExtensionPaths {
                build_dir: paths::resolve(&build_dir, &base)?,
                cert: paths::resolve(&cert_path, &base)?,
                crx,
                zip: paths::resolve(&zip_path, &base)?,
            },
            manifest,
            update,
            update_url: update_url.filter(|url| !url.is_empty()),
            crx_file_name,
            base_dir: base,
            cwd,
            force: force.unwrap_or(false),
            clean: clean.unwrap_or(false),
        })
    }
}

fn required_string(value: Option<String>, option: &'static str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(Error::MissingOption { option })
}

fn required_path(value: Option<PathBuf>, option: &'static str) -> Result<PathBuf> {
    value
        .filter(|v| !v.as_os_str().is_empty())
        .ok_or(Error::MissingOption { option })
}

/// Resolves the packaging executable.
///
/// A bare program name that does not exist next to the configuration is
/// looked up on `PATH`.
fn locate_executable(program: &Path, base: &Path) -> Result<PathBuf> {
    let resolved = paths::resolve(program, base)?;
    let bare = !program.is_absolute() && program.components().count() == 1;

    if bare && !resolved.exists() {
        match which::which(program) {
            Ok(found) => {
                log::debug!("Found {} at {}", program.display(), found.display());
                return Ok(found);
            }
            Err(e) => {
                log::debug!("{} not found in PATH: {}", program.display(), e);
            }
        }
    }

    Ok(resolved)
}
