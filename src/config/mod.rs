//! Loading packaging options from a configuration file.
//!
//! `.json` files are parsed as JSON, anything else as TOML. Relative paths
//! inside the file are resolved against the directory containing it.

use crate::error::{ConfigError, Result};
use crate::packager::{paths, RawOptions, Settings, SettingsBuilder};
use std::path::{Path, PathBuf};

/// Configuration file looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "crx-packager.toml";

/// Syntax of a configuration file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigFormat {
    /// TOML document
    Toml,
    /// JSON document
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Command line values that take precedence over the file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    /// Packaging executable
    pub chrome: Option<PathBuf>,
    /// Force deletion outside the project directory
    pub force: bool,
    /// Explicit clean setting
    pub clean: Option<bool>,
}

impl Overrides {
    /// Applies the overrides on top of file options.
    pub fn apply(&self, options: &mut RawOptions) {
        if let Some(chrome) = &self.chrome {
            options.chrome = Some(chrome.clone());
        }
        if self.force {
            options.force = Some(true);
        }
        if let Some(clean) = self.clean {
            options.clean = Some(clean);
        }
    }
}

/// Parses options from `content`.
pub fn parse_options(content: &str, format: ConfigFormat, path: &Path) -> Result<RawOptions> {
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|reason| {
        ConfigError::ParseFailed {
            path: path.to_path_buf(),
            reason,
        }
        .into()
    })
}

/// Reads and parses the configuration file at `path`.
pub fn load_options(path: &Path) -> Result<RawOptions> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded configuration from {}", path.display());

    parse_options(&content, ConfigFormat::from_path(path), path)
}

/// Loads, overrides and validates the configuration at `path`.
pub fn load_settings(path: &Path, overrides: &Overrides) -> Result<Settings> {
    let mut options = load_options(path)?;
    overrides.apply(&mut options);

    let cwd = std::env::current_dir()?;
    let config_path = paths::resolve(path, &cwd)?;
    let base_dir = config_path.parent().unwrap_or(cwd.as_path()).to_path_buf();

    Ok(SettingsBuilder::new()
        .options(options)
        .base_dir(base_dir)
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrxError;
    use tempfile::TempDir;

    const TOML_CONFIG: &str = r#"
name = "my-ext"
chrome = "/opt/chrome/chrome"
certPath = "keys/my-ext.pem"
crxPath = "dist/my-ext.crx"
buildDir = "build/my-ext"
zipPath = "dist/my-ext.zip"
resources = ["js/**", "*.html"]
updateUrl = "https://cdn.example.com/ext/update.xml"

[manifest]
name = "My Extension"
version = "1.0.0"
manifest_version = 3

[update]
id = "abcdefghijklmnopabcdefghijklmnop"
url = "https://cdn.example.com/ext/"
version = "1.0.0"
"#;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn test_parse_toml_options() {
        let options = parse_options(TOML_CONFIG, ConfigFormat::Toml, Path::new("c.toml")).unwrap();
        assert_eq!(options.name.as_deref(), Some("my-ext"));
        assert_eq!(options.resources.unwrap().len(), 2);
        let manifest = options.manifest.unwrap();
        assert_eq!(manifest["manifest_version"], 3);
        assert_eq!(options.update.unwrap().version, "1.0.0");
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse_options("name = ", ConfigFormat::Toml, Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, CrxError::Config(ConfigError::ParseFailed { .. })));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse_options(r#"{"nmae": "x"}"#, ConfigFormat::Json, Path::new("c.json"));
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_options(&temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CrxError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut options = RawOptions {
            chrome: Some("chromium".into()),
            clean: Some(true),
            ..Default::default()
        };
        Overrides {
            chrome: Some("/usr/bin/google-chrome".into()),
            force: true,
            clean: Some(false),
        }
        .apply(&mut options);

        assert_eq!(options.chrome, Some(PathBuf::from("/usr/bin/google-chrome")));
        assert_eq!(options.force, Some(true));
        assert_eq!(options.clean, Some(false));
    }

    #[test]
    fn test_paths_relative_to_config_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("crx-packager.toml");
        std::fs::write(&config, TOML_CONFIG).unwrap();

        let settings = load_settings(&config, &Overrides::default()).unwrap();
        assert!(settings.paths().build_dir.starts_with(temp.path()));
        assert!(settings.paths().crx.ends_with("dist/my-ext.crx"));
        assert_eq!(settings.cwd(), temp.path());
    }
}
