//! # crx_packager
//!
//! Packages a browser extension source tree for distribution.
//!
//! A run stages the configured resources into a build directory, generates
//! `manifest.json` and `update.xml`, zips the staged tree for the web store
//! and signs it into a `.crx` with a Chromium-based browser's
//! `--pack-extension` switch.
//!
//! ## Features
//!
//! - **Resource staging**: glob patterns with `!` exclusions into a fresh build directory
//! - **Metadata generation**: manifest with `update_url` back-filled, auto-update XML
//! - **Key handling**: first run generates a signing key, later runs reuse it
//! - **Overwrite protection**: recursive deletion limited to the project directory
//!
//! ## Usage
//!
//! ```bash
//! crx_packager validate                         # check crx-packager.toml
//! crx_packager pack                             # stage, archive and sign
//! crx_packager --config ext.json pack --force   # JSON config, allow outside deletion
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod error;
pub mod packager;

// Re-export main types for public API
pub use cli::Args;
pub use config::{DEFAULT_CONFIG_FILE, Overrides};
pub use error::{CliError, ConfigError, CrxError, Result};
pub use packager::{PackageReport, Packager, Settings, SettingsBuilder};
