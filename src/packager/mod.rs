//! Browser extension packaging pipeline.
//!
//! Turns an extension source tree into:
//!
//! | Output | Produced by |
//! |--------|-------------|
//! | staged build directory | [`stage`] |
//! | `manifest.json`, `update.xml` | [`metadata`] |
//! | web store `.zip` | [`archive`] |
//! | signed `.crx` (and `.pem` on first run) | [`sign`] via the browser executable |
//!
//! # Configuration
//!
//! ```toml
//! name = "my-ext"
//! chrome = "google-chrome"
//! certPath = "keys/my-ext.pem"
//! crxPath = "dist/my-ext.crx"
//! buildDir = "build/my-ext"
//! zipPath = "dist/my-ext.zip"
//! clean = true
//!
//! [update]
//! id = "abcdefghijklmnopabcdefghijklmnop"
//! url = "https://cdn.example.com/ext/"
//! version = "1.0.0"
//! ```
//!
//! # Signing keys
//!
//! The first run has no key; the browser generates one and it is moved to
//! `certPath`. Keep that file: every later run reuses it, which keeps the
//! extension id stable.

#![warn(missing_docs)]

pub mod archive;
mod builder;
pub mod clean;
mod error;
pub mod metadata;
pub mod paths;
mod settings;
pub mod sign;
pub mod stage;
mod utils;

// Public re-exports
pub use builder::{PackageReport, Packager};
pub use error::{Context, Error, ErrorExt, Result};
pub use settings::{
    DEFAULT_RESOURCES, ExtensionPaths, RawOptions, Settings, SettingsBuilder, UpdateInfo,
};
pub use sign::{ChromePackTool, KeyState, PackInvocation, PackTool, SignedPackage, ToolOutput};
