//! Error types for crx_packager operations.
//!
//! This module defines the application-level error with actionable error
//! messages and recovery suggestions. Pipeline failures are carried as
//! [`crate::packager::Error`].

use crate::packager;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for crx_packager operations
pub type Result<T> = std::result::Result<T, CrxError>;

/// Main error type for all crx_packager operations
#[derive(Error, Debug)]
pub enum CrxError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Packaging pipeline errors
    #[error("Packaging error: {0}")]
    Packager(#[from] packager::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Configuration file not found at {path}")]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        /// Configuration file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML or JSON for the option set
    #[error("Failed to parse {path}: {reason}")]
    ParseFailed {
        /// Configuration file
        path: PathBuf,
        /// Parser message
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl CrxError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            CrxError::Config(ConfigError::NotFound { path }) => vec![
                format!("Create {} with the packaging options", path.display()),
                "Point at another file with --config <FILE>".to_string(),
            ],
            CrxError::Config(ConfigError::ParseFailed { .. }) => vec![
                "Option keys are camelCase: certPath, crxPath, buildDir, zipPath, updateUrl"
                    .to_string(),
                "Files ending in .json are parsed as JSON, everything else as TOML".to_string(),
            ],
            CrxError::Packager(error) => packager_suggestions(root_cause(error)),
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by re-running after fixing its cause
    pub fn is_recoverable(&self) -> bool {
        match self {
            CrxError::Packager(error) => error.is_recoverable(),
            _ => false,
        }
    }
}

fn root_cause(error: &packager::Error) -> &packager::Error {
    match error {
        packager::Error::Context(_, inner) => root_cause(inner),
        other => other,
    }
}

fn packager_suggestions(error: &packager::Error) -> Vec<String> {
    use packager::Error;

    match error {
        Error::MissingOption { option } => vec![
            format!("Add '{option}' to the configuration file"),
            "Run `crx_packager validate` to check the configuration".to_string(),
        ],
        Error::DeletionRefused { .. } => vec![
            "Move buildDir inside the project directory (next to the config file)".to_string(),
            "Or set force = true to allow deleting it anyway".to_string(),
        ],
        Error::InvalidUpdateUrl { .. } => vec![
            "Use an http(s) URL without query string, e.g. https://cdn.example.com/ext/"
                .to_string(),
        ],
        Error::CommandFailed { .. } => vec![
            "Check that 'chrome' points to an existing browser executable".to_string(),
            "Override it with --chrome <PATH> or CRX_PACKAGER_CHROME".to_string(),
        ],
        Error::PackToolFailed { .. } => vec![
            "Maybe not all necessary files were copied: check the resources patterns".to_string(),
            "Run the printed command manually to see the browser's own error".to_string(),
            "Re-run crx_packager pack once fixed; the build directory is recreated".to_string(),
        ],
        Error::MissingStage { .. } => vec![
            "Re-run crx_packager pack; the stage step recreates the build directory".to_string(),
        ],
        Error::MissingOutput { .. } => vec![
            "Check that 'chrome' is a Chromium-based browser supporting --pack-extension"
                .to_string(),
        ],
        _ => vec!["Check the error message above for specific details".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_see_through_context() {
        let inner = packager::Error::DeletionRefused {
            path: PathBuf::from("/tmp/build"),
            base: PathBuf::from("/work"),
        };
        let error = CrxError::Packager(packager::Error::Context(
            "staging".to_string(),
            Box::new(inner),
        ));
        let suggestions = error.recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("force")));
    }

    #[test]
    fn test_pack_tool_failure_is_recoverable() {
        let error = CrxError::Packager(packager::Error::PackToolFailed {
            command: "chrome --pack-extension=/tmp/build".to_string(),
            code: Some(1),
            stderr: String::new(),
        });
        assert!(error.is_recoverable());

        let config = CrxError::Config(ConfigError::NotFound {
            path: PathBuf::from("crx-packager.toml"),
        });
        assert!(!config.is_recoverable());
    }
}
