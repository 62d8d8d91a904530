//! Error types for packaging operations.
//!
//! Provides contextual error chaining, filesystem errors that carry the
//! offending path, and one variant per pipeline failure mode so the host can
//! tell a bad configuration from a failed signing run.
//!
//! # Example
//!
//! ```no_run
//! use crx_packager::packager::{ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_key(path: &Path) -> Result<Vec<u8>> {
//!     std::fs::read(path).fs_context("reading signing key", path)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the packaging pipeline.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// A required option was absent or empty.
    #[error("required option '{option}' is missing")]
    MissingOption {
        /// Configuration key, as spelled in the configuration file
        option: &'static str,
    },

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "creating build directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Recursive deletion outside the project base directory without `force`.
    #[error(
        "refusing to delete {path}: it is outside of (or equal to) {base}. Set force to override"
    )]
    DeletionRefused {
        /// Path that would have been deleted
        path: PathBuf,
        /// Project base directory
        base: PathBuf,
    },

    /// Update URL cannot be normalized into a package codebase.
    #[error("invalid update url '{url}': {reason}")]
    InvalidUpdateUrl {
        /// URL from the update description
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The staged build directory does not exist when packing.
    #[error("unable to find extension in {path}")]
    MissingStage {
        /// Expected build directory
        path: PathBuf,
    },

    /// The packaging executable could not be started.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command line that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// The packaging executable ran and reported failure.
    #[error("packaging executable failed with exit code {code:?}: {stderr}")]
    PackToolFailed {
        /// Command line that was executed
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// An output the packaging executable should have written is missing.
    #[error("expected {kind} at {path} after packing, but it does not exist")]
    MissingOutput {
        /// "package" or "signing key"
        kind: &'static str,
        /// Where the file was expected
        path: PathBuf,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking directory.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// ZIP archive creation error.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// JSON serialization error.
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// Invalid resource pattern.
    #[error("{0}")]
    GlobPattern(#[from] glob::PatternError),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether re-running the pipeline after fixing the cause is expected to work.
    ///
    /// A failed run of the packaging executable leaves the staged directory in
    /// place; the next run recreates it from scratch.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Context(_, inner) => inner.is_recoverable(),
            Error::PackToolFailed { .. } | Error::MissingStage { .. } => true,
            _ => false,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the packager's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying resource".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::packager::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::packager::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::packager::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
