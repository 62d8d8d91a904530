//! Path resolution for the packaging pipeline.
//!
//! Filesystem APIs get plain absolute paths. Paths that end up on a command
//! line are additionally rendered for the current shell family: Windows
//! shells need double quotes around paths that may contain spaces.

use crate::packager::error::{ErrorExt, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Shell family that determines how command line arguments are rendered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShellFamily {
    /// `cmd.exe` and friends; paths are wrapped in double quotes.
    Windows,
    /// POSIX shells; paths are rendered unquoted.
    Posix,
}

impl ShellFamily {
    /// Shell family of the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            ShellFamily::Windows
        } else {
            ShellFamily::Posix
        }
    }
}

/// Resolves `path` to a normalized absolute path, relative paths being taken
/// from `base`.
///
/// The path does not need to exist. `.` and `..` components are folded.
pub fn resolve(path: &Path, base: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize_from(base)
        .fs_context("resolving path", path)?
        .into_owned())
}

/// Renders an already absolute path as a command line argument.
pub fn quote_for_shell(path: &Path, shell: ShellFamily) -> String {
    let rendered = path.display().to_string();
    match shell {
        ShellFamily::Windows => format!("\"{rendered}\""),
        ShellFamily::Posix => rendered,
    }
}

/// Appends `suffix` to the final component of `path`.
///
/// Unlike [`Path::with_extension`] this keeps any dot already present in the
/// directory name: `build/my.ext` becomes `build/my.ext.crx`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(suffix);
    PathBuf::from(raw)
}
