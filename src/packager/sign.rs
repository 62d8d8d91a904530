//! Signing the staged directory with the packaging executable.
//!
//! The executable is a black box: it is handed the build directory and,
//! when one exists, the private key. It writes `<build dir>.crx` next to the
//! build directory and, when it had to generate a key, `<build dir>.pem`.
//! Those outputs are verified and moved to their configured locations.

use crate::packager::error::{Error, Result};
use crate::packager::paths::{self, ShellFamily};
use crate::packager::settings::Settings;
use crate::packager::utils::fs;
use std::path::{Path, PathBuf};

/// Suffix of the signed package written by the packaging executable.
pub const PACKAGE_SUFFIX: &str = "crx";

/// Suffix of a newly generated signing key.
pub const KEY_SUFFIX: &str = "pem";

/// Whether a signing key exists before packing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyState {
    /// The key at `certPath` is reused; the extension id stays stable.
    Present,
    /// The packaging executable generates a new key.
    Absent,
}

impl KeyState {
    /// Inspects `cert` on disk.
    pub fn detect(cert: &Path) -> Self {
        if cert.exists() {
            KeyState::Present
        } else {
            KeyState::Absent
        }
    }
}

/// One invocation of the packaging executable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackInvocation {
    /// Absolute path of the packaging executable.
    pub program: PathBuf,
    /// Absolute path of the build directory.
    pub extension_dir: PathBuf,
    /// Absolute path of the key to sign with, only when it already exists.
    pub key: Option<PathBuf>,
}

impl PackInvocation {
    /// Builds the invocation for `settings` in the given key state.
    pub fn new(settings: &Settings, key_state: KeyState) -> Self {
        let paths = settings.paths();
        Self {
            program: settings.chrome().to_path_buf(),
            extension_dir: paths.build_dir.clone(),
            key: match key_state {
                KeyState::Present => Some(paths.cert.clone()),
                KeyState::Absent => None,
            },
        }
    }

    /// Arguments passed to the executable, without shell quoting.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-message-box".to_string(),
            format!("--pack-extension={}", self.extension_dir.display()),
        ];
        if let Some(key) = &self.key {
            args.push(format!("--pack-extension-key={}", key.display()));
        }
        args
    }

    /// Shell-form command line, quoted for `shell`.
    pub fn command_line_for(&self, shell: ShellFamily) -> String {
        let mut line = vec![
            paths::quote_for_shell(&self.program, shell),
            "--no-message-box".to_string(),
            format!(
                "--pack-extension={}",
                paths::quote_for_shell(&self.extension_dir, shell)
            ),
        ];
        if let Some(key) = &self.key {
            line.push(format!(
                "--pack-extension-key={}",
                paths::quote_for_shell(key, shell)
            ));
        }
        line.join(" ")
    }

    /// Shell-form command line for the current platform.
    pub fn command_line(&self) -> String {
        self.command_line_for(ShellFamily::current())
    }

    /// Package the executable writes next to the build directory.
    pub fn produced_package(&self) -> PathBuf {
        paths::with_suffix(&self.extension_dir, PACKAGE_SUFFIX)
    }

    /// Key the executable writes next to the build directory on first use.
    pub fn produced_key(&self) -> PathBuf {
        paths::with_suffix(&self.extension_dir, KEY_SUFFIX)
    }
}

/// Captured result of a finished packaging executable.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs the packaging executable.
///
/// The pipeline awaits the returned future until the process exits; there is
/// no timeout.
#[allow(async_fn_in_trait)]
pub trait PackTool {
    /// Runs `invocation` to completion.
    ///
    /// Only failures to start the process are errors; a nonzero exit is
    /// reported through [`ToolOutput`].
    async fn pack(&self, invocation: &PackInvocation) -> Result<ToolOutput>;
}

/// [`PackTool`] spawning the real browser executable.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromePackTool;

impl PackTool for ChromePackTool {
    async fn pack(&self, invocation: &PackInvocation) -> Result<ToolOutput> {
        let output = tokio::process::Command::new(&invocation.program)
            .args(invocation.args())
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: invocation.command_line(),
                error,
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Outcome of a successful signing stage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedPackage {
    /// Final location of the signed package.
    pub crx: PathBuf,
    /// Final location of the signing key.
    pub cert: PathBuf,
    /// Whether the key was generated during this run.
    pub key_generated: bool,
}

/// Signs the staged directory and moves the outputs into place.
///
/// # Errors
///
/// - [`Error::MissingStage`] when the build directory does not exist; the
///   executable is not started.
/// - [`Error::PackToolFailed`] when the executable exits unsuccessfully;
///   nothing is moved.
/// - [`Error::MissingOutput`] when the executable succeeded but an expected
///   file is missing.
pub async fn sign_extension<T: PackTool>(settings: &Settings, tool: &T) -> Result<SignedPackage> {
    let paths = settings.paths();

    if !paths.build_dir.is_dir() {
        log::warn!("Unable to find extension in {}", paths.build_dir.display());
        return Err(Error::MissingStage {
            path: paths.build_dir.clone(),
        });
    }

    let key_state = KeyState::detect(&paths.cert);
    if key_state == KeyState::Absent {
        log::info!(
            "No signing key at {}; a new one will be generated",
            paths.cert.display()
        );
    }

    let invocation = PackInvocation::new(settings, key_state);
    let command = invocation.command_line();
    log::info!("Executing command: {command}");

    let output = tool.pack(&invocation).await?;
    if !output.success() {
        log::error!(
            "Error while compiling CRX, maybe not all necessary files were copied: {}",
            output.stderr.trim()
        );
        return Err(Error::PackToolFailed {
            command,
            code: output.code,
            stderr: output.stderr,
        });
    }

    let produced_package = invocation.produced_package();
    let produced_key = invocation.produced_key();
    if !produced_package.is_file() {
        return Err(Error::MissingOutput {
            kind: "package",
            path: produced_package,
        });
    }
    if key_state == KeyState::Absent && !produced_key.is_file() {
        return Err(Error::MissingOutput {
            kind: "signing key",
            path: produced_key,
        });
    }

    log::info!("Moving CRX to {}", paths.crx.display());
    fs::move_file(&produced_package, &paths.crx).await?;

    if key_state == KeyState::Absent {
        log::info!("Moving PEM to {}", paths.cert.display());
        fs::move_file(&produced_key, &paths.cert).await?;
    }

    Ok(SignedPackage {
        crx: paths.crx.clone(),
        cert: paths.cert.clone(),
        key_generated: key_state == KeyState::Absent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(key: Option<&str>) -> PackInvocation {
        PackInvocation {
            program: PathBuf::from("/opt/google chrome/chrome"),
            extension_dir: PathBuf::from("/work/build/my ext"),
            key: key.map(PathBuf::from),
        }
    }

    #[test]
    fn test_args_without_key() {
        assert_eq!(
            invocation(None).args(),
            vec![
                "--no-message-box".to_string(),
                "--pack-extension=/work/build/my ext".to_string(),
            ]
        );
    }

    #[test]
    fn test_args_with_key() {
        let args = invocation(Some("/work/key.pem")).args();
        assert_eq!(args.len(), 3);
        assert_eq!(args[2], "--pack-extension-key=/work/key.pem");
    }

    #[test]
    fn test_command_line_windows_quotes_paths() {
        assert_eq!(
            invocation(Some("/work/key.pem")).command_line_for(ShellFamily::Windows),
            "\"/opt/google chrome/chrome\" --no-message-box \
             --pack-extension=\"/work/build/my ext\" \
             --pack-extension-key=\"/work/key.pem\""
        );
    }

    #[test]
    fn test_command_line_posix_unquoted() {
        assert_eq!(
            invocation(None).command_line_for(ShellFamily::Posix),
            "/opt/google chrome/chrome --no-message-box --pack-extension=/work/build/my ext"
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_produced_outputs_sit_next_to_build_dir() {
        let inv = invocation(None);
        assert_eq!(inv.produced_package(), PathBuf::from("/work/build/my ext.crx"));
        assert_eq!(inv.produced_key(), PathBuf::from("/work/build/my ext.pem"));
    }

    #[test]
    fn test_tool_output_success() {
        assert!(ToolOutput { code: Some(0), ..Default::default() }.success());
        assert!(!ToolOutput { code: Some(1), ..Default::default() }.success());
        assert!(!ToolOutput { code: None, ..Default::default() }.success());
    }
}
