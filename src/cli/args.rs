//! Command line argument parsing and validation.

use crate::config::{DEFAULT_CONFIG_FILE, Overrides};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Package a browser extension into a signed .crx and a web store .zip
#[derive(Parser, Debug)]
#[command(
    name = "crx_packager",
    version,
    about = "Package a browser extension into a signed .crx and a web store .zip",
    long_about = "Stage extension resources, generate manifest.json and update.xml,
zip the staged tree and sign it with a Chromium-based browser.

Usage:
  crx_packager pack
  crx_packager --config ext/crx-packager.json pack --no-clean
  crx_packager validate"
)]
pub struct Args {
    /// Configuration file (TOML, or JSON when the name ends in .json)
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Show staged files and other detail
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stage, describe, archive and sign the extension
    Pack {
        /// Configuration overrides
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Check the configuration and print the resolved paths
    Validate {
        /// Configuration overrides
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

/// Options that take precedence over the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Browser executable used to sign the extension
    #[arg(long, env = "CRX_PACKAGER_CHROME", value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Allow deleting a build directory outside of the project directory
    #[arg(long)]
    pub force: bool,

    /// Remove the build directory after packing
    #[arg(long, conflicts_with = "no_clean")]
    pub clean: bool,

    /// Keep the build directory after packing
    #[arg(long)]
    pub no_clean: bool,
}

impl OverrideArgs {
    /// Convert into configuration overrides
    pub fn to_overrides(&self) -> Overrides {
        let clean = match (self.clean, self.no_clean) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Overrides {
            chrome: self.chrome.clone(),
            force: self.force,
            clean,
        }
    }
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Pack { .. } => "pack",
            Command::Validate { .. } => "validate",
        }
    }

    /// Override flags given to this command
    pub fn override_args(&self) -> &OverrideArgs {
        match self {
            Command::Pack { overrides } | Command::Validate { overrides } => overrides,
        }
    }

    /// Overrides given to this command
    pub fn overrides(&self) -> Overrides {
        self.override_args().to_overrides()
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.config.as_os_str().is_empty() {
            return Err("Configuration file path must not be empty".to_string());
        }

        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose, quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print message only in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose, args.quiet)
    }
}
