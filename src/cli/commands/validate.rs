//! Validate command implementation.
//!
//! Loads the configuration and prints what a pack run would do, without
//! writing anything to disk.

use crate::cli::{Args, RuntimeConfig};
use crate::config;
use crate::error::Result;
use crate::packager::metadata::normalize_codebase;
use crate::packager::{KeyState, PackInvocation};

/// Execute validate command
pub(super) async fn execute_validate(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let settings = config::load_settings(&args.config, &args.command.overrides())?;
    let paths = settings.paths();

    config.section(&format!("chrome-extension: {}", settings.name()));
    config.indent(&format!("chrome: {}", settings.chrome().display()));
    config.indent(&format!("resources: {}", settings.cwd().display()));
    config.indent(&format!("path: {}", paths.build_dir.display()));
    config.indent(&format!("cert: {}", paths.cert.display()));
    config.indent(&format!("crx: {}", paths.crx.display()));
    config.indent(&format!("cws zip: {}", paths.zip.display()));
    config.indent(&format!("patterns: {}", settings.resources().join(", ")));

    if settings.manifest().is_none() {
        config.warning_println("No manifest configured; manifest.json will not be generated");
    }

    if let Some(update) = settings.update() {
        let codebase = normalize_codebase(&update.url, settings.crx_file_name())?;
        config.indent(&format!("update codebase: {codebase}"));
    }

    let key_state = KeyState::detect(&paths.cert);
    if key_state == KeyState::Absent {
        config.warning_println("No signing key yet; the first pack run generates one");
    }
    config.verbose_println(&format!(
        "Command: {}",
        PackInvocation::new(&settings, key_state).command_line()
    ));

    config.success_println("Configuration is valid");
    Ok(())
}
