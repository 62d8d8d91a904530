//! Pack command implementation.

use crate::cli::{Args, RuntimeConfig};
use crate::config;
use crate::error::Result;
use crate::packager::Packager;

/// Execute pack command
pub(super) async fn execute_pack(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let settings = config::load_settings(&args.config, &args.command.overrides())?;
    config.section(&format!("Packaging {}", settings.name()));

    let report = Packager::new(settings).package().await?;

    config.verbose_println(&format!("Staged {} file(s):", report.staged_files.len()));
    for file in &report.staged_files {
        config.verbose_println(&format!("  {}", file.display()));
    }
    for file in &report.metadata_files {
        config.verbose_println(&format!("Generated {}", file.display()));
    }

    config.success_println(&format!(
        "Web store archive: {} ({} entries)",
        report.zip.display(),
        report.zip_entries
    ));
    config.success_println(&format!("Signed package: {}", report.crx.display()));
    config.indent(&format!("size: {} bytes", report.size));
    config.indent(&format!("sha256: {}", report.checksum));

    if report.key_generated {
        config.warning_println(&format!(
            "Generated a new signing key at {}. Keep it: it defines the extension id",
            report.cert.display()
        ));
    } else {
        config.indent(&format!("key: {}", report.cert.display()));
    }

    if report.cleaned {
        config.verbose_println("Removed build directory");
    }

    Ok(())
}
