//! Command execution functions.
//!
//! Each command loads the configuration, runs its part of the pipeline and
//! reports through [`RuntimeConfig`]. Failures are turned into exit code 1
//! after printing recovery suggestions.

mod pack;
mod validate;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use pack::execute_pack;
use validate::execute_validate;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {validation_error}"));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Pack { .. } => execute_pack(&args, &config).await,
        Command::Validate { .. } => execute_validate(&args, &config).await,
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {suggestion}"));
                }
            }

            Ok(1)
        }
    }
}
