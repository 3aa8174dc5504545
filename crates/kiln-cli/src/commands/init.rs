//! `kiln init` - create a default configuration file.

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Create a default Kiln configuration file.
pub fn execute(
    args: InitArgs,
    global: &GlobalArgs,
    config: &AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let config_path = AppConfig::resolve_path(global.config.as_ref());

    // Bail early if the file already exists and --force was not given.
    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    AppConfig::default().save(&config_path)?;

    output.success(&format!(
        "Configuration created at {}",
        config_path.display(),
    ))?;
    if let Some(dir) = config.user_templates_dir() {
        output.info(&format!("Put your own templates in {}", dir.display()))?;
    }

    Ok(())
}
