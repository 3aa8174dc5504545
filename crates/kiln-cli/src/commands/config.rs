//! `kiln config` - read and write configuration values.
//!
//! Keys are the top-level names from the config file.  Map entries are
//! addressed as `<map>.<name>`, e.g. `content_variables.author`.

use std::{io, path::PathBuf};

use crate::{
    cli::{ConfigCommands, GlobalArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    mut config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = AppConfig::resolve_path(global.config.as_ref());

    match cmd {
        ConfigCommands::Get { key } => {
            output.data(&get_config_value(&config, &key)?)?;
        }

        ConfigCommands::Set { key, value } => {
            set_config_value(&mut config, &key, &value)?;
            config.save(&path)?;
            output.success(&format!("Set {key} = {value:?} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                let value = serde_json::to_value(&config).map_err(io::Error::other)?;
                output.json(&value)?;
            } else {
                output.header(&format!("Configuration ({}):", path.display()))?;
                let serialised =
                    toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                        message: format!("Failed to serialise config: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                output.data(serialised.trim_end())?;
            }
        }

        ConfigCommands::Path => {
            output.data(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn unknown(key: &str) -> CliError {
    CliError::UnknownConfigKey { key: key.into() }
}

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    if let Some((map, name)) = key.split_once('.') {
        let value = match map {
            "content_variables" => config.content_variables.get(name).cloned(),
            "path_variables" => config.path_variables.get(name).cloned(),
            "plugin_templates" => config
                .plugin_templates
                .get(name)
                .map(|p| p.display().to_string()),
            _ => None,
        };
        return value.ok_or_else(|| unknown(key));
    }

    match key {
        "config_version" => Ok(config.config_version.to_string()),
        "default_template" => Ok(config.default_template.clone()),
        "diff_tool" => Ok(config.diff_tool.clone().unwrap_or_default()),
        "auto_diff" => Ok(config.auto_diff.to_string()),
        "user_templates_dir" => Ok(config
            .user_templates_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default()),
        "bundled_templates_dir" => Ok(config.bundled_templates_dir().display().to_string()),
        _ => Err(unknown(key)),
    }
}

fn set_config_value(config: &mut AppConfig, key: &str, value: &str) -> CliResult<()> {
    // Empty values reset optional settings to their defaults.
    let optional = |value: &str| (!value.is_empty()).then(|| value.to_owned());

    if let Some((map, name)) = key.split_once('.') {
        if name.is_empty() {
            return Err(unknown(key));
        }
        match map {
            "content_variables" => {
                config.content_variables.insert(name.into(), value.into());
            }
            "path_variables" => {
                config.path_variables.insert(name.into(), value.into());
            }
            "plugin_templates" if value.is_empty() => {
                config.plugin_templates.remove(name);
            }
            "plugin_templates" => {
                config.plugin_templates.insert(name.into(), PathBuf::from(value));
            }
            _ => return Err(unknown(key)),
        }
        return Ok(());
    }

    match key {
        "default_template" => {
            if value.is_empty() {
                return Err(CliError::InvalidInput {
                    message: "default_template cannot be empty".into(),
                    source: None,
                });
            }
            config.default_template = value.into();
        }
        "diff_tool" => config.diff_tool = optional(value),
        "auto_diff" => {
            config.auto_diff = value.parse().map_err(|e| CliError::InvalidInput {
                message: format!("auto_diff must be true or false, got '{value}'"),
                source: Some(Box::new(e)),
            })?;
        }
        "user_templates_dir" => config.user_templates_dir = optional(value).map(PathBuf::from),
        "bundled_templates_dir" => {
            config.bundled_templates_dir = optional(value).map(PathBuf::from)
        }
        "config_version" => {
            return Err(CliError::InvalidInput {
                message: "config_version is managed by kiln".into(),
                source: None,
            });
        }
        _ => return Err(unknown(key)),
    }
    Ok(())
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_known_key() {
        let cfg = AppConfig::default();
        assert_eq!(get_config_value(&cfg, "default_template").unwrap(), "default");
        assert_eq!(get_config_value(&cfg, "auto_diff").unwrap(), "false");
        assert_eq!(get_config_value(&cfg, "diff_tool").unwrap(), "");
    }

    #[test]
    fn get_unknown_key_is_error() {
        let cfg = AppConfig::default();
        assert!(matches!(
            get_config_value(&cfg, "does_not_exist"),
            Err(CliError::UnknownConfigKey { .. })
        ));
        assert!(get_config_value(&cfg, "content_variables.nobody").is_err());
    }

    #[test]
    fn set_then_get_map_entries() {
        let mut cfg = AppConfig::default();
        set_config_value(&mut cfg, "content_variables.author", "Ada").unwrap();
        set_config_value(&mut cfg, "plugin_templates.rails", "/opt/rails").unwrap();

        assert_eq!(get_config_value(&cfg, "content_variables.author").unwrap(), "Ada");
        assert_eq!(get_config_value(&cfg, "plugin_templates.rails").unwrap(), "/opt/rails");

        set_config_value(&mut cfg, "plugin_templates.rails", "").unwrap();
        assert!(cfg.plugin_templates.is_empty());
    }

    #[test]
    fn set_parses_booleans() {
        let mut cfg = AppConfig::default();
        set_config_value(&mut cfg, "auto_diff", "true").unwrap();
        assert!(cfg.auto_diff);
        assert!(matches!(
            set_config_value(&mut cfg, "auto_diff", "sometimes"),
            Err(CliError::InvalidInput { .. })
        ));
    }

    #[test]
    fn empty_value_clears_optional_settings() {
        let mut cfg = AppConfig::default();
        set_config_value(&mut cfg, "diff_tool", "diff -u %s -").unwrap();
        assert_eq!(cfg.diff_tool.as_deref(), Some("diff -u %s -"));
        set_config_value(&mut cfg, "diff_tool", "").unwrap();
        assert_eq!(cfg.diff_tool, None);
    }

    #[test]
    fn version_is_read_only() {
        let mut cfg = AppConfig::default();
        assert!(set_config_value(&mut cfg, "config_version", "9").is_err());
        assert!(set_config_value(&mut cfg, "unknown", "x").is_err());
        assert!(set_config_value(&mut cfg, "content_variables.", "x").is_err());
    }
}
