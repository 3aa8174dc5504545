//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (`--template`, `--var`, `--path-var`; handled at the call-site)
//! 2. Environment variables (`KILN_TEMPLATE`, `KILN_CONFIG` via clap, and
//!    `KILN_TEMPLATES_DIR` for the bundled templates)
//! 3. Config file (`config.toml` in the platform config directory)
//! 4. Built-in defaults (always present)
//!
//! # File format
//!
//! ```toml
//! config_version = 2
//! default_template = "default"
//! diff_tool = "diff -u %s -"
//! auto_diff = false
//!
//! [content_variables]
//! author = "Ada Lovelace"
//!
//! [path_variables]
//!
//! [plugin_templates]
//! rails = "/opt/kiln-rails/templates"
//! ```
//!
//! Files written by older releases are migrated in place on load.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kiln_core::domain::VariableMap;

use crate::error::{CliError, CliResult, IntoCli};

/// Schema version written by this release.
pub const CONFIG_VERSION: u32 = 2;

/// Template used when neither `--template` nor the config names one.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Environment override for the bundled templates directory.
pub const TEMPLATES_DIR_ENV: &str = "KILN_TEMPLATES_DIR";

/// Templates in the source tree, used when running from a checkout.
const SOURCE_TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Schema version.  Older or missing versions trigger a migration.
    pub config_version: u32,
    /// Template used by `kiln new` without `--template`.
    pub default_template: String,
    /// External diff command for collision prompts.  `%s` is replaced by
    /// the existing file's path; the new content arrives on stdin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_tool: Option<String>,
    /// Show the diff before asking about a collision.
    pub auto_diff: bool,
    /// Overrides the platform data directory for user templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_templates_dir: Option<PathBuf>,
    /// Overrides the templates shipped with Kiln.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundled_templates_dir: Option<PathBuf>,
    /// Merged over the auto-injected content variables.
    pub content_variables: BTreeMap<String, String>,
    /// Merged over the auto-injected path variables.
    pub path_variables: BTreeMap<String, String>,
    /// Plugin name to template directory, searched after user templates.
    pub plugin_templates: BTreeMap<String, PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION,
            default_template: DEFAULT_TEMPLATE.into(),
            diff_tool: None,
            auto_diff: false,
            user_templates_dir: None,
            bundled_templates_dir: None,
            content_variables: BTreeMap::new(),
            path_variables: BTreeMap::new(),
            plugin_templates: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config_file`, or from the default location.
    ///
    /// A missing file yields the built-in defaults and is not created.  A
    /// file with a stale `config_version` is migrated and written back.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let path = Self::resolve_path(config_file);
        if !path.is_file() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;
        let mut table: toml::Table = toml::from_str(&raw)
            .with_context(|| format!("Malformed configuration in {}", path.display()))?;

        let migrated = migrate(&mut table);
        let config: Self = toml::Value::Table(table)
            .try_into()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        if migrated {
            config.save(&path)?;
            info!(
                path = %path.display(),
                version = CONFIG_VERSION,
                "Migrated configuration file"
            );
        }

        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let toml = toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_cli_context(|| {
                format!("Failed to create config directory '{}'", parent.display())
            })?;
        }

        fs::write(path, toml)
            .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))
    }

    /// The explicit `--config` path if given, else [`Self::config_path`].
    pub fn resolve_path(config_file: Option<&PathBuf>) -> PathBuf {
        config_file.cloned().unwrap_or_else(Self::config_path)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kiln.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kiln.toml"))
    }

    /// Directory holding the user's own templates.
    pub fn user_templates_dir(&self) -> Option<PathBuf> {
        self.user_templates_dir.clone().or_else(|| {
            directories::ProjectDirs::from("rs", "kiln", "kiln")
                .map(|d| d.data_dir().join("templates"))
        })
    }

    /// Directory holding the templates shipped with Kiln.
    ///
    /// Probed in order:
    ///
    /// 1. `$KILN_TEMPLATES_DIR`
    /// 2. `bundled_templates_dir` from the config file
    /// 3. `<exe-dir>/templates`, then `<exe-dir>/../share/kiln/templates`
    /// 4. the `templates/` directory of the source tree the binary was built from
    pub fn bundled_templates_dir(&self) -> PathBuf {
        resolve_bundled_dir(
            std::env::var_os(TEMPLATES_DIR_ENV),
            self.bundled_templates_dir.as_deref(),
            std::env::current_exe().ok(),
        )
    }

    pub fn content_variables(&self) -> VariableMap {
        self.content_variables.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    pub fn path_variables(&self) -> VariableMap {
        self.path_variables.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

fn resolve_bundled_dir(
    env_dir: Option<OsString>,
    configured: Option<&Path>,
    exe: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env_dir.filter(|d| !d.is_empty()) {
        debug!(path = ?dir, "Bundled templates from KILN_TEMPLATES_DIR");
        return PathBuf::from(dir);
    }
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }

    let installed = exe
        .as_deref()
        .and_then(Path::parent)
        .into_iter()
        .flat_map(|bin| [bin.join("templates"), bin.join("../share/kiln/templates")])
        .find(|candidate| candidate.is_dir());
    match installed {
        Some(dir) => {
            debug!(path = %dir.display(), "Bundled templates next to the executable");
            dir
        }
        None => PathBuf::from(SOURCE_TEMPLATES_DIR),
    }
}

/// Bring a raw config table up to [`CONFIG_VERSION`].  Returns `true` if
/// anything changed.
///
/// Version 1 files (or files without a version) kept `author` at the top
/// level; it now lives in `content_variables`.
fn migrate(table: &mut toml::Table) -> bool {
    let version = table
        .get("config_version")
        .and_then(toml::Value::as_integer)
        .unwrap_or(1);
    if version >= i64::from(CONFIG_VERSION) {
        return false;
    }

    if let Some(author) = table.remove("author") {
        let content = table
            .entry("content_variables")
            .or_insert(toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(content) = content {
            content.entry("author").or_insert(author);
        }
    }

    table.insert(
        "config_version".into(),
        toml::Value::Integer(i64::from(CONFIG_VERSION)),
    );
    debug!(from = version, to = CONFIG_VERSION, "Configuration schema upgraded");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_template_is_default() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.default_template, "default");
        assert_eq!(cfg.config_version, CONFIG_VERSION);
    }

    #[test]
    fn missing_file_returns_defaults_without_creating_it() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(!path.exists());
    }

    #[test]
    fn reads_current_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "config_version = 2\n\
             default_template = \"minimal\"\n\
             diff_tool = \"diff -u %s -\"\n\
             auto_diff = true\n\
             [content_variables]\n\
             author = \"Ada\"\n\
             [plugin_templates]\n\
             rails = \"/opt/rails\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.default_template, "minimal");
        assert_eq!(cfg.diff_tool.as_deref(), Some("diff -u %s -"));
        assert!(cfg.auto_diff);
        assert_eq!(cfg.content_variables().get("author"), Some("Ada"));
        assert_eq!(cfg.plugin_templates["rails"], PathBuf::from("/opt/rails"));
    }

    #[test]
    fn legacy_author_is_migrated_and_written_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "author = \"Ada\"\ndiff_tool = \"vimdiff %s -\"\n").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.content_variables().get("author"), Some("Ada"));
        assert_eq!(cfg.config_version, CONFIG_VERSION);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("config_version = 2"));
        assert!(!rewritten.lines().any(|l| l.starts_with("author")));

        // Loading again is stable.
        assert_eq!(AppConfig::load(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn migration_keeps_explicit_content_author() {
        let mut table: toml::Table =
            toml::from_str("author = \"old\"\n[content_variables]\nauthor = \"new\"\n").unwrap();
        assert!(migrate(&mut table));
        let cfg: AppConfig = toml::Value::Table(table).try_into().unwrap();
        assert_eq!(cfg.content_variables["author"], "new");
    }

    #[test]
    fn current_version_is_not_migrated() {
        let mut table: toml::Table = toml::from_str("config_version = 2").unwrap();
        assert!(!migrate(&mut table));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "default_template = [").unwrap();
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");
        let mut cfg = AppConfig::default();
        cfg.path_variables.insert("LICENSE_NAME".into(), "COPYING".into());
        cfg.user_templates_dir = Some(temp.path().join("mine"));

        cfg.save(&path).unwrap();
        assert_eq!(AppConfig::load(Some(&path)).unwrap(), cfg);
    }

    #[test]
    fn bundled_dir_defaults_to_shipped_templates() {
        let dir = resolve_bundled_dir(None, None, None);
        assert!(dir.join("default").is_dir());
        assert!(dir.join("license-mit").is_dir());
    }

    #[test]
    fn bundled_dir_env_override_wins() {
        let dir = resolve_bundled_dir(
            Some(OsString::from("/opt/kiln/templates")),
            Some(Path::new("/etc/kiln/templates")),
            None,
        );
        assert_eq!(dir, PathBuf::from("/opt/kiln/templates"));

        // An empty variable counts as unset.
        let dir = resolve_bundled_dir(
            Some(OsString::new()),
            Some(Path::new("/etc/kiln/templates")),
            None,
        );
        assert_eq!(dir, PathBuf::from("/etc/kiln/templates"));
    }

    #[test]
    fn bundled_dir_found_next_to_executable() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir_all(bin.join("templates")).unwrap();

        let dir = resolve_bundled_dir(None, None, Some(bin.join("kiln")));
        assert_eq!(dir, bin.join("templates"));
    }

    #[test]
    fn bundled_dir_found_in_share_prefix() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::create_dir_all(temp.path().join("share/kiln/templates")).unwrap();

        let dir = resolve_bundled_dir(None, None, Some(bin.join("kiln")));
        assert_eq!(dir, bin.join("../share/kiln/templates"));
    }

    #[test]
    fn bundled_dir_falls_back_to_source_tree() {
        let temp = TempDir::new().unwrap();
        let dir = resolve_bundled_dir(None, None, Some(temp.path().join("kiln")));
        assert_eq!(dir, PathBuf::from(SOURCE_TEMPLATES_DIR));
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
