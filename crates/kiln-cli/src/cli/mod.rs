//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate new packages from directory skeletons",
    long_about = "Kiln creates the directories and files of a new package by \
                  copying a template skeleton, renaming paths and rendering \
                  .erb files along the way.",
    after_help = "EXAMPLES:\n\
        \x20 kiln new widget\n\
        \x20 kiln new widget --template minimal --summary 'Small widgets'\n\
        \x20 kiln list\n\
        \x20 kiln completions bash > /usr/share/bash-completion/completions/kiln",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new package from a template.
    #[command(
        visible_alias = "n",
        about = "Create a new package",
        after_help = "EXAMPLES:\n\
            \x20 kiln new widget\n\
            \x20 kiln new widget --output ~/src --yes\n\
            \x20 kiln new widget --var author='Ada Lovelace' --path-var LICENSE_NAME=COPYING\n\
            \x20 kiln new widget --dry-run"
    )]
    New(NewArgs),

    /// List available templates.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 kiln list\n\
            \x20 kiln list --format json"
    )]
    List(ListArgs),

    /// Initialise a Kiln configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init\n\
            \x20 kiln init --force\n\
            \x20 kiln --config ./kiln.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Kiln configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get default_template\n\
            \x20 kiln config set content_variables.author 'Ada Lovelace'\n\
            \x20 kiln config list"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `kiln new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Package name.  Becomes `PACKAGE_NAME` in paths and `package_name`
    /// in templates.
    #[arg(value_name = "NAME", help = "Package name")]
    pub name: String,

    /// Template to generate from.  Falls back to `default_template` from
    /// the configuration.
    #[arg(
        short = 't',
        long = "template",
        value_name = "TEMPLATE",
        env = "KILN_TEMPLATE",
        help = "Template to use instead of the default one"
    )]
    pub template: Option<String>,

    /// Directory the package directory is created in.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Parent directory (default: current directory)"
    )]
    pub output: Option<PathBuf>,

    /// Package description.  Prompted for when omitted on a terminal.
    #[arg(long = "description", value_name = "TEXT", help = "Package description")]
    pub description: Option<String>,

    /// One-line package summary.  Prompted for when omitted on a terminal.
    #[arg(long = "summary", value_name = "TEXT", help = "One-line package summary")]
    pub summary: Option<String>,

    /// Extra content variable, overriding configured values.
    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        value_parser = parse_key_val,
        help = "Set a content variable (repeatable)"
    )]
    pub vars: Vec<(String, String)>,

    /// Extra path variable, overriding configured values.
    #[arg(
        long = "path-var",
        value_name = "KEY=VALUE",
        value_parser = parse_key_val,
        help = "Set a path variable (repeatable)"
    )]
    pub path_vars: Vec<(String, String)>,

    /// Overwrite every colliding file without asking.
    #[arg(
        short = 'y',
        long = "yes",
        conflicts_with = "no_clobber",
        help = "Overwrite existing files without asking"
    )]
    pub yes: bool,

    /// Keep every colliding file without asking.
    #[arg(long = "no-clobber", help = "Keep existing files without asking")]
    pub no_clobber: bool,

    /// Resolve templates and show what would be generated, writing nothing.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,
}

/// Parse `KEY=VALUE`.  The value may itself contain `=`.
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `kiln init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `kiln completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `kiln config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Key, e.g. `diff_tool` or `content_variables.author`.
        key: String,
    },
    /// Set a configuration key and save the file.
    Set {
        /// Key, e.g. `auto_diff` or `plugin_templates.rails`.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
