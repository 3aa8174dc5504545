//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde_json::json;

use kiln_core::application::{EntryOutcome, MaterializeReport};

use crate::cli::global::{GlobalArgs, OutputFormat};

/// Manages CLI output based on the global flags.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags.
    pub fn new(args: &GlobalArgs) -> Self {
        // Resolve Auto → Human (TTY) or Plain (piped/redirected).
        let resolved_format = if args.output_format == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            args.output_format
        };

        Self {
            resolved_format,
            // JSON on stdout must stay parseable.
            quiet: args.quiet || resolved_format == OutputFormat::Json,
            no_color: args.no_color || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Data the caller asked for (names, values, JSON).  Never suppressed:
    /// `--quiet` silences chatter only.
    pub fn data(&self, line: &str) -> io::Result<()> {
        self.term.write_line(line)
    }

    pub fn json(&self, value: &serde_json::Value) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.data(&text)
    }

    /// One line per entry: `  create  lib/widget.rb`.
    pub fn report(&self, report: &MaterializeReport) -> io::Result<()> {
        if self.resolved_format == OutputFormat::Json {
            return self.json(&report_json(report));
        }
        for entry in report.entries() {
            let label = format!("{:>9}", entry.outcome.to_string());
            let label = if self.no_color {
                label
            } else {
                match entry.outcome {
                    EntryOutcome::Created | EntryOutcome::DirectoryCreated => {
                        label.green().bold().to_string()
                    }
                    EntryOutcome::Overwritten => label.yellow().bold().to_string(),
                    EntryOutcome::Skipped => label.red().to_string(),
                    EntryOutcome::Unchanged => label.dimmed().to_string(),
                }
            };
            self.print(&format!("{label}  {}", entry.path))?;
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if quiet mode suppresses most output.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

/// JSON document describing a materialization run.
pub fn report_json(report: &MaterializeReport) -> serde_json::Value {
    let entries: Vec<_> = report
        .entries()
        .iter()
        .map(|entry| {
            json!({
                "template": entry.template,
                "path": entry.path.to_string(),
                "outcome": entry.outcome.to_string(),
                "processors": entry.processors,
            })
        })
        .collect();

    json!({
        "target": report.target_root().display().to_string(),
        "written": report.written(),
        "entries": entries,
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────
