//! Collision resolvers used by `kiln new`.
//!
//! The core asks a [`CollisionResolver`] once per file whose rendered content
//! differs from what is already on disk.  `--yes` and `--no-clobber` answer
//! with a [`FixedAnswer`]; otherwise [`InteractiveResolver`] asks:
//!
//! ```text
//! Overwrite ./widget/README.md? [y]es/[n]o/[d]iff
//! ```
//!
//! `d` shows a diff and asks again, anything unrecognised asks again, and end
//! of input aborts the whole run.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

use similar::TextDiff;
use tracing::{debug, info, warn};

use kiln_core::{
    application::{ApplicationError, CollisionResolver},
    error::KilnResult,
};

// ── fixed answers ─────────────────────────────────────────────────────────────

/// Answers every collision the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl CollisionResolver for FixedAnswer {
    fn resolve(&mut self, target: &Path, _new_content: &[u8]) -> KilnResult<bool> {
        let action = if self.0 { "Overwriting" } else { "Keeping" };
        info!(path = %target.display(), "{action} existing file");
        Ok(self.0)
    }
}

// ── interactive ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    Diff,
}

fn parse_answer(raw: &str) -> Option<Answer> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Answer::Yes),
        "n" | "no" => Some(Answer::No),
        "d" | "diff" => Some(Answer::Diff),
        _ => None,
    }
}

/// Asks the operator about each collision on a line-oriented terminal.
pub struct InteractiveResolver<R, W> {
    input: R,
    output: W,
    viewer: DiffViewer,
    auto_diff: bool,
}

impl<R: BufRead, W: Write> InteractiveResolver<R, W> {
    pub fn new(input: R, output: W, viewer: DiffViewer) -> Self {
        Self {
            input,
            output,
            viewer,
            auto_diff: false,
        }
    }

    /// Show the diff before the first question for every collision.
    pub fn auto_diff(mut self, enabled: bool) -> Self {
        self.auto_diff = enabled;
        self
    }

    /// `Ok(None)` means the input ended before a decision.
    fn ask(&mut self, target: &Path, new_content: &[u8]) -> io::Result<Option<bool>> {
        if self.auto_diff {
            self.viewer.show(target, new_content, &mut self.output)?;
        }

        loop {
            write!(
                self.output,
                "Overwrite {}? [y]es/[n]o/[d]iff ",
                target.display()
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(None);
            }

            match parse_answer(&line) {
                Some(Answer::Yes) => return Ok(Some(true)),
                Some(Answer::No) => return Ok(Some(false)),
                Some(Answer::Diff) => self.viewer.show(target, new_content, &mut self.output)?,
                None => writeln!(self.output, "Please answer y, n or d.")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> CollisionResolver for InteractiveResolver<R, W> {
    fn resolve(&mut self, target: &Path, new_content: &[u8]) -> KilnResult<bool> {
        match self.ask(target, new_content) {
            Ok(Some(overwrite)) => {
                debug!(path = %target.display(), overwrite, "Collision answered");
                Ok(overwrite)
            }
            Ok(None) => {
                info!(path = %target.display(), "Input ended at collision prompt");
                Err(ApplicationError::CollisionAborted.into())
            }
            Err(e) => {
                warn!(path = %target.display(), error = %e, "Collision prompt failed");
                Err(ApplicationError::CollisionAborted.into())
            }
        }
    }
}

// ── diff display ──────────────────────────────────────────────────────────────

/// Shows how new content differs from an existing file.
///
/// With a configured tool, `%s` in the command is replaced by the quoted
/// path of the existing file and the new content is piped to its stdin
/// (`diff -u %s -`).  Without one, or if the tool cannot run, a unified diff
/// is written to the prompt output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffViewer {
    tool: Option<String>,
}

impl DiffViewer {
    pub fn new(tool: Option<String>) -> Self {
        Self {
            tool: tool.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn show(&self, existing: &Path, new_content: &[u8], out: &mut impl Write) -> io::Result<()> {
        if let Some(tool) = &self.tool {
            match run_external(tool, existing, new_content) {
                // diff(1) exits 1 when the inputs differ.
                Ok(status) if status.success() || status.code() == Some(1) => return Ok(()),
                Ok(status) => warn!(tool = %tool, %status, "Diff tool failed, using built-in diff"),
                Err(e) => warn!(tool = %tool, error = %e, "Diff tool could not run, using built-in diff"),
            }
        }

        let old = fs::read(existing)?;
        out.write_all(unified_diff(existing, &old, new_content).as_bytes())?;
        out.flush()
    }
}

fn run_external(tool: &str, existing: &Path, new_content: &[u8]) -> io::Result<ExitStatus> {
    let command = tool.replace("%s", &shell_quote(&existing.display().to_string()));
    debug!(%command, "Running diff tool");

    let mut child = shell(&command).stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        // Tools that never read stdin close the pipe early.
        match stdin.write_all(new_content) {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
            _ => {}
        }
    }
    child.wait()
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(unix)]
fn shell_quote(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', r"'\''"))
}

#[cfg(windows)]
fn shell_quote(raw: &str) -> String {
    format!("\"{raw}\"")
}

/// Unified diff of two file versions.  Binary content is not diffed.
pub fn unified_diff(path: &Path, old: &[u8], new: &[u8]) -> String {
    let name = path.display().to_string();
    if old.contains(&0) || new.contains(&0) {
        return format!("Binary files {name} and new content differ\n");
    }

    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(&*old, &*new);
    diff.unified_diff()
        .context_radius(3)
        .header(&format!("{name} (existing)"), &format!("{name} (new)"))
        .to_string()
}
