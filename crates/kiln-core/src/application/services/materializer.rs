//! Materializer - writes resolved skeletons into a target directory.
//!
//! For each skeleton, in the order given:
//! 1. Create every directory entry (path variables substituted)
//! 2. Run every file through the processor chain
//! 3. Write new files, skip identical ones, and ask the collision resolver
//!    about files that differ
//!
//! There is no rollback. A failure leaves earlier writes on disk and the
//! error names the template that was being written.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{CollisionResolver, Filesystem},
    },
    domain::{
        DomainError, ProcessedFile, ProcessorRegistry, RelativePath, Skeleton, VariableMap,
        VariableSubstitutor,
    },
    error::{KilnError, KilnResult},
};

/// What happened to one target entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    DirectoryCreated,
    /// New file written.
    Created,
    /// Target already matched the rendered content (or the directory
    /// already existed).
    Unchanged,
    /// Collision resolved in favour of the new content.
    Overwritten,
    /// Collision resolved in favour of the existing file.
    Skipped,
}

impl std::fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DirectoryCreated => "mkdir",
            Self::Created => "create",
            Self::Unchanged => "identical",
            Self::Overwritten => "force",
            Self::Skipped => "skip",
        };
        f.write_str(label)
    }
}

/// One line of a [`MaterializeReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Template the entry came from.
    pub template: String,
    /// Final path relative to the target root.
    pub path: RelativePath,
    pub outcome: EntryOutcome,
    /// Names of the processors applied, in order.
    pub processors: Vec<String>,
}

/// Everything a materialization run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    target_root: PathBuf,
    entries: Vec<ReportEntry>,
}

impl MaterializeReport {
    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn count(&self, outcome: EntryOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    /// Files whose content was written in this run.
    pub fn written(&self) -> usize {
        self.count(EntryOutcome::Created) + self.count(EntryOutcome::Overwritten)
    }

    /// True if the run changed nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.entries.iter().all(|e| {
            matches!(e.outcome, EntryOutcome::Unchanged | EntryOutcome::Skipped)
        })
    }

    fn record(
        &mut self,
        template: &str,
        path: RelativePath,
        outcome: EntryOutcome,
        processors: Vec<String>,
    ) {
        debug!(template, path = %path, %outcome, "Materialized entry");
        self.entries.push(ReportEntry {
            template: template.to_owned(),
            path,
            outcome,
            processors,
        });
    }
}

/// Writes skeletons through the `Filesystem` port.
pub struct Materializer<'a> {
    filesystem: &'a dyn Filesystem,
    processors: &'a ProcessorRegistry,
}

impl<'a> Materializer<'a> {
    pub fn new(filesystem: &'a dyn Filesystem, processors: &'a ProcessorRegistry) -> Self {
        Self {
            filesystem,
            processors,
        }
    }

    /// Materialize `skeletons` into `target_root`, in order.
    ///
    /// `on_collision` is consulted at most once per file whose target exists
    /// with different content.
    #[instrument(
        skip_all,
        fields(
            target_root = %target_root.display(),
            templates = skeletons.len()
        )
    )]
    pub fn materialize(
        &self,
        target_root: &Path,
        skeletons: &[&Skeleton],
        path_vars: &VariableMap,
        content_vars: &VariableMap,
        on_collision: &mut dyn CollisionResolver,
    ) -> KilnResult<MaterializeReport> {
        let substitutor = VariableSubstitutor::new(path_vars)?;
        self.filesystem.create_dir_all(target_root)?;

        let mut report = MaterializeReport {
            target_root: target_root.to_path_buf(),
            entries: Vec::new(),
        };

        for skeleton in skeletons {
            info!(template = skeleton.name(), "Materializing template");
            self.materialize_one(
                target_root,
                skeleton,
                &substitutor,
                content_vars,
                on_collision,
                &mut report,
            )
            .map_err(|e| e.in_template(skeleton.name()))?;
        }

        info!(
            written = report.written(),
            skipped = report.count(EntryOutcome::Skipped),
            "Materialization complete"
        );
        Ok(report)
    }

    fn materialize_one(
        &self,
        target_root: &Path,
        skeleton: &Skeleton,
        substitutor: &VariableSubstitutor,
        content_vars: &VariableMap,
        on_collision: &mut dyn CollisionResolver,
        report: &mut MaterializeReport,
    ) -> KilnResult<()> {
        for directory in skeleton.directories() {
            let relative = target_path(substitutor, directory)?;
            let target = target_root.join(&relative);

            // A regular file in the way is left for `create_dir_all` to reject.
            let outcome = if self.filesystem.exists(&target) && !self.filesystem.is_file(&target) {
                EntryOutcome::Unchanged
            } else {
                self.filesystem.create_dir_all(&target)?;
                EntryOutcome::DirectoryCreated
            };
            report.record(skeleton.name(), relative, outcome, Vec::new());
        }

        for file in skeleton.files() {
            let source = skeleton.source_path(file);
            let relative = target_path(substitutor, file)?;
            let raw = self.filesystem.read_file(&source)?;

            let ProcessedFile {
                path,
                content,
                applied,
            } = self
                .processors
                .process(&relative, raw, content_vars)
                .map_err(|e| rendering_error(&source, e))?;

            let target = target_root.join(&path);
            let outcome = self.write(&target, &content, on_collision)?;

            if matches!(outcome, EntryOutcome::Created | EntryOutcome::Overwritten)
                && self.filesystem.is_executable(&source)
            {
                self.filesystem.set_executable(&target, true)?;
            }
            report.record(skeleton.name(), path, outcome, applied);
        }

        Ok(())
    }

    /// Whole-file write honouring the collision rules.
    fn write(
        &self,
        target: &Path,
        content: &[u8],
        on_collision: &mut dyn CollisionResolver,
    ) -> KilnResult<EntryOutcome> {
        if !self.filesystem.is_file(target) {
            if let Some(parent) = target.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(target, content)?;
            return Ok(EntryOutcome::Created);
        }

        if self.filesystem.read_file(target)? == content {
            return Ok(EntryOutcome::Unchanged);
        }

        debug!(target = %target.display(), "Collision");
        if on_collision.resolve(target, content)? {
            self.filesystem.write_file(target, content)?;
            Ok(EntryOutcome::Overwritten)
        } else {
            Ok(EntryOutcome::Skipped)
        }
    }
}

/// Substitute path variables into a skeleton entry.
///
/// The result must still be relative and stay below the target root.
fn target_path(
    substitutor: &VariableSubstitutor,
    entry: &RelativePath,
) -> Result<RelativePath, DomainError> {
    RelativePath::try_new(substitutor.replace(entry.to_str()?))
}

fn rendering_error(source: &Path, err: DomainError) -> KilnError {
    match err {
        DomainError::RenderFailed { processor, reason } => ApplicationError::RenderingFailed {
            path: source.to_path_buf(),
            reason: format!("{}: {}", processor, reason),
        }
        .into(),
        other => other.into(),
    }
}
