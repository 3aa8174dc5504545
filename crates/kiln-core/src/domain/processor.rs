//! Extension-keyed content processors.
//!
//! A [`ProcessorRegistry`] maps file extensions (`.erb`, `.rb`, ...) to
//! processors. Rendering a skeleton file walks its trailing extensions from
//! the outside in: every extension with a rendering processor is stripped from
//! the output name and its processor applied to the content, until an
//! extension is unknown, maps to a stop processor, or was already stripped
//! once in this chain.
//!
//! ```text
//! widget.rb.erb  --.erb (render)-->  widget.rb  --.rb (stop)-->  widget.rb
//! logo.png       --.png (stop)---->  logo.png
//! notes.txt      --.txt (unknown)->  notes.txt
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;

use crate::domain::{
    entities::common::RelativePath, erb, error::DomainError, variables::VariableMap,
};

/// Rendering function: `(raw content, content variables) -> rendered content`.
pub type RenderFn =
    dyn Fn(&[u8], &VariableMap) -> Result<Vec<u8>, DomainError> + Send + Sync + 'static;

/// Extensions that are registered as explicit stops by
/// [`ProcessorRegistry::with_builtins`].
pub const BUILTIN_STOP_EXTENSIONS: &[&str] =
    &[".stop", ".rb", ".yaml", ".html", ".js", ".png", ".jpg", ".gif"];

/// What a processor does when the chain reaches its extension.
#[derive(Clone)]
pub enum ProcessorAction {
    /// Strip the extension and transform the content, then keep walking.
    Render(Arc<RenderFn>),
    /// Keep the extension and end the chain.
    Stop,
}

impl fmt::Debug for ProcessorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(_) => f.write_str("Render(..)"),
            Self::Stop => f.write_str("Stop"),
        }
    }
}

/// A named transformation keyed by a file extension.
#[derive(Debug, Clone)]
pub struct Processor {
    extension: String,
    name: String,
    action: ProcessorAction,
}

impl Processor {
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &ProcessorAction {
        &self.action
    }

    pub fn is_stop(&self) -> bool {
        matches!(self.action, ProcessorAction::Stop)
    }
}

/// Result of running a file through the extension chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// Output path with every consumed extension removed.
    pub path: RelativePath,
    /// Content after all applied processors.
    pub content: Vec<u8>,
    /// Names of the rendering processors applied, in order.
    pub applied: Vec<String>,
}

/// Extension → processor table.
///
/// Constructed once per run and passed by reference to the materializer, so
/// tests and embedders can use isolated registries.
#[derive(Debug, Clone, Default)]
pub struct ProcessorRegistry {
    processors: BTreeMap<String, Processor>,
}

impl ProcessorRegistry {
    /// An empty registry: every extension passes through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `.erb` renderer and the built-in stop extensions.
    pub fn with_builtins() -> Self {
        // Built-in keys are already normalised, so they bypass `insert`.
        let mut processors: BTreeMap<String, Processor> = BUILTIN_STOP_EXTENSIONS
            .iter()
            .map(|extension| {
                let processor = Processor {
                    extension: (*extension).to_owned(),
                    name: "stop".into(),
                    action: ProcessorAction::Stop,
                };
                ((*extension).to_owned(), processor)
            })
            .collect();
        processors.insert(
            ".erb".into(),
            Processor {
                extension: ".erb".into(),
                name: "ERB".into(),
                action: ProcessorAction::Render(Arc::new(render_erb)),
            },
        );
        Self { processors }
    }

    /// Register a rendering processor for `extension`.
    ///
    /// # Errors
    ///
    /// [`DomainError::DuplicateProcessor`] if the extension is taken,
    /// [`DomainError::InvalidExtension`] if it is empty or contains a
    /// separator.
    pub fn register<F>(
        &mut self,
        extension: &str,
        name: impl Into<String>,
        render: F,
    ) -> Result<(), DomainError>
    where
        F: Fn(&[u8], &VariableMap) -> Result<Vec<u8>, DomainError> + Send + Sync + 'static,
    {
        self.insert(extension, name.into(), ProcessorAction::Render(Arc::new(render)))
    }

    /// Register an explicit stop marker for `extension`.
    pub fn register_stop(
        &mut self,
        extension: &str,
        name: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.insert(extension, name.into(), ProcessorAction::Stop)
    }

    fn insert(
        &mut self,
        extension: &str,
        name: String,
        action: ProcessorAction,
    ) -> Result<(), DomainError> {
        let extension = normalize_extension(extension)?;
        if self.processors.contains_key(&extension) {
            return Err(DomainError::DuplicateProcessor { extension });
        }
        self.processors.insert(
            extension.clone(),
            Processor {
                extension,
                name,
                action,
            },
        );
        Ok(())
    }

    /// Look up the processor for an extension (`"erb"` or `".erb"`).
    pub fn lookup(&self, extension: &str) -> Option<&Processor> {
        let extension = normalize_extension(extension).ok()?;
        self.processors.get(&extension)
    }

    /// All registered processors, ordered by extension.
    pub fn iter(&self) -> impl Iterator<Item = &Processor> {
        self.processors.values()
    }

    /// Run the extension chain over one file.
    ///
    /// Only the file-name component is inspected; directory names in `path`
    /// are never stripped. A dotfile such as `.gitkeep` has no extension.
    pub fn process(
        &self,
        path: &RelativePath,
        content: Vec<u8>,
        variables: &VariableMap,
    ) -> Result<ProcessedFile, DomainError> {
        let mut current = path.as_path().to_path_buf();
        let mut content = content;
        let mut applied = Vec::new();
        let mut stripped = HashSet::new();

        while let Some(extension) = trailing_extension(&current) {
            let Some(processor) = self.processors.get(&extension) else {
                break;
            };
            let ProcessorAction::Render(render) = &processor.action else {
                break;
            };
            // Single application per distinct extension.
            if !stripped.insert(extension.clone()) {
                break;
            }

            trace!(path = %current.display(), processor = %processor.name, "Applying processor");
            content = render(&content, variables)?;
            applied.push(processor.name.clone());
            current.set_extension("");
        }

        Ok(ProcessedFile {
            path: RelativePath::try_new(current)?,
            content,
            applied,
        })
    }
}

fn render_erb(raw: &[u8], vars: &VariableMap) -> Result<Vec<u8>, DomainError> {
    let failed = |reason: String| DomainError::RenderFailed {
        processor: "ERB".into(),
        reason,
    };
    let source =
        std::str::from_utf8(raw).map_err(|e| failed(format!("content is not valid UTF-8: {e}")))?;
    erb::render(source, vars)
        .map(String::into_bytes)
        .map_err(|e| failed(e.to_string()))
}

/// Turn `erb` / `.erb` into the canonical `.erb` key.
fn normalize_extension(extension: &str) -> Result<String, DomainError> {
    let bare = extension.strip_prefix('.').unwrap_or(extension);
    if bare.is_empty() || bare.contains(['.', '/', '\\']) {
        return Err(DomainError::InvalidExtension {
            extension: extension.to_owned(),
        });
    }
    Ok(format!(".{bare}"))
}

fn trailing_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
}
