//! Scaffold Service - main application orchestrator.
//!
//! This service coordinates the entire scaffolding workflow:
//! 1. Resolve the template and everything it includes
//! 2. Build the path and content variable maps
//! 3. Materialize the skeletons, deepest include first
//!
//! Resolution finishes before the filesystem is touched, so a missing
//! template or an include cycle never leaves partial output.

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::{
    application::{
        ports::{CollisionResolver, Filesystem, SkeletonLoader, TemplateLocator},
        services::{
            include_resolver::{IncludeResolver, ResolvedTemplates},
            materializer::{MaterializeReport, Materializer},
        },
    },
    domain::{ProcessorRegistry, ProjectVariables, VariableMap},
    error::KilnResult,
};

/// Everything needed to generate one package.
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
    template: String,
    target_root: PathBuf,
    project: ProjectVariables,
    path_variables: VariableMap,
    content_variables: VariableMap,
}

impl ScaffoldRequest {
    pub fn new(
        template: impl Into<String>,
        target_root: impl Into<PathBuf>,
        project: ProjectVariables,
    ) -> Self {
        Self {
            template: template.into(),
            target_root: target_root.into(),
            project,
            path_variables: VariableMap::new(),
            content_variables: VariableMap::new(),
        }
    }

    /// Extra path variables. Later calls override earlier ones, and all of
    /// them override the auto-injected set.
    pub fn path_variables(mut self, variables: &VariableMap) -> Self {
        self.path_variables.merge(variables);
        self
    }

    /// Extra content variables, merged like [`path_variables`](Self::path_variables).
    pub fn content_variables(mut self, variables: &VariableMap) -> Self {
        self.content_variables.merge(variables);
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn project(&self) -> &ProjectVariables {
        &self.project
    }

    /// Auto-injected path variables with the extras applied on top.
    pub fn resolved_path_variables(&self) -> VariableMap {
        let mut variables = self.project.path_variables();
        variables.merge(&self.path_variables);
        variables
    }

    /// Auto-injected content variables with the extras applied on top.
    pub fn resolved_content_variables(&self) -> VariableMap {
        let mut variables = self.project.content_variables();
        variables.merge(&self.content_variables);
        variables
    }
}

/// Main scaffolding service.
///
/// Orchestrates the resolution and materialization workflow.
pub struct ScaffoldService {
    locator: Box<dyn TemplateLocator>,
    loader: Box<dyn SkeletonLoader>,
    filesystem: Box<dyn Filesystem>,
    processors: ProcessorRegistry,
}

impl ScaffoldService {
    /// Create a new scaffold service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use kiln_core::application::ScaffoldService;
    /// use kiln_core::domain::ProcessorRegistry;
    ///
    /// let service = ScaffoldService::new(
    ///     Box::new(locator),    // impl TemplateLocator
    ///     Box::new(loader),     // impl SkeletonLoader
    ///     Box::new(filesystem), // impl Filesystem
    ///     ProcessorRegistry::with_builtins(),
    /// );
    /// ```
    pub fn new(
        locator: Box<dyn TemplateLocator>,
        loader: Box<dyn SkeletonLoader>,
        filesystem: Box<dyn Filesystem>,
        processors: ProcessorRegistry,
    ) -> Self {
        Self {
            locator,
            loader,
            filesystem,
            processors,
        }
    }

    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    /// Resolve a template graph without writing anything.
    #[instrument(skip(self))]
    pub fn plan(&self, template: &str) -> KilnResult<ResolvedTemplates> {
        IncludeResolver::new(self.locator.as_ref(), self.loader.as_ref()).resolve(template)
    }

    /// Generate a package.
    ///
    /// This is the main use case.
    #[instrument(
        skip_all,
        fields(
            template = %request.template,
            package = %request.project.package_name(),
            target = %request.target_root.display()
        )
    )]
    pub fn scaffold(
        &self,
        request: &ScaffoldRequest,
        on_collision: &mut dyn CollisionResolver,
    ) -> KilnResult<MaterializeReport> {
        // 1. Resolve everything up front
        let resolved = self.plan(&request.template)?;
        let order = resolved.materialization_order();
        info!(templates = ?resolved.names(), "Templates resolved");

        // 2. Write
        let report = Materializer::new(self.filesystem.as_ref(), &self.processors).materialize(
            &request.target_root,
            &order,
            &request.resolved_path_variables(),
            &request.resolved_content_variables(),
            on_collision,
        )?;

        info!(written = report.written(), "Scaffold completed successfully");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::output::{
        MockFilesystem, MockSkeletonLoader, MockTemplateLocator,
    };
    use crate::domain::{DomainError, Skeleton, SkeletonEntry, SkeletonMeta};
    use crate::error::KilnError;

    fn untouched_filesystem() -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();
        fs.expect_set_executable().never();
        fs
    }

    fn cyclic_loader() -> MockSkeletonLoader {
        let mut loader = MockSkeletonLoader::new();
        loader.expect_load().returning(|name, path| {
            let next = if name == "a" { "b" } else { "a" };
            let meta = SkeletonMeta {
                includes: vec![next.to_string()],
                description: None,
            };
            Ok(Skeleton::new(name, path, meta, Vec::<SkeletonEntry>::new()))
        });
        loader
    }

    fn any_locator() -> MockTemplateLocator {
        let mut locator = MockTemplateLocator::new();
        locator
            .expect_locate()
            .returning(|name| Some(PathBuf::from("/t").join(name)));
        locator
    }

    fn never(_: &Path, _: &[u8]) -> KilnResult<bool> {
        panic!("collision resolver should not be called")
    }

    #[test]
    fn circular_include_writes_nothing() {
        let service = ScaffoldService::new(
            Box::new(any_locator()),
            Box::new(cyclic_loader()),
            Box::new(untouched_filesystem()),
            ProcessorRegistry::with_builtins(),
        );
        let request = ScaffoldRequest::new("a", "/out/widget", ProjectVariables::new("widget"));

        let err = service.scaffold(&request, &mut never).unwrap_err();
        assert_eq!(
            err,
            KilnError::Domain(DomainError::CircularInclude {
                chain: vec!["a".into(), "b".into(), "a".into()]
            })
        );
    }

    #[test]
    fn unknown_template_writes_nothing() {
        let mut locator = MockTemplateLocator::new();
        locator.expect_locate().returning(|_| None);
        let mut loader = MockSkeletonLoader::new();
        loader.expect_load().never();

        let service = ScaffoldService::new(
            Box::new(locator),
            Box::new(loader),
            Box::new(untouched_filesystem()),
            ProcessorRegistry::new(),
        );
        let request = ScaffoldRequest::new("nope", "/out/widget", ProjectVariables::new("widget"));

        let err = service.scaffold(&request, &mut never).unwrap_err();
        assert_eq!(
            err,
            KilnError::Application(ApplicationError::TemplateNotFound {
                name: "nope".into()
            })
        );
    }

    #[test]
    fn request_extras_override_injected_variables() {
        let request = ScaffoldRequest::new("default", "/out", ProjectVariables::new("widget"))
            .content_variables(&VariableMap::new().with("author", "Ada").with("version", "1.0.0"))
            .path_variables(&VariableMap::new().with("GEM_NAME", "x_REQUIRE_NAME"));

        let content = request.resolved_content_variables();
        assert_eq!(content.get("author"), Some("Ada"));
        assert_eq!(content.get("version"), Some("1.0.0"));
        assert_eq!(content.get("namespace"), Some("Widget"));

        let paths = request.resolved_path_variables();
        assert_eq!(paths.get("GEM_NAME"), Some("x_REQUIRE_NAME"));
        assert_eq!(paths.get("PACKAGE_NAME"), Some("widget"));
    }
}
