//! Include resolution.
//!
//! Expands a root template name into every skeleton it transitively
//! includes. Resolution is breadth-first over include chains; a chain that
//! revisits one of its own ancestors fails with `CircularInclude` before
//! anything is written. Each template is located and loaded once per
//! resolution, however many chains reach it.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{SkeletonLoader, TemplateLocator},
    },
    domain::{IncludeChain, Skeleton, validate_template_name},
    error::KilnResult,
};

/// Skeletons reachable from one root template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplates {
    skeletons: Vec<Skeleton>,
}

impl ResolvedTemplates {
    /// Breadth-first discovery order. The root comes first. A template
    /// reached through more than one chain appears once per chain.
    pub fn discovery_order(&self) -> &[Skeleton] {
        &self.skeletons
    }

    /// Order in which skeletons are written: deepest include first, root
    /// last.
    ///
    /// This is the reverse of discovery order with each name kept at its
    /// last discovery only. Every discovery of a template enqueues its
    /// includes after it, so an included template is always written before
    /// the templates that include it.
    pub fn materialization_order(&self) -> Vec<&Skeleton> {
        let mut seen = HashSet::new();
        self.skeletons
            .iter()
            .rev()
            .filter(|skeleton| seen.insert(skeleton.name()))
            .collect()
    }

    /// The requested template.
    pub fn root(&self) -> Option<&Skeleton> {
        self.skeletons.first()
    }

    /// Distinct template names in materialization order.
    pub fn names(&self) -> Vec<&str> {
        self.materialization_order()
            .into_iter()
            .map(Skeleton::name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skeletons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skeletons.is_empty()
    }
}

/// Resolves include graphs through the locator and loader ports.
pub struct IncludeResolver<'a> {
    locator: &'a dyn TemplateLocator,
    loader: &'a dyn SkeletonLoader,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(locator: &'a dyn TemplateLocator, loader: &'a dyn SkeletonLoader) -> Self {
        Self { locator, loader }
    }

    /// Resolve `root` and everything it includes.
    ///
    /// # Errors
    ///
    /// - `InvalidTemplateName` if a name cannot name a directory
    /// - `TemplateNotFound` if any name in the graph has no source
    /// - `SkeletonLoad` if a template directory cannot be read
    /// - `CircularInclude` with the offending chain on a cycle
    #[instrument(skip(self))]
    pub fn resolve(&self, root: &str) -> KilnResult<ResolvedTemplates> {
        let mut queue = VecDeque::from([IncludeChain::root(root)]);
        let mut loaded: HashMap<String, Skeleton> = HashMap::new();
        let mut skeletons = Vec::new();

        while let Some(chain) = queue.pop_front() {
            let name = chain.current();
            let skeleton = match loaded.get(name) {
                Some(skeleton) => skeleton.clone(),
                None => {
                    let skeleton = self.load(name)?;
                    loaded.insert(name.to_owned(), skeleton.clone());
                    skeleton
                }
            };
            debug!(
                chain = %chain,
                path = %skeleton.base_path().display(),
                includes = skeleton.includes().len(),
                "Resolved template"
            );

            for include in skeleton.includes() {
                queue.push_back(chain.extend(include)?);
            }
            skeletons.push(skeleton);
        }

        Ok(ResolvedTemplates { skeletons })
    }

    fn load(&self, name: &str) -> KilnResult<Skeleton> {
        validate_template_name(name)?;
        let path = self
            .locator
            .locate(name)
            .ok_or_else(|| ApplicationError::TemplateNotFound {
                name: name.to_owned(),
            })?;
        self.loader.load(name, &path)
    }
}
