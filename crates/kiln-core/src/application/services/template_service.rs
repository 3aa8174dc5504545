//! Template Service - template discovery queries.
//!
//! Separated from ScaffoldService for single responsibility.

use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::{
    application::ports::{SkeletonLoader, TemplateLocator},
    error::KilnResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    /// `user`, `plugin:<name>` or `bundled`.
    pub source: String,
    pub path: PathBuf,
    pub description: Option<String>,
    pub includes: Vec<String>,
    /// Set when the template directory could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Service for template queries.
pub struct TemplateService {
    locator: Box<dyn TemplateLocator>,
    loader: Box<dyn SkeletonLoader>,
}

impl TemplateService {
    /// Create a new template service.
    pub fn new(locator: Box<dyn TemplateLocator>, loader: Box<dyn SkeletonLoader>) -> Self {
        Self { locator, loader }
    }

    /// Whether any source provides `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.locator.locate(name).is_some()
    }

    /// List all visible templates, shadowed duplicates removed.
    ///
    /// A template that fails to load is still listed, with `error` set.
    pub fn list(&self) -> KilnResult<Vec<TemplateInfo>> {
        let entries = self.locator.list()?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let mut info = TemplateInfo {
                    source: entry.source.to_string(),
                    name: entry.name,
                    path: entry.path,
                    description: None,
                    includes: Vec::new(),
                    error: None,
                };
                match self.loader.load(&info.name, &info.path) {
                    Ok(skeleton) => {
                        info.description = skeleton.meta().description.clone();
                        info.includes = skeleton.includes().to_vec();
                    }
                    Err(e) => {
                        warn!(template = %info.name, error = %e, "Template could not be loaded");
                        info.error = Some(e.to_string());
                    }
                }
                info
            })
            .collect())
    }
}
