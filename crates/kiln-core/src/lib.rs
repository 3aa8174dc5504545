//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Kiln
//! package generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             kiln-cli (CLI)              │
//! │  (argument parsing, prompts, config)    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │   (ScaffoldService, TemplateService)    │
//! │   IncludeResolver → Materializer        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │ (Filesystem, TemplateLocator, Skeleton- │
//! │  Loader, CollisionResolver)             │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (LocalFilesystem, DirectoryLocator, ...)│
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (VariableSubstitutor, ProcessorRegistry│
//! │   Skeleton, IncludeChain)               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiln_core::prelude::*;
//!
//! let service = ScaffoldService::new(locator, loader, filesystem, ProcessorRegistry::with_builtins());
//! let request = ScaffoldRequest::new("default", "./widget", ProjectVariables::new("widget"));
//! let report = service.scaffold(&request, &mut |_: &Path, _: &[u8]| Ok(false))?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CollisionResolver, EntryOutcome, Filesystem, MaterializeReport, ResolvedTemplates,
        ScaffoldRequest, ScaffoldService, SkeletonLoader, TemplateInfo, TemplateLocator,
        TemplateService,
    };
    pub use crate::domain::{
        ProcessorRegistry, ProjectVariables, RelativePath, Skeleton, SkeletonMeta, VariableMap,
        VariableSubstitutor,
    };
    pub use crate::error::{KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
