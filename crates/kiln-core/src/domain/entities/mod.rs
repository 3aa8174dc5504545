pub mod common;
pub mod include_chain;
pub mod skeleton;

pub use crate::domain::DomainError;
pub use common::RelativePath;
pub use include_chain::IncludeChain;
pub use skeleton::{Skeleton, SkeletonEntry, SkeletonMeta, validate_template_name};
