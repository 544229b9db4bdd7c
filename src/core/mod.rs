//! Core data model: package versions, declared dependencies, version
//! requirements, and source identities.

pub mod dependency;
pub mod requirement;
pub mod source_id;
pub mod spec;

pub use dependency::Dependency;
pub use requirement::{Op, Requirement};
pub use source_id::SourceId;
pub use spec::{PackageId, Spec, DEFAULT_PLATFORM};
