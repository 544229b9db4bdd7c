//! Source registry.
//!
//! Models the ordered set of registry locations a fixture knows about.
//! The first configured source is the default, attached to every spec
//! and dependency built without an explicit source.

use anyhow::Result;

use crate::core::SourceId;

/// Remote used when a fixture is constructed without one.
pub const DEFAULT_REMOTE: &str = "https://rubygems.org";

/// An ordered collection of registry sources.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    sources: Vec<SourceId>,
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        SourceMap {
            sources: Vec::new(),
        }
    }

    /// Register a remote registry. The first registered source becomes
    /// the default.
    pub fn add_remote(&mut self, url: &str) -> Result<SourceId> {
        let id = SourceId::for_remote(url)?;
        if !self.sources.contains(&id) {
            self.sources.push(id);
        }
        Ok(id)
    }

    /// The default source, if any source has been registered.
    pub fn default_source(&self) -> Option<SourceId> {
        self.sources.first().copied()
    }

    /// All registered sources, in registration order.
    pub fn all(&self) -> &[SourceId] {
        &self.sources
    }
}
