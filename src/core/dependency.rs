//! Declared dependencies.
//!
//! A Dependency is one line of a manifest: a package name, an ordered
//! list of version requirements, and the source it should come from.
//! An empty requirement list means any version is acceptable.

use semver::Version;

use crate::core::requirement::Requirement;
use crate::core::source_id::SourceId;

/// A declared dependency.
#[derive(Debug, Clone)]
pub struct Dependency {
    /// Package name
    name: String,

    /// Version requirements, all of which must hold
    requirements: Vec<Requirement>,

    /// Where to find the package
    source_id: SourceId,
}

impl Dependency {
    /// Create an unconstrained dependency.
    pub fn new(name: impl Into<String>, source_id: SourceId) -> Self {
        Dependency {
            name: name.into(),
            requirements: Vec::new(),
            source_id,
        }
    }

    /// Set the version requirements.
    pub fn with_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.requirements = requirements;
        self
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the version requirements.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Get the source ID.
    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// Check if a version satisfies every requirement.
    pub fn matches_version(&self, version: &Version) -> bool {
        self.requirements.iter().all(|req| req.matches(version))
    }

    /// The version the index builder pins when it has to synthesize a
    /// candidate for this dependency: the version of the first
    /// requirement, or `0.0.0` when unconstrained.
    pub fn pinned_version(&self) -> Version {
        self.requirements
            .first()
            .map(Requirement::version)
            .unwrap_or_else(|| Version::new(0, 0, 0))
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for (i, req) in self.requirements.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{req}")?;
        }
        Ok(())
    }
}
