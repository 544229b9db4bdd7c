//! Package-version records.
//!
//! A Spec is one entry of the synthetic index: the identity of a package
//! version plus its declared dependency edges. Specs are Arc-wrapped for
//! cheap cloning and never mutated after construction; "updating" a
//! package means creating a new Spec.

use std::fmt;
use std::sync::Arc;

use semver::Version;

use crate::core::dependency::Dependency;
use crate::core::source_id::SourceId;

/// Platform attached to specs that do not name one explicitly.
pub const DEFAULT_PLATFORM: &str = "ruby";

/// Identity of a package version: (name, version, platform).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    name: String,
    version: Version,
    platform: String,
}

impl PackageId {
    /// Create a package ID on the default platform.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self::with_platform(name, version, DEFAULT_PLATFORM)
    }

    /// Create a package ID with an explicit platform.
    pub fn with_platform(
        name: impl Into<String>,
        version: Version,
        platform: impl Into<String>,
    ) -> Self {
        PackageId {
            name: name.into(),
            version,
            platform: platform.into(),
        }
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Get the platform.
    pub fn platform(&self) -> &str {
        &self.platform
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)?;
        if self.platform != DEFAULT_PLATFORM {
            write!(f, " ({})", self.platform)?;
        }
        Ok(())
    }
}

/// A synthetic package-version record.
#[derive(Clone)]
pub struct Spec {
    inner: Arc<SpecInner>,
}

struct SpecInner {
    id: PackageId,
    dependencies: Vec<Dependency>,
    source_id: SourceId,
}

impl Spec {
    /// Create a new spec.
    pub fn new(id: PackageId, dependencies: Vec<Dependency>, source_id: SourceId) -> Self {
        Spec {
            inner: Arc::new(SpecInner {
                id,
                dependencies,
                source_id,
            }),
        }
    }

    /// Get the package ID.
    pub fn package_id(&self) -> &PackageId {
        &self.inner.id
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        self.inner.id.name()
    }

    /// Get the package version.
    pub fn version(&self) -> &Version {
        self.inner.id.version()
    }

    /// Get the platform.
    pub fn platform(&self) -> &str {
        self.inner.id.platform()
    }

    /// Get the declared dependency edges.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.inner.dependencies
    }

    /// Get the source ID.
    pub fn source_id(&self) -> SourceId {
        self.inner.source_id
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("id", &self.inner.id)
            .field("dependencies", &self.inner.dependencies.len())
            .finish()
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.id)
    }
}

impl PartialEq for Spec {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Spec {}

impl std::hash::Hash for Spec {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}
