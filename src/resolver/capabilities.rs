//! Resolver feature capabilities.
//!
//! Feature availability is resolved once from the resolver version into
//! a capability table, instead of scattering version comparisons through
//! the call sites.

use semver::Version;

/// Version of the embedded resolver.
pub const RESOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime pseudo-packages became resolvable in this release.
fn runtime_packages_since() -> Version {
    Version::new(0, 2, 0)
}

/// Lock files started recording the runtime version in this release.
fn lockfile_runtime_since() -> Version {
    Version::new(0, 3, 0)
}

/// What the resolver at a given version supports.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// The runtime and package manager are modeled as installable
    /// pseudo-packages, so manifest runtime constraints participate in
    /// resolution.
    pub runtime_packages: bool,

    /// Lock files record the resolved runtime version.
    pub lockfile_runtime_version: bool,
}

impl Capabilities {
    /// Capability table for the embedded resolver.
    pub fn detect() -> Self {
        Self::for_version(&manager_version())
    }

    /// Capability table for an arbitrary resolver version.
    pub fn for_version(version: &Version) -> Self {
        Capabilities {
            runtime_packages: *version >= runtime_packages_since(),
            lockfile_runtime_version: *version >= lockfile_runtime_since(),
        }
    }
}

/// The package-manager version injected as a pseudo-package.
pub fn manager_version() -> Version {
    RESOLVER_VERSION
        .parse()
        .expect("crate version is valid semver")
}
