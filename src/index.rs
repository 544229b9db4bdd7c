//! The synthetic package index.
//!
//! An in-memory stand-in for a real registry: the candidate pool the
//! resolver searches. Append-only while a definition is being assembled,
//! read-only once resolution starts.

use std::collections::BTreeMap;

use semver::Version;

use crate::core::{Dependency, PackageId, Spec, SourceId};

/// Pseudo-package representing the running language runtime.
///
/// The NUL prefix keeps internal entries out of the namespace a manifest
/// could ever declare; they are filtered from lock output.
pub(crate) const RUNTIME_PACKAGE: &str = "\0ruby";

/// Pseudo-package representing the package manager itself.
pub(crate) const MANAGER_PACKAGE: &str = "\0rubygems";

/// Internal entries never surface in lock files or manifests.
pub(crate) fn is_internal(name: &str) -> bool {
    name.starts_with('\0')
}

/// The synthetic index: every candidate package version, keyed by name.
///
/// Identity is (name, version, platform); inserting a spec with an
/// identity already present replaces the earlier entry.
#[derive(Debug, Clone, Default)]
pub struct Index {
    packages: BTreeMap<String, Vec<Spec>>,
}

impl Index {
    /// Create an empty index.
    pub fn new() -> Self {
        Index {
            packages: BTreeMap::new(),
        }
    }

    /// Insert a spec. Last insertion wins on duplicate identity.
    pub fn add(&mut self, spec: Spec) {
        let entries = self.packages.entry(spec.name().to_string()).or_default();
        if let Some(existing) = entries
            .iter_mut()
            .find(|s| s.package_id() == spec.package_id())
        {
            *existing = spec;
        } else {
            entries.push(spec);
        }
    }

    /// Insert every spec from an iterator.
    pub fn extend(&mut self, specs: impl IntoIterator<Item = Spec>) {
        for spec in specs {
            self.add(spec);
        }
    }

    /// All candidate versions of a package, in insertion order.
    pub fn versions(&self, name: &str) -> &[Spec] {
        self.packages.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidates matching a declared dependency (name and every
    /// requirement).
    pub fn query(&self, dep: &Dependency) -> Vec<Spec> {
        self.versions(dep.name())
            .iter()
            .filter(|s| dep.matches_version(s.version()))
            .cloned()
            .collect()
    }

    /// Check whether any version of a package is present.
    pub fn contains_name(&self, name: &str) -> bool {
        !self.versions(name).is_empty()
    }

    /// Check whether a package is present at an exact version.
    pub fn contains_version(&self, name: &str, version: &Version) -> bool {
        self.versions(name).iter().any(|s| s.version() == version)
    }

    /// Look up a spec by name and exact version. When two platforms share
    /// a version, the later insertion wins.
    pub fn spec(&self, name: &str, version: &Version) -> Option<&Spec> {
        self.versions(name)
            .iter()
            .rev()
            .find(|s| s.version() == version)
    }

    /// Number of distinct package names.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Inject the runtime and package-manager pseudo-packages so that
    /// manifest runtime constraints can be satisfied during resolution.
    pub fn add_runtime_packages(
        &mut self,
        runtime_version: &Version,
        manager_version: &Version,
        source: SourceId,
    ) {
        self.add(Spec::new(
            PackageId::new(RUNTIME_PACKAGE, runtime_version.clone()),
            vec![],
            source,
        ));
        self.add(Spec::new(
            PackageId::new(MANAGER_PACKAGE, manager_version.clone()),
            vec![],
            source,
        ));
    }

    /// Synthesize a dependency-free candidate for every declared
    /// dependency whose pinned version is missing from the pool, so
    /// single-line test setups need not hand-author matching specs.
    pub fn ensure_declared(&mut self, dependencies: &[Dependency], source: SourceId) {
        for dep in dependencies {
            let pinned = dep.pinned_version();
            if !self.contains_version(dep.name(), &pinned) {
                tracing::debug!(name = dep.name(), version = %pinned, "synthesizing index entry");
                self.add(Spec::new(
                    PackageId::new(dep.name(), pinned),
                    vec![],
                    source,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Requirement;

    fn source() -> SourceId {
        SourceId::for_remote("https://rubygems.org").unwrap()
    }

    fn spec(name: &str, version: &str) -> Spec {
        Spec::new(
            PackageId::new(name, version.parse().unwrap()),
            vec![],
            source(),
        )
    }

    #[test]
    fn test_add_and_versions() {
        let mut index = Index::new();
        index.add(spec("bar", "1.1.3"));
        index.add(spec("bar", "1.2.4"));

        assert_eq!(index.versions("bar").len(), 2);
        assert!(index.contains_name("bar"));
        assert!(!index.contains_name("baz"));
    }

    #[test]
    fn test_duplicate_identity_last_wins() {
        let dep = Dependency::new("inner", source());
        let replacement = Spec::new(
            PackageId::new("bar", Version::new(1, 1, 3)),
            vec![dep],
            source(),
        );

        let mut index = Index::new();
        index.add(spec("bar", "1.1.3"));
        index.add(replacement);

        assert_eq!(index.versions("bar").len(), 1);
        assert_eq!(index.versions("bar")[0].dependencies().len(), 1);
    }

    #[test]
    fn test_query_filters_by_requirements() {
        let mut index = Index::new();
        index.extend([spec("bar", "1.0.3"), spec("bar", "1.1.3"), spec("bar", "2.0.0")]);

        let dep = Dependency::new("bar", source())
            .with_requirements(Requirement::parse_list(">= 1.0.4, < 2").unwrap());
        let hits = index.query(&dep);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].version(), &Version::new(1, 1, 3));
    }

    #[test]
    fn test_ensure_declared_synthesizes_missing() {
        let mut index = Index::new();
        let dep = Dependency::new("foo", source())
            .with_requirements(Requirement::parse_list("1.2.3").unwrap());

        index.ensure_declared(std::slice::from_ref(&dep), source());

        assert!(index.contains_version("foo", &Version::new(1, 2, 3)));
        assert!(index.versions("foo")[0].dependencies().is_empty());
    }

    #[test]
    fn test_ensure_declared_skips_present() {
        let mut index = Index::new();
        index.add(spec("foo", "1.2.3"));
        let dep = Dependency::new("foo", source())
            .with_requirements(Requirement::parse_list("1.2.3").unwrap());

        index.ensure_declared(std::slice::from_ref(&dep), source());

        assert_eq!(index.versions("foo").len(), 1);
    }

    #[test]
    fn test_runtime_packages_are_internal() {
        let mut index = Index::new();
        index.add_runtime_packages(&Version::new(3, 2, 0), &Version::new(0, 4, 0), source());

        assert!(index.contains_name(RUNTIME_PACKAGE));
        assert!(index.contains_name(MANAGER_PACKAGE));
        assert!(is_internal(RUNTIME_PACKAGE));
        assert!(!is_internal("ruby"));
    }
}
