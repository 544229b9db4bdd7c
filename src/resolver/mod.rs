//! Dependency resolution.
//!
//! PubGrub-based version resolution over the synthetic index. The
//! resolver is pure and deterministic: the index is assembled before
//! resolution and nothing is fetched during it. Lock pinning is enforced
//! here - a pinned package only ever resolves to its locked version.

pub mod capabilities;
pub mod encode;
pub mod errors;
pub mod ranges;
pub mod resolve;

pub use capabilities::Capabilities;
pub use encode::{LockedPackage, Lockfile};
pub use errors::ResolveError;
pub use resolve::Resolve;

use std::collections::HashMap;
use std::fmt;

use pubgrub::{
    Dependencies, DefaultStringReporter, DependencyProvider, PackageResolutionStatistics, Range,
    Reporter,
};
use semver::Version;

use crate::core::Spec;
use crate::index::{is_internal, Index};

/// A package identifier for PubGrub resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolverPackage {
    pub name: String,
}

impl fmt::Display for ResolverPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One resolution pass over a session index.
pub struct Resolver<'a> {
    /// Candidate pool
    index: &'a Index,

    /// Virtual root whose dependencies are the declared set
    root: Spec,

    /// Locked versions that must not move
    pinned: HashMap<String, Version>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver session.
    pub fn new(root: Spec, index: &'a Index, pinned: HashMap<String, Version>) -> Self {
        Resolver {
            index,
            root,
            pinned,
        }
    }

    /// Resolve and return the chosen graph.
    pub fn resolve(self) -> Result<Resolve, ResolveError> {
        // A declared dependency no candidate satisfies can only fail;
        // report it up front under its declared form rather than through
        // a solver derivation. Transitive conflicts and the internal
        // runtime entries stay with the solver.
        for dep in self.root.dependencies() {
            if is_internal(dep.name()) {
                continue;
            }
            let satisfied = self
                .index
                .versions(dep.name())
                .iter()
                .any(|s| dep.matches_version(s.version()));
            if !satisfied {
                return Err(ResolveError::PackageNotFound {
                    package: dep.to_string(),
                });
            }
        }

        let root_pkg = ResolverPackage {
            name: self.root.name().to_string(),
        };
        let root_version = self.root.version().clone();

        match pubgrub::resolve(&self, root_pkg, root_version) {
            Ok(solution) => {
                let mut resolve = Resolve::new();

                for (pkg, version) in solution {
                    if pkg.name == self.root.name() {
                        resolve.add_package(self.root.clone());
                    } else if let Some(spec) = self.index.spec(&pkg.name, &version) {
                        resolve.add_package(spec.clone());
                    }
                }

                // Add dependency edges between chosen packages
                let chosen: Vec<_> = resolve.packages().cloned().collect();
                for spec in chosen {
                    for dep in spec.dependencies() {
                        if let Some(dep_id) = resolve.get_package_by_name(dep.name()) {
                            let dep_id = dep_id.clone();
                            resolve.add_edge(spec.package_id(), &dep_id);
                        }
                    }
                }

                Ok(resolve)
            }
            Err(pubgrub::PubGrubError::NoSolution(tree)) => {
                let report = DefaultStringReporter::report(&tree);
                Err(ResolveError::NoSolution { report })
            }
            Err(e) => Err(ResolveError::Internal(format!("{e:?}"))),
        }
    }
}

impl DependencyProvider for Resolver<'_> {
    type P = ResolverPackage;
    type V = Version;
    type VS = Range<Version>;
    type M = String;
    type Err = ResolveError;
    type Priority = u32;

    fn prioritize(
        &self,
        package: &Self::P,
        _range: &Self::VS,
        _package_conflicts_counts: &PackageResolutionStatistics,
    ) -> Self::Priority {
        // Higher priority = resolved first; prefer packages with fewer
        // candidate versions
        let candidates = self.index.versions(&package.name).len();
        (1000 - candidates.min(1000)) as u32
    }

    fn choose_version(
        &self,
        package: &Self::P,
        range: &Self::VS,
    ) -> Result<Option<Self::V>, Self::Err> {
        // The virtual root has exactly one version
        if package.name == self.root.name() {
            let version = self.root.version().clone();
            if range.contains(&version) {
                return Ok(Some(version));
            }
            return Ok(None);
        }

        // A pinned package may only resolve to its locked version
        if let Some(locked) = self.pinned.get(&package.name) {
            if range.contains(locked) {
                return Ok(Some(locked.clone()));
            }
            return Ok(None);
        }

        // Otherwise pick the highest matching version
        let best = self
            .index
            .versions(&package.name)
            .iter()
            .filter(|s| range.contains(s.version()))
            .max_by(|a, b| a.version().cmp(b.version()));

        Ok(best.map(|s| s.version().clone()))
    }

    fn get_dependencies(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Dependencies<Self::P, Self::VS, Self::M>, Self::Err> {
        let spec = if package.name == self.root.name() && version == self.root.version() {
            Some(&self.root)
        } else {
            self.index.spec(&package.name, version)
        };

        let Some(spec) = spec else {
            return Ok(Dependencies::Unavailable("package not found".to_string()));
        };

        let deps = spec
            .dependencies()
            .iter()
            .map(|dep| {
                let pkg = ResolverPackage {
                    name: dep.name().to_string(),
                };
                let range = ranges::requirements_to_range(dep.requirements());
                (pkg, range)
            })
            .collect();

        Ok(Dependencies::Available(deps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dependency, PackageId, Requirement, SourceId};

    fn source() -> SourceId {
        SourceId::for_remote("https://rubygems.org").unwrap()
    }

    fn spec(name: &str, version: &str, deps: &[(&str, &str)]) -> Spec {
        let dependencies = deps
            .iter()
            .map(|(dep_name, reqs)| {
                Dependency::new(*dep_name, source())
                    .with_requirements(Requirement::parse_list(reqs).unwrap())
            })
            .collect();
        Spec::new(
            PackageId::new(name, version.parse().unwrap()),
            dependencies,
            source(),
        )
    }

    fn root(deps: &[(&str, &str)]) -> Spec {
        spec("\0root", "0.0.0", deps)
    }

    #[test]
    fn test_resolver_empty_root() {
        let index = Index::new();
        let resolver = Resolver::new(root(&[]), &index, HashMap::new());
        let resolve = resolver.resolve().unwrap();

        assert_eq!(resolve.len(), 1);
    }

    #[test]
    fn test_resolver_picks_highest() {
        let mut index = Index::new();
        index.extend([
            spec("bar", "1.1.3", &[]),
            spec("bar", "1.1.4", &[]),
            spec("bar", "1.2.4", &[]),
        ]);

        let resolver = Resolver::new(root(&[("bar", ">= 1.0.4")]), &index, HashMap::new());
        let resolve = resolver.resolve().unwrap();

        let bar = resolve.get_package_by_name("bar").unwrap();
        assert_eq!(bar.version(), &Version::new(1, 2, 4));
    }

    #[test]
    fn test_resolver_honors_pin() {
        let mut index = Index::new();
        index.extend([spec("bar", "1.1.3", &[]), spec("bar", "1.2.4", &[])]);

        let pinned = HashMap::from([("bar".to_string(), Version::new(1, 1, 3))]);
        let resolver = Resolver::new(root(&[("bar", ">= 1.0")]), &index, pinned);
        let resolve = resolver.resolve().unwrap();

        let bar = resolve.get_package_by_name("bar").unwrap();
        assert_eq!(bar.version(), &Version::new(1, 1, 3));
    }

    #[test]
    fn test_resolver_unknown_name_is_not_found() {
        let index = Index::new();
        let resolver = Resolver::new(root(&[("ghost", "")]), &index, HashMap::new());

        let err = resolver.resolve().unwrap_err();
        assert!(matches!(err, ResolveError::PackageNotFound { ref package } if package == "ghost"));
    }

    #[test]
    fn test_unsatisfiable_declared_dependency_is_not_found() {
        let mut index = Index::new();
        index.add(spec("bar", "1.0.0", &[]));

        let resolver = Resolver::new(root(&[("bar", ">= 2.0")]), &index, HashMap::new());
        let err = resolver.resolve().unwrap_err();
        assert!(
            matches!(err, ResolveError::PackageNotFound { ref package } if package == "bar >= 2.0")
        );
    }

    #[test]
    fn test_transitive_conflict_is_no_solution() {
        let mut index = Index::new();
        index.extend([
            spec("foo", "1.0.0", &[("bar", ">= 2.0")]),
            spec("bar", "1.0.0", &[]),
        ]);

        let resolver = Resolver::new(root(&[("foo", "")]), &index, HashMap::new());
        let err = resolver.resolve().unwrap_err();
        assert!(matches!(err, ResolveError::NoSolution { .. }));
    }
}
