//! Resolve - the immutable resolved graph.
//!
//! Once created, a Resolve is read-only: it records which package
//! versions the solver chose and how they depend on each other.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::{PackageId, Spec};

/// The resolved dependency graph.
#[derive(Debug, Clone, Default)]
pub struct Resolve {
    /// Package graph; an edge a -> b means a depends on b
    graph: DiGraph<PackageId, ()>,

    /// Map from PackageId to node index
    pkg_to_node: HashMap<PackageId, NodeIndex>,

    /// Map from package name to PackageId
    name_to_pkg: HashMap<String, PackageId>,

    /// Chosen spec for each package
    specs: HashMap<PackageId, Spec>,
}

impl Resolve {
    /// Create a new empty Resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chosen package.
    pub fn add_package(&mut self, spec: Spec) {
        let pkg_id = spec.package_id().clone();
        if self.pkg_to_node.contains_key(&pkg_id) {
            return;
        }

        let node = self.graph.add_node(pkg_id.clone());
        self.pkg_to_node.insert(pkg_id.clone(), node);
        self.name_to_pkg.insert(pkg_id.name().to_string(), pkg_id.clone());
        self.specs.insert(pkg_id, spec);
    }

    /// Add a dependency edge between chosen packages.
    pub fn add_edge(&mut self, from: &PackageId, to: &PackageId) {
        if let (Some(&from_node), Some(&to_node)) =
            (self.pkg_to_node.get(from), self.pkg_to_node.get(to))
        {
            if !self.graph.contains_edge(from_node, to_node) {
                self.graph.add_edge(from_node, to_node, ());
            }
        }
    }

    /// Get the chosen package for a name.
    pub fn get_package_by_name(&self, name: &str) -> Option<&PackageId> {
        self.name_to_pkg.get(name)
    }

    /// Get the spec behind a chosen package.
    pub fn spec(&self, pkg_id: &PackageId) -> Option<&Spec> {
        self.specs.get(pkg_id)
    }

    /// Iterate over all chosen specs.
    pub fn packages(&self) -> impl Iterator<Item = &Spec> {
        self.specs.values()
    }

    /// Direct dependencies of a chosen package.
    pub fn deps(&self, pkg_id: &PackageId) -> Vec<PackageId> {
        if let Some(&node) = self.pkg_to_node.get(pkg_id) {
            self.graph
                .neighbors(node)
                .map(|n| self.graph[n].clone())
                .collect()
        } else {
            Vec::new()
        }
    }

    /// Number of chosen packages.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Check if a package name was chosen.
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_to_pkg.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceId;
    use semver::Version;

    fn spec(name: &str, version: Version) -> Spec {
        let source = SourceId::for_remote("https://rubygems.org").unwrap();
        Spec::new(PackageId::new(name, version), vec![], source)
    }

    #[test]
    fn test_resolve_basic() {
        let mut resolve = Resolve::new();

        let a = spec("a", Version::new(1, 0, 0));
        let b = spec("b", Version::new(2, 0, 0));
        let a_id = a.package_id().clone();
        let b_id = b.package_id().clone();

        resolve.add_package(a);
        resolve.add_package(b);
        resolve.add_edge(&a_id, &b_id);

        assert_eq!(resolve.len(), 2);
        assert_eq!(resolve.deps(&a_id), vec![b_id.clone()]);
        assert!(resolve.deps(&b_id).is_empty());
        assert_eq!(resolve.get_package_by_name("b"), Some(&b_id));
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut resolve = Resolve::new();
        resolve.add_package(spec("a", Version::new(1, 0, 0)));
        resolve.add_package(spec("a", Version::new(1, 0, 0)));
        assert_eq!(resolve.len(), 1);
    }
}
