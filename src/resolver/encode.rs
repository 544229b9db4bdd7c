//! Lock file encoding and decoding.
//!
//! The lock file is TOML with one `[[package]]` record per resolved
//! package, sorted by name. Tools should treat the byte format as an
//! implementation detail and assert on parsed fields.

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::index::is_internal;
use crate::resolver::resolve::Resolve;

/// Parsed lock file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lockfile {
    /// Lock format version
    pub version: u32,

    /// Runtime version recorded at lock time, when the manifest
    /// constrained it and the resolver supports recording it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ruby_version: Option<String>,

    /// Locked packages, sorted by name then version
    #[serde(rename = "package", default)]
    pub packages: Vec<LockedPackage>,
}

/// A locked package entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedPackage {
    /// Package name
    pub name: String,

    /// Exact version
    pub version: String,

    /// Platform
    pub platform: String,

    /// Source label (`registry+<url>`)
    pub source: String,

    /// Dependencies as `name version` pairs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl LockedPackage {
    /// Names of this package's dependencies.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .filter_map(|entry| entry.split_whitespace().next())
    }
}

impl Lockfile {
    /// Encode a resolved graph. Internal entries (the virtual root and
    /// the runtime pseudo-packages) are not part of the lock.
    pub fn from_resolve(resolve: &Resolve) -> Self {
        let mut packages: Vec<LockedPackage> = resolve
            .packages()
            .filter(|spec| !is_internal(spec.name()))
            .map(|spec| {
                let deps: Vec<String> = spec
                    .dependencies()
                    .iter()
                    .filter(|dep| !is_internal(dep.name()))
                    .filter_map(|dep| {
                        resolve
                            .get_package_by_name(dep.name())
                            .map(|id| format!("{} {}", id.name(), id.version()))
                    })
                    .collect();

                LockedPackage {
                    name: spec.name().to_string(),
                    version: spec.version().to_string(),
                    platform: spec.platform().to_string(),
                    source: spec.source_id().to_url_string(),
                    dependencies: deps,
                }
            })
            .collect();

        // Sort for deterministic output
        packages.sort_by(|a, b| a.name.cmp(&b.name).then(a.version.cmp(&b.version)));

        Lockfile {
            version: 1,
            ruby_version: None,
            packages,
        }
    }

    /// Record the resolved runtime version.
    pub fn with_ruby_version(mut self, version: String) -> Self {
        self.ruby_version = Some(version);
        self
    }

    /// The recorded runtime version, if present.
    pub fn ruby_version(&self) -> Option<&str> {
        self.ruby_version.as_deref()
    }

    /// Load a lock file from a path. Fails if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lockfile: {}", path.display()))?;

        toml::from_str(&content).with_context(|| "failed to parse lockfile")
    }

    /// Load a lock file if one exists at the path.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::load(path)?))
    }

    /// Save the lock file to a path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        let with_header = format!(
            "# This file is automatically generated by drydock.\n\
             # It is not intended for manual editing.\n\n\
             {content}"
        );

        std::fs::write(path, with_header)
            .with_context(|| format!("failed to write lockfile: {}", path.display()))?;

        Ok(())
    }

    /// First locked package with the given name.
    pub fn spec(&self, name: &str) -> Option<&LockedPackage> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// The names a scoped update is allowed to move: the named packages
    /// plus the transitive closure of their dependencies in this lock.
    pub fn unlock_closure(&self, names: &[String]) -> BTreeSet<String> {
        let mut unlocked = BTreeSet::new();
        let mut queue: VecDeque<&str> = names.iter().map(String::as_str).collect();

        while let Some(name) = queue.pop_front() {
            if !unlocked.insert(name.to_string()) {
                continue;
            }
            if let Some(pkg) = self.spec(name) {
                queue.extend(pkg.dependency_names());
            }
        }

        unlocked
    }

    /// Check if the lock format is one this crate can interpret.
    pub fn is_compatible(&self) -> bool {
        self.version == 1
    }
}
