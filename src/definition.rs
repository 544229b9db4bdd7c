//! Resolution requests.
//!
//! A Definition binds one resolution request to a resolver session: the
//! declared dependencies, the session index standing in for a live
//! registry, the update scope, and the lock-file path. The index is a
//! constructor parameter - the session has an explicit injection seam, so
//! nothing needs to reach into resolver internals after construction and
//! there is no ordering hazard against lock-file re-reads.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use semver::Version;

use crate::core::{Dependency, PackageId, Requirement, Spec, SourceId};
use crate::index::{Index, RUNTIME_PACKAGE};
use crate::resolver::{Capabilities, Lockfile, Resolve, Resolver};

/// Name of the virtual root package standing in for the manifest.
pub(crate) const ROOT_PACKAGE: &str = "\0root";

/// Which already-locked packages a re-resolution may change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Update {
    /// Keep every locked version; only newly declared dependencies
    /// resolve fresh.
    #[default]
    None,

    /// Ignore the existing lock entirely.
    All,

    /// Re-resolve the named packages and anything they transitively
    /// depend on; everything else keeps its locked version.
    Packages(Vec<String>),
}

/// A resolution request bound to a resolver session.
#[derive(Debug)]
pub struct Definition {
    index: Index,
    dependencies: Vec<Dependency>,
    update: Update,
    lockfile_path: PathBuf,
    previous: Option<Lockfile>,
    runtime_requirements: Vec<Requirement>,
    default_source: SourceId,
    capabilities: Capabilities,
}

impl Definition {
    /// Create a definition. An existing lock file at `lockfile_path` is
    /// read immediately and drives pinning during resolution.
    pub fn new(
        index: Index,
        dependencies: Vec<Dependency>,
        lockfile_path: PathBuf,
        default_source: SourceId,
        capabilities: Capabilities,
    ) -> Result<Self> {
        let previous = Lockfile::load_if_exists(&lockfile_path)?;

        Ok(Definition {
            index,
            dependencies,
            update: Update::None,
            lockfile_path,
            previous,
            runtime_requirements: Vec::new(),
            default_source,
            capabilities,
        })
    }

    /// Set the update scope.
    pub fn with_update(mut self, update: Update) -> Self {
        self.update = update;
        self
    }

    /// Constrain the runtime version, as a manifest `ruby` line would.
    pub fn with_runtime_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.runtime_requirements = requirements;
        self
    }

    /// Path the lock file is written to.
    pub fn lockfile_path(&self) -> &std::path::Path {
        &self.lockfile_path
    }

    /// Resolve the request without writing anything.
    pub fn resolve(&self) -> Result<Resolve> {
        let pinned = self.pinned_versions()?;
        let session = self.session_index(&pinned)?;

        tracing::debug!(
            declared = self.dependencies.len(),
            pinned = pinned.len(),
            candidates = session.len(),
            "resolving"
        );

        let resolver = Resolver::new(self.root_spec(), &session, pinned);
        Ok(resolver.resolve()?)
    }

    /// Resolve and write the lock file.
    pub fn lock(&self) -> Result<Lockfile> {
        let resolve = self.resolve()?;

        let mut lockfile = Lockfile::from_resolve(&resolve);
        if self.capabilities.lockfile_runtime_version {
            if let Some(runtime) = resolve.get_package_by_name(RUNTIME_PACKAGE) {
                lockfile = lockfile.with_ruby_version(runtime.version().to_string());
            }
        }

        lockfile.save(&self.lockfile_path)?;
        tracing::info!(path = %self.lockfile_path.display(), packages = lockfile.packages.len(), "wrote lockfile");

        Ok(lockfile)
    }

    /// The virtual root: its dependency edges are the declared set plus
    /// the runtime constraint, if any.
    fn root_spec(&self) -> Spec {
        let mut deps = self.dependencies.clone();
        if !self.runtime_requirements.is_empty() {
            deps.push(
                Dependency::new(RUNTIME_PACKAGE, self.default_source)
                    .with_requirements(self.runtime_requirements.clone()),
            );
        }

        Spec::new(
            PackageId::new(ROOT_PACKAGE, Version::new(0, 0, 0)),
            deps,
            self.default_source,
        )
    }

    /// Locked versions that this request's update scope forbids moving.
    fn pinned_versions(&self) -> Result<HashMap<String, Version>> {
        let Some(previous) = &self.previous else {
            return Ok(HashMap::new());
        };

        let unlocked = match &self.update {
            Update::All => return Ok(HashMap::new()),
            Update::None => Default::default(),
            Update::Packages(names) => previous.unlock_closure(names),
        };

        let mut pinned = HashMap::new();
        for pkg in &previous.packages {
            if unlocked.contains(&pkg.name) {
                continue;
            }
            let version: Version = pkg
                .version
                .parse()
                .with_context(|| format!("invalid locked version for `{}`", pkg.name))?;
            pinned.insert(pkg.name.clone(), version);
        }

        Ok(pinned)
    }

    /// The candidate pool for this resolution. Pinned packages missing
    /// from the supplied pool are reconstructed from their lock entries,
    /// so callers need not re-supply specs the resolver is forbidden to
    /// move anyway.
    fn session_index(&self, pinned: &HashMap<String, Version>) -> Result<Index> {
        let mut session = self.index.clone();

        let Some(previous) = &self.previous else {
            return Ok(session);
        };

        for (name, version) in pinned {
            if session.contains_version(name, version) {
                continue;
            }
            let Some(locked) = previous.spec(name) else {
                continue;
            };

            let source = SourceId::parse(&locked.source)
                .with_context(|| format!("invalid locked source for `{name}`"))?;
            // The lock records dependency names but not their original
            // requirements; pinning already fixes every version this
            // entry could influence, so the edges stay unconstrained.
            let deps = locked
                .dependency_names()
                .map(|dep_name| Dependency::new(dep_name, source))
                .collect();

            session.add(Spec::new(
                PackageId::with_platform(name, version.clone(), locked.platform.clone()),
                deps,
                source,
            ));
        }

        Ok(session)
    }
}
