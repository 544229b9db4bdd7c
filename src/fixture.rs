//! The test fixture harness.
//!
//! A Fixture owns one working directory and one source registry for its
//! whole lifetime. Tests build synthetic specs and dependencies through
//! it, ask it to resolve and lock them against a synthetic index, and
//! read the resulting lock file back. Two fixtures must not share a
//! directory; give each one a fresh temporary directory and call
//! `clean_up` when done.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use semver::Version;

use crate::core::requirement::parse_version_lenient;
use crate::core::{Dependency, PackageId, Requirement, Spec, SourceId};
use crate::definition::{Definition, Update};
use crate::index::Index;
use crate::manifest;
use crate::resolver::capabilities::{manager_version, Capabilities};
use crate::resolver::{LockedPackage, Lockfile};
use crate::sources::{SourceMap, DEFAULT_REMOTE};
use crate::util::fs;

/// Runtime version a fixture reports unless overridden.
pub const DEFAULT_RUNTIME_VERSION: &str = "3.2.0";

/// Parameters of one `create_lockfile` / `create_definition` call.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Declared dependencies (the manifest lines)
    pub dependencies: Vec<Dependency>,

    /// Candidate pool handed to the resolver as the registry contents
    pub source_specs: Vec<Spec>,

    /// Synthesize index entries for declared dependencies with no
    /// matching candidate (default true)
    pub ensure_sources: bool,

    /// Which locked packages may move (default: none)
    pub update: Update,

    /// Manifest base name override for this call
    pub gemfile: Option<String>,

    /// Runtime version requirement, as a manifest `ruby` line
    pub ruby_version: Option<String>,
}

impl ResolveOptions {
    /// Options for a declared dependency set, with defaults everywhere
    /// else.
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        ResolveOptions {
            dependencies,
            source_specs: Vec::new(),
            ensure_sources: true,
            update: Update::None,
            gemfile: None,
            ruby_version: None,
        }
    }

    /// Set the candidate pool.
    pub fn source_specs(mut self, specs: Vec<Spec>) -> Self {
        self.source_specs = specs;
        self
    }

    /// Enable or disable candidate synthesis for declared dependencies.
    pub fn ensure_sources(mut self, ensure: bool) -> Self {
        self.ensure_sources = ensure;
        self
    }

    /// Set the update scope.
    pub fn update(mut self, update: Update) -> Self {
        self.update = update;
        self
    }

    /// Override the manifest base name for this call.
    pub fn gemfile(mut self, name: impl Into<String>) -> Self {
        self.gemfile = Some(name.into());
        self
    }

    /// Constrain the runtime version.
    pub fn ruby_version(mut self, version: impl Into<String>) -> Self {
        self.ruby_version = Some(version.into());
        self
    }
}

/// The fixture harness.
pub struct Fixture {
    dir: PathBuf,
    sources: SourceMap,
    default_source: SourceId,
    capabilities: Capabilities,
    runtime_version: Version,
    gemfile_name: String,
}

impl Fixture {
    /// Create a fixture in the default directory under the system temp
    /// root. Tests that run concurrently should use `in_dir` with a
    /// fresh temporary directory instead.
    pub fn new() -> Result<Self> {
        Self::in_dir(std::env::temp_dir().join("drydock_project_root"))
    }

    /// Create a fixture owning the given working directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::ensure_dir(&dir)?;

        let mut sources = SourceMap::new();
        let default_source = sources.add_remote(DEFAULT_REMOTE)?;

        Ok(Fixture {
            dir,
            sources,
            default_source,
            capabilities: Capabilities::detect(),
            runtime_version: DEFAULT_RUNTIME_VERSION
                .parse()
                .expect("default runtime version is valid"),
            gemfile_name: "Gemfile".to_string(),
        })
    }

    /// Use a different manifest base name (default `Gemfile`).
    pub fn with_gemfile_name(mut self, name: impl Into<String>) -> Self {
        self.gemfile_name = name.into();
        self
    }

    /// Override the runtime version the fixture reports.
    pub fn with_runtime_version(mut self, version: Version) -> Self {
        self.runtime_version = version;
        self
    }

    /// The working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The default source (the first configured one).
    pub fn source(&self) -> SourceId {
        self.default_source
    }

    /// All configured sources.
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// The capability table resolved at construction.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The runtime version this fixture simulates.
    pub fn runtime_version(&self) -> &Version {
        &self.runtime_version
    }

    /// Path of the manifest file.
    pub fn gemfile_path(&self) -> PathBuf {
        self.dir.join(&self.gemfile_name)
    }

    /// Path of the lock file for the configured manifest name.
    pub fn lockfile_path(&self) -> PathBuf {
        self.lockfile_path_for(None)
    }

    fn lockfile_path_for(&self, gemfile: Option<&str>) -> PathBuf {
        let name = gemfile.unwrap_or(&self.gemfile_name);
        self.dir.join(format!("{name}.lock"))
    }

    /// Remove the working directory. Call exactly once, when the test is
    /// done with the fixture.
    pub fn clean_up(self) -> Result<()> {
        fs::remove_dir_all_if_exists(&self.dir)
    }

    /// Build a package-version record bound to the default source.
    ///
    /// `dependencies` maps dependency names to requirement strings; a
    /// string may hold a comma-separated compound (`"~> 1.0, >= 1.0.9"`).
    pub fn create_spec(
        &self,
        name: &str,
        version: &str,
        dependencies: &[(&str, &str)],
    ) -> Result<Spec> {
        let version = parse_version_lenient(version)
            .ok_or_else(|| anyhow!("invalid version `{version}` for `{name}`"))?;

        let deps = dependencies
            .iter()
            .map(|(dep_name, reqs)| {
                let requirements = Requirement::parse_list(reqs)
                    .with_context(|| format!("invalid requirement for `{dep_name}`"))?;
                Ok(Dependency::new(*dep_name, self.default_source).with_requirements(requirements))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Spec::new(
            PackageId::new(name, version),
            deps,
            self.default_source,
        ))
    }

    /// Build one spec per version string, all sharing the same
    /// dependency template.
    pub fn create_specs(
        &self,
        name: &str,
        versions: &[&str],
        dependencies: &[(&str, &str)],
    ) -> Result<Vec<Spec>> {
        versions
            .iter()
            .map(|version| self.create_spec(name, version, dependencies))
            .collect()
    }

    /// Build a declared dependency bound to the default source. Each
    /// element of `requirements` is a requirement string; an empty slice
    /// means any version.
    pub fn create_dependency(&self, name: &str, requirements: &[&str]) -> Result<Dependency> {
        let mut parsed = Vec::new();
        for reqs in requirements {
            parsed.extend(
                Requirement::parse_list(reqs)
                    .with_context(|| format!("invalid requirement for `{name}`"))?,
            );
        }

        Ok(Dependency::new(name, self.default_source).with_requirements(parsed))
    }

    /// Build declared dependencies from (name, optional requirement)
    /// pairs; `None` means any version.
    pub fn create_dependencies(&self, pairs: &[(&str, Option<&str>)]) -> Result<Vec<Dependency>> {
        pairs
            .iter()
            .map(|(name, reqs)| match reqs {
                Some(reqs) => self.create_dependency(name, &[reqs]),
                None => self.create_dependency(name, &[]),
            })
            .collect()
    }

    /// Assemble the session index and bind a resolution request to it.
    pub fn create_definition(&self, options: ResolveOptions) -> Result<Definition> {
        let mut index = Index::new();
        index.extend(options.source_specs);

        if self.capabilities.runtime_packages {
            index.add_runtime_packages(
                &self.runtime_version,
                &manager_version(),
                self.default_source,
            );
        }

        if options.ensure_sources {
            index.ensure_declared(&options.dependencies, self.default_source);
        }

        let lockfile_path = self.lockfile_path_for(options.gemfile.as_deref());

        let mut definition = Definition::new(
            index,
            options.dependencies,
            lockfile_path,
            self.default_source,
            self.capabilities,
        )?
        .with_update(options.update);

        if let Some(ruby_version) = &options.ruby_version {
            if self.capabilities.runtime_packages {
                let requirements = Requirement::parse_list(ruby_version)
                    .context("invalid runtime version requirement")?;
                definition = definition.with_runtime_requirements(requirements);
            }
        }

        Ok(definition)
    }

    /// Resolve and write the lock file; returns the parsed result.
    pub fn create_lockfile(&self, options: ResolveOptions) -> Result<Lockfile> {
        self.create_definition(options)?.lock()
    }

    /// Write the manifest file for a declared dependency set.
    pub fn create_gemfile(
        &self,
        dependencies: &[Dependency],
        ruby_version: Option<&str>,
    ) -> Result<()> {
        let text = manifest::render(self.default_source, dependencies, ruby_version);
        fs::write_string(&self.gemfile_path(), &text)
    }

    /// Write a tool config file pointing installs at `path` inside the
    /// working directory.
    pub fn create_config(&self, path: &str) -> Result<()> {
        let text = format!(
            "---\nBUNDLE_PATH: \"{path}\"\nBUNDLE_DISABLE_SHARED_GEMS: \"true\"\n"
        );
        fs::write_string(&self.dir.join(".bundle").join("config"), &text)
    }

    /// Raw text of the lock file. Fails if none has been written for the
    /// configured manifest name.
    pub fn lockfile_contents(&self) -> Result<String> {
        fs::read_to_string(&self.lockfile_path())
    }

    /// Parse the lock file. Re-reads from disk on every call so it
    /// always reflects the latest write.
    pub fn parsed_lockfile(&self) -> Result<Lockfile> {
        Lockfile::load(&self.lockfile_path())
    }

    /// First resolved record with the given name, if the lock contains
    /// one.
    pub fn parsed_lockfile_spec(&self, name: &str) -> Result<Option<LockedPackage>> {
        Ok(self.parsed_lockfile()?.spec(name).cloned())
    }
}
