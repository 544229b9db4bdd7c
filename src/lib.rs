//! drydock - a deterministic resolver and lockfile fixture harness.
//!
//! This crate lets a test suite simulate a package manifest, a package
//! index, and the resolved-and-locked dependency set that falls out of
//! them, without a network-backed registry anywhere in the loop. It is
//! aimed at tools that consume or post-process lock files and need
//! reproducible "what would the resolver have produced" scenarios.
//!
//! ```no_run
//! use drydock::{Fixture, ResolveOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let bf = Fixture::in_dir("/tmp/drydock-example")?;
//!
//! let lockfile = bf.create_lockfile(
//!     ResolveOptions::new(vec![bf.create_dependency("foo", &[])?]).source_specs(vec![
//!         bf.create_spec("foo", "1.0.0", &[("bar", ">= 1.0.4")])?,
//!         bf.create_spec("bar", "1.2.4", &[])?,
//!     ]),
//! )?;
//!
//! assert_eq!(lockfile.spec("bar").unwrap().version, "1.2.4");
//! bf.clean_up()?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod definition;
pub mod fixture;
pub mod index;
pub mod manifest;
pub mod resolver;
pub mod sources;
pub mod util;

pub use crate::core::{Dependency, PackageId, Requirement, SourceId, Spec};
pub use crate::definition::{Definition, Update};
pub use crate::fixture::{Fixture, ResolveOptions};
pub use crate::index::Index;
pub use crate::resolver::{Capabilities, LockedPackage, Lockfile, Resolve, ResolveError};
pub use crate::sources::SourceMap;
