//! Manifest rendering.
//!
//! Renders a declared dependency set into the line-oriented manifest
//! format: one `source` line, one `gem` line per dependency, and an
//! optional trailing `ruby` line.

use crate::core::{Dependency, Op, Requirement, SourceId};

/// Render a requirement list as a quoted, comma-joined argument list.
///
/// An exact requirement renders as the bare version string; every other
/// operator renders verbatim. An empty list renders as nothing.
pub fn requirement_to_string(requirements: &[Requirement]) -> String {
    requirements
        .iter()
        .map(|req| match req.op() {
            Op::Exact => format!("'{}'", req.version_str()),
            _ => format!("'{req}'"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render one `gem` statement.
fn dependency_line(dep: &Dependency) -> String {
    let requirements = requirement_to_string(dep.requirements());
    if requirements.is_empty() {
        format!("gem '{}'", dep.name())
    } else {
        format!("gem '{}', {}", dep.name(), requirements)
    }
}

/// Render a complete manifest.
pub fn render(source: SourceId, dependencies: &[Dependency], ruby_version: Option<&str>) -> String {
    let url = source.url().as_str();
    let url = url.strip_suffix('/').unwrap_or(url);

    let mut out = format!("source '{url}'\n\n");

    for dep in dependencies {
        out.push_str(&dependency_line(dep));
        out.push('\n');
    }

    if let Some(ruby) = ruby_version {
        out.push('\n');
        out.push_str(&format!("ruby '{ruby}'\n"));
    }

    out
}
