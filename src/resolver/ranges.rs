//! Requirement handling for the solver.

use pubgrub::Range;
use semver::Version;

use crate::core::{Op, Requirement};

/// Convert a requirement list to a single solver range. All requirements
/// must hold, so the ranges intersect; an empty list is unconstrained.
pub fn requirements_to_range(requirements: &[Requirement]) -> Range<Version> {
    let mut range = Range::full();

    for req in requirements {
        range = range.intersection(&requirement_to_range(req));
    }

    range
}

/// Convert a single requirement to a solver range.
fn requirement_to_range(req: &Requirement) -> Range<Version> {
    let version = req.version();

    match req.op() {
        Op::Exact => Range::singleton(version),

        Op::Greater => Range::strictly_higher_than(version),

        Op::GreaterEq => Range::higher_than(version),

        Op::Less => Range::strictly_lower_than(version),

        Op::LessEq => {
            // <= x.y.z means < x.y.(z + 1)
            let next = Version::new(version.major, version.minor, version.patch + 1);
            Range::strictly_lower_than(next)
        }

        Op::Pessimistic => Range::between(version, req.pessimistic_upper()),
    }
}
