//! Version requirements.
//!
//! A Requirement restricts which versions of a package are acceptable.
//! Requirements use manifest syntax: `= 1.2`, `>= 1.0.9`, `~> 1.0`.
//! A bare version string is shorthand for exact equality.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use thiserror::Error;

/// Error parsing a requirement string.
#[derive(Debug, Error)]
#[error("invalid requirement `{0}`")]
pub struct RequirementError(String);

/// Comparison operator of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `= 1.2.3` (or a bare version string)
    Exact,
    /// `> 1.2.3`
    Greater,
    /// `>= 1.2.3`
    GreaterEq,
    /// `< 1.2.3`
    Less,
    /// `<= 1.2.3`
    LessEq,
    /// `~> 1.2` — at least the given version, below the next release of
    /// the segment above the last one given
    Pessimistic,
}

/// A single version requirement.
///
/// The version part may be partial (`1`, `1.0`); missing segments are
/// treated as zero when comparing, but are preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    op: Op,
    major: u64,
    minor: Option<u64>,
    patch: Option<u64>,
}

impl Requirement {
    /// Create an exact requirement for a full version.
    pub fn exact(version: &Version) -> Self {
        Requirement {
            op: Op::Exact,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
        }
    }

    /// Parse a comma-separated list of requirements: `"~> 1.0, >= 1.0.9"`.
    pub fn parse_list(input: &str) -> Result<Vec<Requirement>, RequirementError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Get the operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The version named by this requirement, zero-padded to three segments.
    ///
    /// For an unconstrained dependency the harness pins `0.0.0`; for
    /// anything else this is the version of the first requirement, which
    /// the index builder uses when synthesizing a missing candidate.
    pub fn version(&self) -> Version {
        Version::new(self.major, self.minor.unwrap_or(0), self.patch.unwrap_or(0))
    }

    /// Check whether a version satisfies this requirement.
    pub fn matches(&self, candidate: &Version) -> bool {
        let version = self.version();
        match self.op {
            Op::Exact => *candidate == version,
            Op::Greater => *candidate > version,
            Op::GreaterEq => *candidate >= version,
            Op::Less => *candidate < version,
            Op::LessEq => *candidate <= version,
            Op::Pessimistic => *candidate >= version && *candidate < self.pessimistic_upper(),
        }
    }

    /// The exclusive upper bound of a `~>` requirement: the next release
    /// of the segment above the last one given.
    pub(crate) fn pessimistic_upper(&self) -> Version {
        match (self.minor, self.patch) {
            (Some(minor), Some(_)) => Version::new(self.major, minor + 1, 0),
            _ => Version::new(self.major + 1, 0, 0),
        }
    }

    /// Render only the version part, without the operator.
    pub fn version_str(&self) -> String {
        let mut out = self.major.to_string();
        if let Some(minor) = self.minor {
            out.push('.');
            out.push_str(&minor.to_string());
        }
        if let Some(patch) = self.patch {
            out.push('.');
            out.push_str(&patch.to_string());
        }
        out
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Exact => "= ",
            Op::Greater => "> ",
            Op::GreaterEq => ">= ",
            Op::Less => "< ",
            Op::LessEq => "<= ",
            Op::Pessimistic => "~> ",
        };
        write!(f, "{}{}", op, self.version_str())
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        let (op, rest) = if let Some(rest) = trimmed.strip_prefix("~>") {
            (Op::Pessimistic, rest)
        } else if let Some(rest) = trimmed.strip_prefix(">=") {
            (Op::GreaterEq, rest)
        } else if let Some(rest) = trimmed.strip_prefix("<=") {
            (Op::LessEq, rest)
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            (Op::Greater, rest)
        } else if let Some(rest) = trimmed.strip_prefix('<') {
            (Op::Less, rest)
        } else if let Some(rest) = trimmed.strip_prefix('=') {
            (Op::Exact, rest)
        } else {
            (Op::Exact, trimmed)
        };

        let (major, minor, patch) =
            parse_segments(rest.trim()).ok_or_else(|| RequirementError(input.to_string()))?;

        Ok(Requirement {
            op,
            major,
            minor,
            patch,
        })
    }
}

fn parse_segments(s: &str) -> Option<(u64, Option<u64>, Option<u64>)> {
    if s.is_empty() {
        return None;
    }

    let mut parts = s.split('.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(p) => Some(p.parse().ok()?),
        None => None,
    };
    let patch = match parts.next() {
        Some(p) => Some(p.parse().ok()?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    Some((major, minor, patch))
}

/// Parse a version string, allowing for incomplete versions (`1`, `1.2`).
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let (major, minor, patch) = parse_segments(s.trim())?;
    Some(Version::new(major, minor.unwrap_or(0), patch.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_version_is_exact() {
        let req: Requirement = "1.2".parse().unwrap();
        assert_eq!(req.op(), Op::Exact);
        assert!(req.matches(&Version::new(1, 2, 0)));
        assert!(!req.matches(&Version::new(1, 2, 1)));
        assert_eq!(req.to_string(), "= 1.2");
    }

    #[test]
    fn test_parse_operators() {
        assert_eq!("> 1".parse::<Requirement>().unwrap().op(), Op::Greater);
        assert_eq!(">= 1".parse::<Requirement>().unwrap().op(), Op::GreaterEq);
        assert_eq!("< 1".parse::<Requirement>().unwrap().op(), Op::Less);
        assert_eq!("<= 1".parse::<Requirement>().unwrap().op(), Op::LessEq);
        assert_eq!("~> 1".parse::<Requirement>().unwrap().op(), Op::Pessimistic);
        assert_eq!("= 1".parse::<Requirement>().unwrap().op(), Op::Exact);
    }

    #[test]
    fn test_pessimistic_two_segments() {
        let req: Requirement = "~> 1.0".parse().unwrap();
        assert!(req.matches(&Version::new(1, 0, 0)));
        assert!(req.matches(&Version::new(1, 9, 3)));
        assert!(!req.matches(&Version::new(2, 0, 0)));
        assert!(!req.matches(&Version::new(0, 9, 9)));
    }

    #[test]
    fn test_pessimistic_three_segments() {
        let req: Requirement = "~> 1.0.9".parse().unwrap();
        assert!(req.matches(&Version::new(1, 0, 9)));
        assert!(req.matches(&Version::new(1, 0, 12)));
        assert!(!req.matches(&Version::new(1, 1, 0)));
    }

    #[test]
    fn test_at_least() {
        let req: Requirement = ">= 1.0.4".parse().unwrap();
        assert!(req.matches(&Version::new(1, 0, 4)));
        assert!(req.matches(&Version::new(3, 2, 0)));
        assert!(!req.matches(&Version::new(1, 0, 3)));
    }

    #[test]
    fn test_parse_list() {
        let reqs = Requirement::parse_list("~> 1.0, >= 1.0.9").unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].to_string(), "~> 1.0");
        assert_eq!(reqs[1].to_string(), ">= 1.0.9");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Requirement>().is_err());
        assert!("one.two".parse::<Requirement>().is_err());
        assert!("1.2.3.4".parse::<Requirement>().is_err());
    }

    #[test]
    fn test_version_extraction() {
        let req: Requirement = ">= 1.0.4".parse().unwrap();
        assert_eq!(req.version(), Version::new(1, 0, 4));

        let req: Requirement = "~> 1.0".parse().unwrap();
        assert_eq!(req.version(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version_lenient("1"), Some(Version::new(1, 0, 0)));
        assert_eq!(parse_version_lenient("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_version_lenient("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version_lenient("nope"), None);
    }
}
