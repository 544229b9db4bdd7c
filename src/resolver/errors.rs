//! Resolution error taxonomy.
//!
//! These errors propagate to the caller untranslated so tests can assert
//! on the real failure, not a harness-flavored rewording.

use thiserror::Error;

/// Error during dependency resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No version of the package exists in the session index.
    #[error("could not find package `{package}` in any of the sources")]
    PackageNotFound { package: String },

    /// The solver proved the requirements unsatisfiable. The report is
    /// the solver's own derivation, verbatim.
    #[error("version solving failed:\n{report}")]
    NoSolution { report: String },

    /// Unexpected solver failure.
    #[error("dependency resolution error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ResolveError::PackageNotFound {
            package: "foo".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not find package `foo` in any of the sources"
        );
    }
}
