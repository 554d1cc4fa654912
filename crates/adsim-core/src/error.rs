//! Unified error types for the ad-auction simulation engine.
//!
//! This module provides a common error type [`AdsimError`] used across the
//! domain crates. Call sites in the scenario-loading, batch, and CLI crates
//! generally use `anyhow` for file I/O and prefer converting into this type
//! only at the boundary where a caller needs to match on error kind.
//!
//! # Example
//!
//! ```ignore
//! use adsim_core::{AdsimError, AdsimResult};
//!
//! fn validate_scenario(cfg: &str) -> AdsimResult<()> {
//!     if cfg.is_empty() {
//!         return Err(AdsimError::Config("scenario config is empty".into()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all simulation-engine operations.
///
/// There is deliberately no `TransientIO` variant: the engine itself is
/// side-effect-free, so I/O failures are the concern of whichever collaborator
/// (persistence, scenario loading) is performing the I/O.
#[derive(Error, Debug)]
pub enum AdsimError {
    /// Malformed or out-of-range scenario configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Violation of an engine invariant (e.g. `clicks > impressions`).
    #[error("domain error: {0}")]
    Domain(String),

    /// Host-imposed resource limit (memory, wall clock) hit mid-run.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// I/O errors surfaced while the engine's own plumbing touches disk
    /// (run manifests, scenario files read by the CLI/batch layers).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors, for wrapping external failures that don't fit above.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for `Result<T, AdsimError>`.
pub type AdsimResult<T> = Result<T, AdsimError>;

impl From<anyhow::Error> for AdsimError {
    fn from(err: anyhow::Error) -> Self {
        AdsimError::Other(err.to_string())
    }
}

impl From<String> for AdsimError {
    fn from(s: String) -> Self {
        AdsimError::Other(s)
    }
}

impl From<&str> for AdsimError {
    fn from(s: &str) -> Self {
        AdsimError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for AdsimError {
    fn from(err: serde_json::Error) -> Self {
        AdsimError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AdsimError::Domain("clicks exceeded impressions".into());
        assert!(err.to_string().contains("domain error"));
        assert!(err.to_string().contains("clicks exceeded impressions"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let adsim_err: AdsimError = io_err.into();
        assert!(matches!(adsim_err, AdsimError::Io(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn example_fn() -> AdsimResult<i32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> AdsimResult<()> {
            Err(AdsimError::Config("missing daily_baseline".into()))
        }

        fn outer() -> AdsimResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
