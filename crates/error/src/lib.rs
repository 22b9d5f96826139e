//! Centralized error handling for the Transit verification harness.
//!
//! Every failure in a verification run falls into one of a small number of
//! categories, and all of them are terminal to the run: the harness never
//! retries across an error, it only retries *inside* the discovery poll
//! while the listing is still empty.
//!
//! ## Error Categories
//!
//! - [`TransitError::Configuration`] — a required property or environment
//!   value is absent or malformed. Raised before any network call is made.
//! - [`TransitError::CredentialNotFound`] — the secret store holds no entry
//!   matching the account-key naming convention.
//! - [`TransitError::Precondition`] — a resource that must be fresh already
//!   exists (e.g. the source container before seeding).
//! - [`TransitError::Assertion`] — observed state does not match the
//!   expectation: non-200 listing status, no destination entry within the
//!   poll budget, destination blob absent.
//! - [`TransitError::Http`] — transport-level failure underneath any of the
//!   HTTP clients.
//!
//! Messages always name the resource and the expectation violated, so a
//! failed run reads like a test-framework failure without extra context.

pub mod prelude {
    pub use super::{Result, TransitError};
}

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, TransitError>;

/// Error taxonomy for a verification run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TransitError {
    /// Missing or invalid required property / environment value.
    #[error("configuration error: {key}: {reason}")]
    Configuration { key: String, reason: String },

    /// Secret-store lookup found no entry matching the naming convention.
    #[error("no secret matching `{pattern}` found in secret store `{vault}`")]
    CredentialNotFound { vault: String, pattern: String },

    /// A resource that must be fresh already exists.
    #[error("precondition violated for {resource}: {reason}")]
    Precondition { resource: String, reason: String },

    /// Observed state does not match the expectation.
    #[error("assertion failed: {expectation} ({resource})")]
    Assertion {
        expectation: String,
        resource: String,
    },

    /// Transport-level HTTP failure.
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransitError {
    /// Missing/invalid configuration value.
    pub fn configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Secret-store lookup miss.
    pub fn credential_not_found(vault: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::CredentialNotFound {
            vault: vault.into(),
            pattern: pattern.into(),
        }
    }

    /// A resource that must be fresh already exists.
    pub fn precondition(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Precondition {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Observed state does not match the expectation. `resource` is the
    /// address of whatever was inspected (URL, container, blob).
    pub fn assertion(expectation: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::Assertion {
            expectation: expectation.into(),
            resource: resource.into(),
        }
    }

    /// Whether this is an observed-state mismatch (as opposed to a setup
    /// problem). Used by the harness to decide how to report the failure.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion { .. })
    }

    /// All harness errors are terminal to the run. The discovery poll checks
    /// this before deciding whether an empty listing is worth another pass.
    pub fn is_terminal(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn assertion_message_names_resource_and_expectation() {
        let err = TransitError::assertion(
            "destination blob not created",
            "http://127.0.0.1:10000/consumereuassets/dst/sample-asset.txt",
        );
        assert_eq!(
            err.to_string(),
            "assertion failed: destination blob not created \
             (http://127.0.0.1:10000/consumereuassets/dst/sample-asset.txt)"
        );
        assert!(err.is_assertion());
    }

    #[test]
    fn configuration_message_names_key() {
        let err = TransitError::configuration("TRANSIT_KEY_VAULT", "not set");
        assert_eq!(
            err.to_string(),
            "configuration error: TRANSIT_KEY_VAULT: not set"
        );
        assert!(!err.is_assertion());
    }

    #[test]
    fn credential_miss_names_vault_and_pattern() {
        let err = TransitError::credential_not_found("consumer-eu", "*-key1");
        assert_eq!(
            err.to_string(),
            "no secret matching `*-key1` found in secret store `consumer-eu`"
        );
    }

    #[test]
    fn every_variant_is_terminal() {
        assert!(TransitError::precondition("src-container", "already exists").is_terminal());
        assert!(TransitError::assertion("x", "y").is_terminal());
    }
}
