//! The Transit transfer verification harness.
//!
//! One verification run drives a single end-to-end transfer scenario to a
//! verifiable terminal state:
//!
//! 1. **Resolve** the destination storage credential (secret store or local
//!    defaults, behind [`transit_credential::CredentialResolver`]).
//! 2. **Seed** the source side (local mode only): a fresh container plus one
//!    artifact with randomized content, so every run has a distinct identity.
//! 3. **Trigger** the transfer scenario through the [`ScenarioRunner`] seam.
//! 4. **Discover** the provisioned destination container by polling the
//!    management API's transfer-process listing with bounded backoff.
//! 5. **Verify** the destination blob exists, failing with the blob's
//!    address when it does not.
//! 6. **Clean up** every resource the run created, concurrently and
//!    best-effort, on every exit path.
//!
//! The flow is linear; any unmet expectation is terminal. There is no
//! partial-success state.

mod cleanup;
mod hub;
mod management;
mod poll;
mod runner;
mod verifier;

pub use cleanup::CleanupScope;
pub use hub::{IdentityHubClient, QueryResult, VerifiableCredential};
pub use management::{DataDestination, ManagementClient, TransferProcess};
pub use poll::poll_until;
pub use runner::{HttpScenarioRunner, ScenarioRunner, TransferScenario};
pub use verifier::TransferVerifier;
