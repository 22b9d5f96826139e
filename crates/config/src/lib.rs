//! Startup configuration for the Transit verification harness.
//!
//! Everything is resolved once, before the first network call: mode flag,
//! endpoints, API key, poll budget. There is no runtime reconfiguration —
//! a [`HarnessConfig`] is immutable for the lifetime of a run.
//!
//! Resolution order per value: explicit environment variable, then the
//! built-in default where one exists. A required value with no default
//! fails with `TransitError::Configuration` naming the variable.

mod settings;

pub use settings::{
    DEFAULT_CLIENT_TIMEOUT, HarnessConfig, LocalAccounts, PollBudget, ResourceMode, StaticAccount,
    hub_urls_from_env, required_prop_or_env,
};

/// Header carrying the management API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Collection path of the transfer-process listing on the management API.
pub const TRANSFER_PROCESSES_PATH: &str = "transferprocesses";

/// Name of the artifact seeded on the provider side and expected on the
/// consumer side after a successful transfer.
pub const PROVIDER_ASSET_FILE: &str = "text-document.txt";

/// Name of the source container seeded in local mode. Must not exist before
/// a run starts.
pub const PROVIDER_CONTAINER_NAME: &str = "src-container";
