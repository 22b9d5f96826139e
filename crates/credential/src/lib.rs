//! Storage-account credential resolution for the Transit harness.
//!
//! A run needs exactly one destination credential triple
//! (`account name`, `account key`, `endpoint`). Where it comes from depends
//! on the configured [`ResourceMode`](transit_config::ResourceMode):
//!
//! - **Cloud**: the secret store is listed for the first secret whose name
//!   follows the `<account>-key1` convention; the secret value is the
//!   account key and the account name is derived by stripping the suffix.
//! - **Local**: fixed emulator accounts from the configuration.
//!
//! Both variants sit behind the [`CredentialResolver`] trait so the
//! verification flow stays mode-agnostic. Resolution is idempotent: the
//! same store state yields the same triple on every call.

mod resolver;
mod secret_store;

pub use resolver::{CredentialResolver, StaticResolver, StorageAccountCredential};
pub use secret_store::SecretStoreResolver;

use transit_config::{HarnessConfig, ResourceMode};
use transit_error::{Result, TransitError};

/// Build the destination-credential resolver matching the configured mode.
pub fn resolver_for(config: &HarnessConfig) -> Result<Box<dyn CredentialResolver>> {
    match &config.mode {
        ResourceMode::Cloud { key_vault } => {
            let base = config.secret_store_url.clone().ok_or_else(|| {
                TransitError::configuration("secret_store_url", "required in cloud mode")
            })?;
            Ok(Box::new(SecretStoreResolver::new(
                base,
                key_vault.clone(),
                config.cloud_endpoint_template.clone(),
                config.client_timeout,
            )?))
        }
        ResourceMode::Local => Ok(Box::new(StaticResolver::destination(&config.local))),
    }
}
