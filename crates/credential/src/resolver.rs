use std::fmt;

use async_trait::async_trait;
use transit_config::LocalAccounts;
use transit_error::Result;

/// A resolved storage-account credential. Immutable once resolved; lives for
/// one verification run.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageAccountCredential {
    pub account_name: String,
    pub account_key: String,
    pub endpoint: String,
}

impl StorageAccountCredential {
    pub fn new(
        account_name: impl Into<String>,
        account_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

// Manual Debug: the account key must never reach logs or failure messages.
impl fmt::Debug for StorageAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAccountCredential")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Capability seam between the verification flow and the credential source.
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    /// Resolve the credential triple. Fails with `CredentialNotFound` when
    /// the backing store holds no matching entry.
    async fn resolve(&self) -> Result<StorageAccountCredential>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}

/// Fixed-credential resolver used in local mode.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    credential: StorageAccountCredential,
}

impl StaticResolver {
    pub fn new(credential: StorageAccountCredential) -> Self {
        Self { credential }
    }

    /// The local destination account (the one the transfer provisions into).
    pub fn destination(accounts: &LocalAccounts) -> Self {
        Self::new(StorageAccountCredential::new(
            &accounts.destination.name,
            &accounts.destination.key,
            accounts.endpoint_for(&accounts.destination.name),
        ))
    }

    /// The local source account (the one the harness seeds).
    pub fn source(accounts: &LocalAccounts) -> Self {
        Self::new(StorageAccountCredential::new(
            &accounts.source.name,
            &accounts.source.key,
            accounts.endpoint_for(&accounts.source.name),
        ))
    }
}

#[async_trait]
impl CredentialResolver for StaticResolver {
    async fn resolve(&self) -> Result<StorageAccountCredential> {
        Ok(self.credential.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}
