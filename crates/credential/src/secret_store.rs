use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use transit_error::{Result, TransitError};
use url::Url;

use crate::resolver::{CredentialResolver, StorageAccountCredential};

/// Naming convention for storage account key secrets: `<account>-key1`.
const ACCOUNT_KEY_SUFFIX: &str = "-key1";

#[derive(Debug, Deserialize)]
struct SecretValue {
    value: String,
}

/// Resolves the destination credential from a secret store over HTTP.
///
/// The store is expected to expose `GET /secrets` (JSON array of secret
/// names) and `GET /secrets/{name}` (`{"value": "…"}`). The first name
/// ending in `-key1` wins; the account name is the name with the suffix
/// stripped, and the endpoint comes from the cloud endpoint template.
pub struct SecretStoreResolver {
    client: reqwest::Client,
    base: Url,
    vault: String,
    endpoint_template: String,
}

impl SecretStoreResolver {
    pub fn new(
        base: Url,
        vault: String,
        endpoint_template: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            vault,
            endpoint_template,
        })
    }

    fn secrets_url(&self, name: Option<&str>) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        match name {
            Some(name) => format!("{base}/secrets/{name}"),
            None => format!("{base}/secrets"),
        }
    }

    async fn list_secret_names(&self) -> Result<Vec<String>> {
        let url = self.secrets_url(None);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TransitError::assertion(
                format!("secret store listing returned status {}", response.status().as_u16()),
                url,
            ));
        }
        Ok(response.json().await?)
    }

    async fn fetch_secret(&self, name: &str) -> Result<String> {
        let url = self.secrets_url(Some(name));
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TransitError::credential_not_found(
                &self.vault,
                name.to_owned(),
            ));
        }
        let secret: SecretValue = response.json().await?;
        Ok(secret.value)
    }
}

#[async_trait]
impl CredentialResolver for SecretStoreResolver {
    async fn resolve(&self) -> Result<StorageAccountCredential> {
        let names = self.list_secret_names().await?;

        // First account with a key in the store, per the naming convention.
        let key_secret = names
            .iter()
            .find(|name| name.ends_with(ACCOUNT_KEY_SUFFIX))
            .ok_or_else(|| {
                TransitError::credential_not_found(&self.vault, format!("*{ACCOUNT_KEY_SUFFIX}"))
            })?;

        let account_key = self.fetch_secret(key_secret).await?;
        let account_name = key_secret.trim_end_matches(ACCOUNT_KEY_SUFFIX).to_owned();
        let endpoint = self.endpoint_template.replace("{account}", &account_name);

        debug!(vault = %self.vault, account = %account_name, "resolved storage account credential");

        Ok(StorageAccountCredential::new(
            account_name,
            account_key,
            endpoint,
        ))
    }

    fn source_name(&self) -> &'static str {
        "secret-store"
    }
}
