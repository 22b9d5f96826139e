use std::time::Duration;

use tracing::debug;
use transit_credential::StorageAccountCredential;
use transit_error::{Result, TransitError};

use crate::auth::SharedKeySigner;

/// Container + blob operations against one storage account.
#[derive(Debug, Clone)]
pub struct BlobStoreClient {
    client: reqwest::Client,
    endpoint: String,
    signer: SharedKeySigner,
    account_name: String,
}

impl BlobStoreClient {
    /// Build a client for the account the credential addresses.
    pub fn new(credential: &StorageAccountCredential, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: credential.endpoint.trim_end_matches('/').to_owned(),
            signer: SharedKeySigner::new(&credential.account_name, &credential.account_key)?,
            account_name: credential.account_name.clone(),
        })
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Address of a container, used in failure messages.
    pub fn container_url(&self, container: &str) -> String {
        format!("{}/{container}", self.endpoint)
    }

    /// Address of a blob, used in failure messages.
    pub fn blob_url(&self, container: &str, blob: &str) -> String {
        format!("{}/{container}/{blob}", self.endpoint)
    }

    /// Create a fresh container. Fails with a precondition violation when the
    /// container already exists — a run requires a clean source.
    pub async fn create_container(&self, container: &str) -> Result<()> {
        if self.container_exists(container).await? {
            return Err(TransitError::precondition(
                self.container_url(container),
                "container already exists; a fresh container is required",
            ));
        }

        let url = format!("{}?restype=container", self.container_url(container));
        let response = self.signed(reqwest::Method::PUT, &url, container).send().await?;
        if !response.status().is_success() {
            return Err(TransitError::assertion(
                format!("container creation returned status {}", response.status().as_u16()),
                self.container_url(container),
            ));
        }
        debug!(container, account = %self.account_name, "created container");
        Ok(())
    }

    pub async fn container_exists(&self, container: &str) -> Result<bool> {
        let url = format!("{}?restype=container", self.container_url(container));
        self.exists(&url, container).await
    }

    /// Best-effort delete; an already-absent container is not an error.
    pub async fn delete_container(&self, container: &str) -> Result<()> {
        let url = format!("{}?restype=container", self.container_url(container));
        let response = self
            .signed(reqwest::Method::DELETE, &url, container)
            .send()
            .await?;
        if !response.status().is_success() && response.status().as_u16() != 404 {
            return Err(TransitError::assertion(
                format!("container deletion returned status {}", response.status().as_u16()),
                self.container_url(container),
            ));
        }
        debug!(container, account = %self.account_name, "deleted container");
        Ok(())
    }

    /// Upload a block blob, overwriting any existing content.
    pub async fn upload_blob(&self, container: &str, blob: &str, body: Vec<u8>) -> Result<()> {
        let url = self.blob_url(container, blob);
        let resource = format!("{container}/{blob}");
        let response = self
            .signed(reqwest::Method::PUT, &url, &resource)
            .header("x-ms-blob-type", "BlockBlob")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TransitError::assertion(
                format!("blob upload returned status {}", response.status().as_u16()),
                url,
            ));
        }
        debug!(container, blob, account = %self.account_name, "uploaded blob");
        Ok(())
    }

    pub async fn blob_exists(&self, container: &str, blob: &str) -> Result<bool> {
        let url = self.blob_url(container, blob);
        let resource = format!("{container}/{blob}");
        self.exists(&url, &resource).await
    }

    fn signed(&self, method: reqwest::Method, url: &str, resource_path: &str) -> reqwest::RequestBuilder {
        let date = SharedKeySigner::date_header();
        let authorization = self.signer.authorization(method.as_str(), &date, resource_path);
        self.client
            .request(method, url)
            .header("x-ms-date", date)
            .header("Authorization", authorization)
    }

    async fn exists(&self, url: &str, resource_path: &str) -> Result<bool> {
        let response = self
            .signed(reqwest::Method::HEAD, url, resource_path)
            .send()
            .await?;
        match response.status().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(TransitError::assertion(
                format!("existence check returned status {status}"),
                url.to_owned(),
            )),
        }
    }
}
