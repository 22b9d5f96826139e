use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use transit_config::{API_KEY_HEADER, TRANSFER_PROCESSES_PATH};
use transit_error::{Result, TransitError};
use url::Url;

/// One entry of the management API's transfer-process listing. Only the
/// destination container is consumed; everything else stays opaque.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProcess {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub data_destination: Option<DataDestination>,
}

impl TransferProcess {
    /// The provisioned destination container, when the process reports one.
    pub fn destination_container(&self) -> Option<&str> {
        self.data_destination
            .as_ref()
            .and_then(|d| d.properties.get("container"))
            .map(String::as_str)
    }
}

/// Destination descriptor nested in a transfer process.
#[derive(Debug, Clone, Deserialize)]
pub struct DataDestination {
    #[serde(default)]
    pub properties: std::collections::HashMap<String, String>,
}

/// Client for the connector management API.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

impl ManagementClient {
    pub fn new(base: Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            api_key: api_key.into(),
        })
    }

    /// Address of the transfer-process collection, also used in failure
    /// messages.
    pub fn listing_url(&self) -> String {
        format!(
            "{}/{TRANSFER_PROCESSES_PATH}",
            self.base.as_str().trim_end_matches('/')
        )
    }

    /// List transfer processes. A non-200 status is an assertion failure
    /// carrying the status code; no retry happens at this level.
    pub async fn list_transfer_processes(&self) -> Result<Vec<TransferProcess>> {
        let url = self.listing_url();
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(TransitError::assertion(
                format!("transfer process listing returned status {status}, expected 200"),
                url,
            ));
        }

        let processes: Vec<TransferProcess> = response.json().await?;
        debug!(count = processes.len(), "listed transfer processes");
        Ok(processes)
    }
}
