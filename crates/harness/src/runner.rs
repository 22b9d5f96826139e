use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use transit_error::{Result, TransitError};
use url::Url;

/// Description attached to every triggered blob-transfer scenario.
pub const TRANSFER_DESCRIPTION: &str = "Cross-connector blob transfer";

/// Everything the external job runner needs to execute one transfer
/// scenario. The destination account is an explicit field — never ambient
/// process state — so setup order cannot influence the trigger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferScenario {
    pub name: String,
    pub description: String,
    pub destination_account: String,
}

impl TransferScenario {
    /// The standard blob-transfer scenario targeting `destination_account`.
    pub fn blob_transfer(destination_account: impl Into<String>) -> Self {
        Self {
            name: "blob-transfer".into(),
            description: TRANSFER_DESCRIPTION.into(),
            destination_account: destination_account.into(),
        }
    }
}

/// Seam between the harness and the external job-execution facility. The
/// call is synchronous from the harness's point of view; the underlying
/// transfer is asynchronous and eventually consistent, which is why
/// discovery polls afterwards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScenarioRunner: Send + Sync {
    async fn run(&self, scenario: &TransferScenario) -> Result<()>;
}

/// Runner that POSTs the scenario to a job-runner endpoint.
#[derive(Debug, Clone)]
pub struct HttpScenarioRunner {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpScenarioRunner {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ScenarioRunner for HttpScenarioRunner {
    async fn run(&self, scenario: &TransferScenario) -> Result<()> {
        info!(scenario = %scenario.name, destination = %scenario.destination_account, "triggering transfer scenario");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(scenario)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransitError::assertion(
                format!(
                    "scenario runner returned status {} for `{}`",
                    response.status().as_u16(),
                    scenario.name
                ),
                self.endpoint.to_string(),
            ));
        }
        Ok(())
    }
}
