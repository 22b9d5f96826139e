use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use transit_error::Result;

/// A signed, self-contained claim retrieved from an identity hub. The
/// harness only checks presence and identity; claims stay opaque JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiableCredential {
    pub id: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub claims: serde_json::Value,
}

/// Outcome wrapper of an identity hub query. A hub-level failure (protocol
/// error, unexpected status) is a queryable outcome rather than a transport
/// error: callers branch on [`succeeded`](Self::succeeded).
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    content: Option<T>,
    failure: Option<String>,
}

impl<T> QueryResult<T> {
    pub fn success(content: T) -> Self {
        Self {
            content: Some(content),
            failure: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            content: None,
            failure: Some(detail.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.content.is_some()
    }

    /// The retrieved content; `None` when the query failed.
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn failure_detail(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

/// Client for the identity hub's credential query API.
#[derive(Debug, Clone)]
pub struct IdentityHubClient {
    client: reqwest::Client,
}

impl IdentityHubClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Retrieve all verifiable credentials from a hub. An empty list is a
    /// valid success outcome (a freshly provisioned hub holds none).
    pub async fn get_verifiable_credentials(
        &self,
        hub_url: &str,
    ) -> Result<QueryResult<Vec<VerifiableCredential>>> {
        let url = format!("{}/credentials", hub_url.trim_end_matches('/'));
        let response = self.client.get(&url).send().await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Ok(QueryResult::failure(format!(
                "identity hub {url} returned status {status}"
            )));
        }

        let credentials: Vec<VerifiableCredential> = response.json().await?;
        debug!(hub = %url, count = credentials.len(), "retrieved verifiable credentials");
        Ok(QueryResult::success(credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exposes_content() {
        let result = QueryResult::success(vec![1, 2, 3]);
        assert!(result.succeeded());
        assert_eq!(result.content(), Some(&vec![1, 2, 3]));
        assert!(result.failure_detail().is_none());
    }

    #[test]
    fn failure_exposes_detail_only() {
        let result: QueryResult<Vec<VerifiableCredential>> =
            QueryResult::failure("identity hub returned status 500");
        assert!(!result.succeeded());
        assert!(result.content().is_none());
        assert_eq!(
            result.failure_detail(),
            Some("identity hub returned status 500")
        );
    }
}
