use std::time::Duration;

use serde::{Deserialize, Serialize};
use transit_error::{Result, TransitError};
use url::Url;

/// Selects cloud or local resource provisioning for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ResourceMode {
    /// Destination credentials come from a secret store (`key_vault` names
    /// the store holding the storage account key secrets).
    Cloud { key_vault: String },
    /// Fixed emulator accounts; the harness also seeds the source side.
    Local,
}

impl ResourceMode {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

/// A fixed account name + shared key, used in local mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAccount {
    pub name: String,
    pub key: String,
}

/// The two emulator accounts of a local run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAccounts {
    pub source: StaticAccount,
    pub destination: StaticAccount,
    /// Endpoint template with an `{account}` placeholder.
    pub endpoint_template: String,
}

impl LocalAccounts {
    pub fn endpoint_for(&self, account: &str) -> String {
        self.endpoint_template.replace("{account}", account)
    }
}

impl Default for LocalAccounts {
    fn default() -> Self {
        Self {
            source: StaticAccount {
                name: "providerassets".into(),
                key: "key1".into(),
            },
            destination: StaticAccount {
                name: "consumereuassets".into(),
                key: "key2".into(),
            },
            endpoint_template: LOCAL_BLOB_STORE_ENDPOINT_TEMPLATE.into(),
        }
    }
}

/// Bounds for the destination-descriptor discovery poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollBudget {
    pub max_attempts: usize,
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for PollBudget {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

const USE_CLOUD_RESOURCES: &str = "TRANSIT_USE_CLOUD_RESOURCES";
const KEY_VAULT: &str = "TRANSIT_KEY_VAULT";
const MANAGEMENT_URL: &str = "TRANSIT_MANAGEMENT_URL";
const API_KEY: &str = "TRANSIT_API_KEY";
const RUNNER_URL: &str = "TRANSIT_RUNNER_URL";
const SECRET_STORE_URL: &str = "TRANSIT_SECRET_STORE_URL";
const HUB_PORTS: &str = "TRANSIT_HUB_PORTS";

const BLOB_STORE_ENDPOINT_TEMPLATE: &str = "https://{account}.blob.core.windows.net";
const LOCAL_BLOB_STORE_ENDPOINT_TEMPLATE: &str = "http://127.0.0.1:10000/{account}";
const HUB_URL_FORMAT: &str = "http://localhost:{port}/api/identity-hub";

/// Connect/read timeout applied to every HTTP client unless overridden.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything a verification run needs, resolved at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(flatten)]
    pub mode: ResourceMode,
    pub management_url: Url,
    pub api_key: String,
    pub runner_url: Url,
    /// Secret store base URL; required in cloud mode.
    pub secret_store_url: Option<Url>,
    /// Endpoint template for cloud storage accounts (`{account}` placeholder).
    pub cloud_endpoint_template: String,
    pub local: LocalAccounts,
    pub hub_ports: Vec<u16>,
    pub poll: PollBudget,
    /// Connect/read timeout for every HTTP client.
    #[serde(with = "humantime_serde")]
    pub client_timeout: Duration,
}

impl HarnessConfig {
    /// Resolve the full configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let use_cloud = parse_bool(USE_CLOUD_RESOURCES, true)?;

        let mode = if use_cloud {
            ResourceMode::Cloud {
                key_vault: required_prop_or_env(KEY_VAULT, None)?,
            }
        } else {
            ResourceMode::Local
        };

        let secret_store_url = match &mode {
            ResourceMode::Cloud { .. } => {
                Some(parse_url(SECRET_STORE_URL, required_prop_or_env(SECRET_STORE_URL, None)?)?)
            }
            ResourceMode::Local => match std::env::var(SECRET_STORE_URL) {
                Ok(v) => Some(parse_url(SECRET_STORE_URL, v)?),
                Err(_) => None,
            },
        };

        let config = Self {
            mode,
            management_url: parse_url(
                MANAGEMENT_URL,
                required_prop_or_env(MANAGEMENT_URL, Some("http://localhost:9192/api/v1/data"))?,
            )?,
            api_key: required_prop_or_env(API_KEY, Some("password"))?,
            runner_url: parse_url(
                RUNNER_URL,
                required_prop_or_env(RUNNER_URL, Some("http://localhost:8083/scenarios"))?,
            )?,
            secret_store_url,
            cloud_endpoint_template: BLOB_STORE_ENDPOINT_TEMPLATE.into(),
            local: LocalAccounts::default(),
            hub_ports: parse_hub_ports()?,
            poll: PollBudget::default(),
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
        };
        config.validate()?;
        Ok(config)
    }

    /// A ready-made local-mode configuration, useful for tests and for runs
    /// against the blob store emulator. URLs must still be valid.
    pub fn local(management_url: Url, runner_url: Url) -> Self {
        Self {
            mode: ResourceMode::Local,
            management_url,
            api_key: "password".into(),
            runner_url,
            secret_store_url: None,
            cloud_endpoint_template: BLOB_STORE_ENDPOINT_TEMPLATE.into(),
            local: LocalAccounts::default(),
            hub_ports: vec![8181, 8182, 8183],
            poll: PollBudget::default(),
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
        }
    }

    /// Endpoint of a cloud storage account.
    pub fn cloud_endpoint_for(&self, account: &str) -> String {
        self.cloud_endpoint_template.replace("{account}", account)
    }

    /// Identity hub base URLs derived from the configured port set.
    pub fn hub_urls(&self) -> Vec<String> {
        self.hub_ports
            .iter()
            .map(|port| HUB_URL_FORMAT.replace("{port}", &port.to_string()))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.poll.max_attempts == 0 {
            return Err(TransitError::configuration(
                "poll.max_attempts",
                "must be at least 1",
            ));
        }
        if self.poll.base_delay > self.poll.max_delay {
            return Err(TransitError::configuration(
                "poll.base_delay",
                "must not exceed poll.max_delay",
            ));
        }
        if matches!(self.mode, ResourceMode::Cloud { .. }) && self.secret_store_url.is_none() {
            return Err(TransitError::configuration(
                SECRET_STORE_URL,
                "required in cloud mode",
            ));
        }
        Ok(())
    }
}

/// Environment lookup with an optional default; absence without a default is
/// a configuration error naming the variable.
pub fn required_prop_or_env(key: &str, default: Option<&str>) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => default.map(str::to_owned).ok_or_else(|| {
            TransitError::configuration(key, "required environment value is not set")
        }),
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<bool>()
            .map_err(|_| TransitError::configuration(key, format!("`{value}` is not a boolean"))),
        Err(_) => Ok(default),
    }
}

fn parse_url(key: &str, value: String) -> Result<Url> {
    Url::parse(&value)
        .map_err(|e| TransitError::configuration(key, format!("`{value}` is not a valid URL: {e}")))
}

/// Identity hub base URLs resolved from the environment alone, for commands
/// that never touch the transfer side of the configuration. A malformed
/// port list is a configuration error, never silently defaulted.
pub fn hub_urls_from_env() -> Result<Vec<String>> {
    Ok(parse_hub_ports()?
        .iter()
        .map(|port| HUB_URL_FORMAT.replace("{port}", &port.to_string()))
        .collect())
}

fn parse_hub_ports() -> Result<Vec<u16>> {
    match std::env::var(HUB_PORTS) {
        Ok(raw) => raw
            .split(',')
            .map(|p| {
                p.trim().parse::<u16>().map_err(|_| {
                    TransitError::configuration(HUB_PORTS, format!("`{p}` is not a port"))
                })
            })
            .collect(),
        Err(_) => Ok(vec![8181, 8182, 8183]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn local_endpoint_substitutes_account() {
        let accounts = LocalAccounts::default();
        assert_eq!(
            accounts.endpoint_for("providerassets"),
            "http://127.0.0.1:10000/providerassets"
        );
    }

    #[test]
    fn hub_urls_cover_the_port_set() {
        let config = HarnessConfig::local(
            Url::parse("http://localhost:9192/api/v1/data").unwrap(),
            Url::parse("http://localhost:8083/scenarios").unwrap(),
        );
        assert_eq!(
            config.hub_urls(),
            vec![
                "http://localhost:8181/api/identity-hub",
                "http://localhost:8182/api/identity-hub",
                "http://localhost:8183/api/identity-hub",
            ]
        );
    }

    #[test]
    fn required_env_without_default_is_a_configuration_error() {
        let err = required_prop_or_env("TRANSIT_TEST_UNSET_VALUE", None).unwrap_err();
        assert!(matches!(err, TransitError::Configuration { .. }));
        assert!(err.to_string().contains("TRANSIT_TEST_UNSET_VALUE"));
    }

    #[test]
    fn default_applies_when_env_is_absent() {
        let value = required_prop_or_env("TRANSIT_TEST_UNSET_VALUE", Some("fallback")).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn env_overrides_default() {
        // Unique variable name per test; the process environment is shared.
        unsafe { std::env::set_var("TRANSIT_TEST_OVERRIDE_VALUE", "from-env") };
        let value = required_prop_or_env("TRANSIT_TEST_OVERRIDE_VALUE", Some("fallback")).unwrap();
        assert_eq!(value, "from-env");
        unsafe { std::env::remove_var("TRANSIT_TEST_OVERRIDE_VALUE") };
    }

    #[test]
    fn zero_poll_attempts_fail_validation() {
        let mut config = HarnessConfig::local(
            Url::parse("http://localhost:9192/api/v1/data").unwrap(),
            Url::parse("http://localhost:8083/scenarios").unwrap(),
        );
        config.poll.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn cloud_mode_requires_a_secret_store_url() {
        let mut config = HarnessConfig::local(
            Url::parse("http://localhost:9192/api/v1/data").unwrap(),
            Url::parse("http://localhost:8083/scenarios").unwrap(),
        );
        config.mode = ResourceMode::Cloud {
            key_vault: "consumer-eu".into(),
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TRANSIT_SECRET_STORE_URL"));
    }

    #[test]
    fn hub_urls_from_env_rejects_a_malformed_port_list() {
        // One test owns this variable; the process environment is shared.
        unsafe { std::env::set_var("TRANSIT_HUB_PORTS", "81x1,8182") };
        let err = hub_urls_from_env().unwrap_err();
        assert!(matches!(err, TransitError::Configuration { .. }));
        assert!(err.to_string().contains("81x1"), "got: {err}");

        unsafe { std::env::set_var("TRANSIT_HUB_PORTS", "9001, 9002") };
        let urls = hub_urls_from_env().unwrap();
        assert_eq!(
            urls,
            vec![
                "http://localhost:9001/api/identity-hub",
                "http://localhost:9002/api/identity-hub",
            ]
        );
        unsafe { std::env::remove_var("TRANSIT_HUB_PORTS") };
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = HarnessConfig::local(
            Url::parse("http://localhost:9192/api/v1/data").unwrap(),
            Url::parse("http://localhost:8083/scenarios").unwrap(),
        );
        let json = serde_json::to_string(&config).unwrap();
        let back: HarnessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mode, ResourceMode::Local);
        assert_eq!(back.client_timeout, Duration::from_secs(60));
    }
}
