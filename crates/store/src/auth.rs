use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use transit_error::{Result, TransitError};

type HmacSha256 = Hmac<Sha256>;

/// Signs blob store requests with the account's shared key.
///
/// The canonical string is `VERB \n x-ms-date \n /account/resource`; the
/// signature is the base64 HMAC-SHA256 of that string under the
/// base64-decoded account key.
#[derive(Clone)]
pub struct SharedKeySigner {
    account_name: String,
    mac: HmacSha256,
}

impl SharedKeySigner {
    pub fn new(account_name: impl Into<String>, account_key: &str) -> Result<Self> {
        let account_name = account_name.into();
        let key_bytes = BASE64.decode(account_key).map_err(|e| {
            TransitError::configuration(
                format!("account key for `{account_name}`"),
                format!("not valid base64: {e}"),
            )
        })?;
        let mac = HmacSha256::new_from_slice(&key_bytes).map_err(|e| {
            TransitError::configuration(
                format!("account key for `{account_name}`"),
                format!("unusable as HMAC key: {e}"),
            )
        })?;
        Ok(Self { account_name, mac })
    }

    /// RFC 1123 timestamp for the `x-ms-date` header.
    pub fn date_header() -> String {
        Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
    }

    /// `Authorization` header value for a request.
    ///
    /// `resource_path` is the path below the account root, e.g.
    /// `src-container/text-document.txt`. Infallible: the key was vetted
    /// when the signer was built.
    pub fn authorization(&self, verb: &str, date: &str, resource_path: &str) -> String {
        let canonical = format!(
            "{verb}\n{date}\n/{account}/{resource_path}",
            account = self.account_name
        );
        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        format!("SharedKey {}:{signature}", self.account_name)
    }
}

impl std::fmt::Debug for SharedKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeySigner")
            .field("account_name", &self.account_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn signature_is_deterministic_for_a_fixed_date() {
        let signer = SharedKeySigner::new("providerassets", "a2V5MQ==").unwrap();
        let date = "Sun, 23 Aug 2026 10:00:00 GMT";

        let first = signer.authorization("PUT", date, "src-container");
        let second = signer.authorization("PUT", date, "src-container");

        assert_eq!(first, second);
        assert!(first.starts_with("SharedKey providerassets:"));
    }

    #[test]
    fn signature_is_never_empty() {
        let signer = SharedKeySigner::new("providerassets", "a2V5MQ==").unwrap();

        let value = signer.authorization("HEAD", "Sun, 23 Aug 2026 10:00:00 GMT", "dst");

        let (account, signature) = value
            .strip_prefix("SharedKey ")
            .and_then(|rest| rest.split_once(':'))
            .unwrap();
        assert_eq!(account, "providerassets");
        assert!(!signature.is_empty());
    }

    #[test]
    fn different_resources_sign_differently() {
        let signer = SharedKeySigner::new("providerassets", "a2V5MQ==").unwrap();
        let date = "Sun, 23 Aug 2026 10:00:00 GMT";

        let container = signer.authorization("PUT", date, "src-container");
        let blob = signer.authorization("PUT", date, "src-container/text-document.txt");

        assert_ne!(container, blob);
    }

    #[test]
    fn non_base64_key_is_a_configuration_error() {
        let err = SharedKeySigner::new("providerassets", "not base64!").unwrap_err();
        assert!(err.to_string().contains("providerassets"));
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let signer = SharedKeySigner::new("providerassets", "a2V5MQ==").unwrap();
        assert!(!format!("{signer:?}").contains("a2V5MQ"));
    }
}
