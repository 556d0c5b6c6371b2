//! Talking to the license validation service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tuneup_types::{ActivationKey, Fingerprint, Verdict};

/// What the client learned from one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The key is usable on this machine (`Activated` or `Validated`).
    Valid(Verdict),
    /// The service definitively refused the key for this machine.
    Invalid(Verdict),
    /// The service could not give a definitive answer: timeout, no route,
    /// server error or an unreadable reply.
    Unreachable(String),
}

/// Performs the `check_license` call.
#[async_trait]
pub trait LicenseValidator: Send + Sync {
    async fn check(&self, key: &ActivationKey, fingerprint: &Fingerprint) -> CheckOutcome;
}

/// Settings for reaching the validation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service, without the `/check_license` path.
    pub server_url: String,
    /// Request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 20,
        }
    }
}

#[cfg(feature = "online")]
pub use http::HttpValidator;

#[cfg(feature = "online")]
mod http {
    use super::{CheckOutcome, ClientConfig, LicenseValidator};
    use async_trait::async_trait;
    use reqwest::Client;
    use std::time::Duration;
    use tracing::{debug, warn};
    use tuneup_types::{ActivationKey, CheckResponse, Fingerprint, Verdict};

    /// Validator that calls `GET /check_license` over HTTP.
    pub struct HttpValidator {
        client: Client,
        endpoint: String,
    }

    impl HttpValidator {
        /// Builds a validator with the configured timeout.
        pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()?;
            Ok(Self {
                client,
                endpoint: format!("{}/check_license", config.server_url.trim_end_matches('/')),
            })
        }
    }

    #[async_trait]
    impl LicenseValidator for HttpValidator {
        async fn check(&self, key: &ActivationKey, fingerprint: &Fingerprint) -> CheckOutcome {
            debug!(endpoint = %self.endpoint, "checking license");
            let response = match self
                .client
                .get(&self.endpoint)
                .query(&[("key", key.as_str()), ("hash", fingerprint.as_str())])
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    warn!("license service timed out");
                    return CheckOutcome::Unreachable("request timed out".to_string());
                }
                Err(e) => {
                    warn!(error = %e, "license service unreachable");
                    return CheckOutcome::Unreachable(e.to_string());
                }
            };

            let status = response.status().as_u16();
            match Verdict::from_status(status) {
                Some(Verdict::Validated) => match response.json::<CheckResponse>().await {
                    Ok(body) if body.valid => {
                        let verdict = if body.message == Verdict::Activated.message() {
                            Verdict::Activated
                        } else {
                            Verdict::Validated
                        };
                        CheckOutcome::Valid(verdict)
                    }
                    Ok(body) => {
                        warn!(message = %body.message, "service answered 200 without validating");
                        CheckOutcome::Invalid(Verdict::HashMismatch)
                    }
                    Err(e) => CheckOutcome::Unreachable(format!("malformed response: {e}")),
                },
                Some(v) if v.is_definitive_rejection() => CheckOutcome::Invalid(v),
                Some(v) => CheckOutcome::Unreachable(format!("service answered {status}: {v}")),
                None => CheckOutcome::Unreachable(format!("unexpected status {status}")),
            }
        }
    }
}
