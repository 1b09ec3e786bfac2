//! HTTP boundary for the final submission.
//!
//! The platform API accepts `POST <base>/signup/{role}` with the merged
//! multi-step body, answering 2xx with the created resource and non-2xx
//! with a `{msg}` envelope. Everything that can go wrong out here comes
//! back as an [`ApiFailure`] so callers can tell a rejection from a dead
//! connection without string matching.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiFailure, ConfigError};
use crate::schema::Role;

/// Created-resource receipt from a successful signup.
#[derive(Debug, Clone)]
pub struct SignupReceipt {
    /// Server-assigned id (`_id` on the document-store API, `id` otherwise).
    pub id: Option<String>,
    /// Full response body, for callers that need more than the id.
    pub body: serde_json::Value,
}

impl SignupReceipt {
    /// Build a receipt from a created-resource body.
    pub fn from_body(body: serde_json::Value) -> Self {
        let id = body
            .get("_id")
            .or_else(|| body.get("id"))
            .and_then(|v| v.as_str())
            .map(String::from);
        Self { id, body }
    }
}

/// Transport seam for the assembler's single outbound request.
#[async_trait]
pub trait SubmitTransport: Send + Sync {
    /// Perform one signup POST for `role` with the merged `body`.
    async fn submit(
        &self,
        role: Role,
        body: &serde_json::Value,
    ) -> Result<SignupReceipt, ApiFailure>;
}

/// Error envelope the API returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    msg: String,
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport from config, applying the submit timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.submit_timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "submit_timeout".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config.api_base_trimmed().to_string(),
        })
    }

    /// URL of a role's signup endpoint.
    fn signup_url(&self, role: Role) -> String {
        format!("{}/signup/{}", self.base_url, role.as_path_segment())
    }
}

#[async_trait]
impl SubmitTransport for HttpTransport {
    async fn submit(
        &self,
        role: Role,
        body: &serde_json::Value,
    ) -> Result<SignupReceipt, ApiFailure> {
        let url = self.signup_url(role);
        debug!(%url, "Submitting signup");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiFailure::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let body: serde_json::Value =
                resp.json().await.map_err(|e| ApiFailure::InvalidBody {
                    status: status.as_u16(),
                    detail: e.to_string(),
                })?;
            return Ok(SignupReceipt::from_body(body));
        }

        // Non-2xx: prefer the API's own message, fall back to status text
        // when the envelope is missing or malformed.
        let msg = match resp.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.msg,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(ApiFailure::Rejected {
            status: status.as_u16(),
            msg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn receipt_prefers_the_document_store_id() {
        let receipt = SignupReceipt::from_body(json!({
            "_id": "64a1f0c2e5b4a21d3c9d4e7f",
            "fullName": "Dr. A",
        }));
        assert_eq!(receipt.id.as_deref(), Some("64a1f0c2e5b4a21d3c9d4e7f"));
    }

    #[test]
    fn receipt_falls_back_to_plain_id() {
        let receipt = SignupReceipt::from_body(json!({"id": "42"}));
        assert_eq!(receipt.id.as_deref(), Some("42"));
    }

    #[test]
    fn receipt_without_an_id_still_keeps_the_body() {
        let receipt = SignupReceipt::from_body(json!({"ok": true}));
        assert_eq!(receipt.id, None);
        assert_eq!(receipt.body["ok"], true);
    }

    #[test]
    fn signup_urls_are_built_per_role() {
        let config = ClientConfig {
            api_base: "https://api.example.org/api/".to_string(),
            ..Default::default()
        };
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(
            transport.signup_url(Role::Doctor),
            "https://api.example.org/api/signup/doctor"
        );
        assert_eq!(
            transport.signup_url(Role::Patient),
            "https://api.example.org/api/signup/patient"
        );
    }
}
