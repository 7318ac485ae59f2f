//! DashScope client implementation

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use super::types::{CompletionRequest, CompletionResponse};
use crate::config::DashScopeConfig;
use crate::providers::{ProviderError, ProviderResult};

/// Result of a successful HTTP exchange with DashScope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The provider returned generated text at `output.text`.
    Text(String),
    /// The payload parsed as JSON but carried no text output; the raw value
    /// is echoed back to the caller for diagnosis.
    Unrecognized(Value),
}

/// Single-shot application completion client with a bounded wait.
pub struct DashScopeClient {
    http: Client,
    config: DashScopeConfig,
}

impl DashScopeClient {
    /// Create a new DashScope client.
    pub fn new(config: DashScopeConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { http, config })
    }

    /// The configured bounded wait in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.config.timeout_secs
    }

    /// Issue a single-turn completion request.
    ///
    /// The per-request timeout covers the whole exchange and aborts the
    /// outbound call when it elapses, mapping to [`ProviderError::Timeout`].
    /// Non-success statuses capture the provider's `x-request-id` header for
    /// correlation before mapping to [`ProviderError::Upstream`].
    pub async fn complete(&self, prompt: &str) -> ProviderResult<CompletionOutcome> {
        let request_id = Uuid::new_v4();
        let url = format!(
            "{}/apps/{}/completion",
            self.config.base_url, self.config.app_id
        );

        debug!(
            %request_id,
            url = %url,
            api_key = %self.config.api_key.partial_redact(),
            "sending DashScope completion"
        );

        let response = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .bearer_auth(self.config.api_key.expose_secret())
            .header("Accept", "application/json")
            .json(&CompletionRequest::new(prompt))
            .send()
            .await?;

        let status = response.status();
        debug!(%request_id, status = status.as_u16(), "DashScope responded");

        if !status.is_success() {
            let upstream_request_id = response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(
                %request_id,
                status = status.as_u16(),
                upstream_request_id = upstream_request_id.as_deref().unwrap_or("-"),
                body = %body,
                "DashScope completion failed"
            );
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: body,
                request_id: upstream_request_id,
            });
        }

        let raw: Value = response.json().await?;

        match serde_json::from_value::<CompletionResponse>(raw.clone()) {
            Ok(parsed) => {
                let text = parsed
                    .output
                    .and_then(|o| o.text)
                    .filter(|t| !t.is_empty());
                match text {
                    Some(text) => Ok(CompletionOutcome::Text(text)),
                    None => Ok(CompletionOutcome::Unrecognized(raw)),
                }
            }
            Err(_) => Ok(CompletionOutcome::Unrecognized(raw)),
        }
    }
}
