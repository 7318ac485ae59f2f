//! DeepSeek client implementation

use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, error};
use uuid::Uuid;

use super::types::CompletionRequest;
use crate::config::DeepSeekConfig;
use crate::providers::{ProviderError, ProviderResult};

/// Streaming chat-completions client.
///
/// The underlying client sets a connect timeout but no overall request
/// timeout: the SSE body stays open for as long as the model generates.
pub struct DeepSeekClient {
    http: Client,
    config: DeepSeekConfig,
}

impl DeepSeekClient {
    /// Create a new DeepSeek client.
    pub fn new(config: DeepSeekConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { http, config })
    }

    /// Issue a streaming chat-completions request.
    ///
    /// On success returns the raw upstream SSE body as a byte stream for the
    /// relay to decode. A non-success status is logged with the full provider
    /// body and mapped to [`ProviderError::Upstream`] so the endpoint can
    /// pass the status through.
    pub async fn chat_stream(
        &self,
        request: &CompletionRequest,
    ) -> ProviderResult<BoxStream<'static, Result<Bytes, reqwest::Error>>> {
        let request_id = Uuid::new_v4();
        let url = format!("{}/chat/completions", self.config.base_url);

        debug!(
            %request_id,
            url = %url,
            model = %request.model,
            api_key = %self.config.api_key.partial_redact(),
            "sending streaming chat completion"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(
                %request_id,
                status = status.as_u16(),
                body = %body,
                "DeepSeek chat completion failed"
            );
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: body,
                request_id: None,
            });
        }

        Ok(response.bytes_stream().boxed())
    }
}
