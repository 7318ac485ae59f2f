//! Single-shot chat endpoint
//!
//! Forwards only the newest user turn to DashScope; the provider is
//! single-turn only and receives no conversation history. With no user
//! turn at all, a fixed default greeting is sent instead.

use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use crate::protocol::ChatRequest;
use crate::providers::dashscope::CompletionOutcome;
use crate::providers::ProviderError;
use crate::server::Response;

/// Prompt used when the conversation contains no user turn.
const DEFAULT_PROMPT: &str = "你好";

pub(crate) async fn handle(state: &AppState, body: &[u8]) -> Response {
    let chat: ChatRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejecting malformed chat request");
            return Response::json(400, &json!({"error": "Messages are required"}));
        }
    };

    if state.config.dashscope.api_key.is_empty() {
        error!("DashScope API key is not configured");
        return Response::json(
            500,
            &json!({"error": "DASHSCOPE_API_KEY is not configured"}),
        );
    }

    let prompt = chat.last_user_content().unwrap_or(DEFAULT_PROMPT);

    match state.dashscope.complete(prompt).await {
        Ok(CompletionOutcome::Text(text)) => Response::json(200, &json!({"content": text})),
        Ok(CompletionOutcome::Unrecognized(raw)) => {
            error!(response = %raw, "DashScope payload carried no text output");
            Response::json(
                500,
                &json!({
                    "error": "No text output from DashScope",
                    "response": raw,
                }),
            )
        }
        Err(ProviderError::Timeout) => Response::json(
            504,
            &json!({
                "error": "DashScope API request timed out",
                "message": format!(
                    "The API did not respond within {} seconds",
                    state.dashscope.timeout_secs()
                ),
            }),
        ),
        Err(ProviderError::Upstream {
            status,
            message,
            request_id,
        }) => Response::json(
            status,
            &json!({
                "error": "Failed to get response from DashScope",
                "status": status,
                "request_id": request_id,
                "details": message,
            }),
        ),
        Err(e) => {
            error!(error = %e, "DashScope call failed");
            Response::json(
                500,
                &json!({
                    "error": "Internal server error",
                    "message": e.to_string(),
                }),
            )
        }
    }
}
