//! Streaming chat endpoint
//!
//! Orchestrates the prompt loader, the DeepSeek client and the stream
//! relay. Prompts are re-read on every request so they can be edited
//! without a restart. The user prompt, when configured, is appended to the
//! final user turn rather than replacing it.

use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use crate::config::DeepSeekConfig;
use crate::prompts::PromptSet;
use crate::protocol::{ChatRequest, Message, Role};
use crate::providers::deepseek::types::CompletionRequest;
use crate::providers::ProviderError;
use crate::relay::relay_stream;
use crate::server::Response;

/// Fixed sampling temperature for chat completions.
const TEMPERATURE: f32 = 0.7;

pub(crate) async fn handle(state: &AppState, body: &[u8]) -> Response {
    let chat: ChatRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejecting malformed chat request");
            return Response::json(400, &json!({"error": "Messages are required"}));
        }
    };

    if state.config.deepseek.api_key.is_empty() {
        error!("DeepSeek API key is not configured");
        return Response::json(500, &json!({"error": "DEEPSEEK_API_KEY is not configured"}));
    }

    let prompts = PromptSet::load(
        &state.config.system_prompt_path,
        &state.config.user_prompt_path,
    );
    let frame = build_frame(&state.config.deepseek, &prompts, chat);

    match state.deepseek.chat_stream(&frame).await {
        Ok(upstream) => Response::event_stream(relay_stream(upstream)),
        Err(ProviderError::Upstream { status, .. }) => Response::json(
            status,
            &json!({"error": "Failed to get response from DeepSeek"}),
        ),
        Err(e) => {
            error!(error = %e, "chat completion call failed");
            Response::json(500, &json!({"error": "Internal server error"}))
        }
    }
}

/// Build the provider request frame from the conversation and the loaded
/// prompts: the system prompt is prepended as a `system` turn when present,
/// and the user prompt is appended to the final turn when that turn is a
/// `user` message.
fn build_frame(
    config: &DeepSeekConfig,
    prompts: &PromptSet,
    chat: ChatRequest,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(chat.messages.len() + 1);

    if !prompts.system.is_empty() {
        messages.push(Message::new(Role::System, prompts.system.clone()));
    }

    messages.extend(chat.messages);

    if !prompts.user.is_empty() {
        if let Some(last) = messages.last_mut() {
            if last.role == Role::User {
                last.content = format!("{}\n\n{}", last.content, prompts.user);
            }
        }
    }

    CompletionRequest {
        model: config.model.clone(),
        messages,
        stream: true,
        temperature: TEMPERATURE,
    }
}
