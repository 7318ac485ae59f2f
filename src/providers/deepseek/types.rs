//! Wire types for the DeepSeek chat-completions API
//!
//! DeepSeek speaks the OpenAI chat-completions format. Only the fields the
//! gateway sends and reads are modeled; everything else is ignored on
//! deserialization.

use serde::{Deserialize, Serialize};

use crate::protocol::Message;

/// A chat-completions request, always sent with `stream: true`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub temperature: f32,
}

/// One decoded SSE chunk of a streaming completion.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    pub choices: Vec<StreamChoice>,
}

/// A streaming choice carrying an incremental delta.
#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    pub delta: Delta,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental fields of the in-progress assistant message.
#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}
