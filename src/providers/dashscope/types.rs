//! Wire types for the DashScope application completion API

use serde::{Deserialize, Serialize};

/// A single-turn application completion request. Only the newest user prompt
/// is forwarded; the provider is single-turn only.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub input: CompletionInput,
    pub parameters: EmptyObject,
    pub debug: EmptyObject,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            input: CompletionInput {
                prompt: prompt.into(),
            },
            parameters: EmptyObject {},
            debug: EmptyObject {},
        }
    }
}

/// The prompt envelope of a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionInput {
    pub prompt: String,
}

/// Serializes as `{}`. The provider requires the field to be present even
/// when empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyObject {}

/// A completion response. Both levels are optional; a payload without
/// `output.text` is surfaced to the caller for diagnosis instead of being
/// probed further.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub output: Option<CompletionOutput>,

    #[serde(default)]
    pub request_id: Option<String>,
}

/// The output envelope of a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionOutput {
    #[serde(default)]
    pub text: Option<String>,
}
