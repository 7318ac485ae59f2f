//! DeepSeek chat-completions client (streaming)

mod client;
pub mod types;

pub use client::DeepSeekClient;
