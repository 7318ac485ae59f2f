//! Chat Gateway
//!
//! A small HTTP gateway that proxies browser chat requests to upstream LLM
//! providers: a streaming chat-completions endpoint (DeepSeek) whose SSE
//! token stream is re-encoded for the caller, and a single-shot application
//! completion endpoint (DashScope) with a bounded wait.

pub mod api;
pub mod config;
pub mod prompts;
pub mod protocol;
pub mod providers;
pub mod relay;
pub mod server;

pub use api::AppState;
pub use config::GatewayConfig;
pub use server::Server;

/// Returns the version of the gateway crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
