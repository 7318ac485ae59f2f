//! HTTP API surface
//!
//! Two POST routes: `/api/chat` (streaming relay) and `/api/dashscope`
//! (single-shot). Handlers always return a [`Response`]; every failure path
//! is mapped to a structured `{"error": ...}` body so the process never
//! crashes on a request.

mod chat;
mod dashscope;

use bytes::Bytes;
use serde_json::json;

use crate::config::GatewayConfig;
use crate::providers::{DashScopeClient, DeepSeekClient, ProviderResult};
use crate::server::{Request, Response};

/// Shared, immutable per-process state handed to every handler.
pub struct AppState {
    pub config: GatewayConfig,
    pub deepseek: DeepSeekClient,
    pub dashscope: DashScopeClient,
}

impl AppState {
    /// Build the application state, constructing one client per provider.
    pub fn new(config: GatewayConfig) -> ProviderResult<Self> {
        let deepseek = DeepSeekClient::new(config.deepseek.clone())?;
        let dashscope = DashScopeClient::new(config.dashscope.clone())?;
        Ok(Self {
            config,
            deepseek,
            dashscope,
        })
    }
}

/// Dispatch a parsed request to its handler.
pub async fn route(state: &AppState, request: &Request, body: Bytes) -> Response {
    match (request.method(), request.path()) {
        ("POST", "/api/chat") => chat::handle(state, &body).await,
        ("POST", "/api/dashscope") => dashscope::handle(state, &body).await,
        (_, "/api/chat") | (_, "/api/dashscope") => {
            Response::json(405, &json!({"error": "Method not allowed"}))
        }
        _ => Response::json(404, &json!({"error": "Not found"})),
    }
}
