//! DashScope application completion client (single-shot)

mod client;
pub mod types;

pub use client::{CompletionOutcome, DashScopeClient};
