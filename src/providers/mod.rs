//! Upstream LLM provider clients
//!
//! One client per provider. Clients own their HTTP connection pool, map
//! non-success upstream statuses to [`ProviderError::Upstream`] after
//! logging the full provider body, and never embed credentials in errors.

pub mod dashscope;
pub mod deepseek;
mod error;

pub use dashscope::DashScopeClient;
pub use deepseek::DeepSeekClient;
pub use error::{ProviderError, ProviderResult};
