//! Configuration for the chat gateway
//!
//! All configuration is resolved once at process startup into an immutable
//! [`GatewayConfig`] that is handed to the endpoints. Handlers never read
//! the process environment themselves. Provider credentials are required
//! and have no built-in defaults: a missing credential fails startup.

mod error;
mod secrets;

pub use error::{ConfigError, ConfigResult};
pub use secrets::SecretString;

use std::env;
use std::path::PathBuf;

/// Default bind address for the HTTP server.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default DeepSeek API base URL.
const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Default DeepSeek chat model identifier.
const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Default DashScope API base URL.
const DEFAULT_DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";

/// Default bounded wait for the single-shot DashScope call, in seconds.
const DEFAULT_DASHSCOPE_TIMEOUT_SECS: u64 = 10;

/// Default path of the optional system prompt file.
const DEFAULT_SYSTEM_PROMPT_PATH: &str = "systemPrompt.txt";

/// Default path of the optional user prompt file.
const DEFAULT_USER_PROMPT_PATH: &str = "userPrompt.txt";

/// Immutable gateway configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Path of the optional system prompt file, read per streaming request.
    pub system_prompt_path: PathBuf,

    /// Path of the optional user prompt file, read per streaming request.
    pub user_prompt_path: PathBuf,

    /// Streaming chat-completions provider.
    pub deepseek: DeepSeekConfig,

    /// Single-shot completion provider.
    pub dashscope: DashScopeConfig,
}

/// Configuration for the DeepSeek chat-completions provider.
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

/// Configuration for the DashScope application completion provider.
#[derive(Debug, Clone)]
pub struct DashScopeConfig {
    pub api_key: SecretString,
    pub app_id: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Build the configuration from process environment variables.
    ///
    /// Fails closed: `DEEPSEEK_API_KEY`, `DASHSCOPE_API_KEY` and
    /// `DASHSCOPE_APP_ID` must be set and non-empty.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_source(|var| env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_source<F>(get: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_var = "DASHSCOPE_TIMEOUT_SECS";
        let timeout_secs = match get(timeout_var) {
            Some(raw) if !raw.trim().is_empty() => {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid {
                        var: timeout_var.to_string(),
                        message: e.to_string(),
                    })?
            }
            _ => DEFAULT_DASHSCOPE_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr: optional(&get, "GATEWAY_BIND_ADDR", DEFAULT_BIND_ADDR),
            system_prompt_path: PathBuf::from(optional(
                &get,
                "SYSTEM_PROMPT_PATH",
                DEFAULT_SYSTEM_PROMPT_PATH,
            )),
            user_prompt_path: PathBuf::from(optional(
                &get,
                "USER_PROMPT_PATH",
                DEFAULT_USER_PROMPT_PATH,
            )),
            deepseek: DeepSeekConfig {
                api_key: SecretString::new(required(&get, "DEEPSEEK_API_KEY")?),
                base_url: base_url(&get, "DEEPSEEK_BASE_URL", DEFAULT_DEEPSEEK_BASE_URL),
                model: optional(&get, "DEEPSEEK_MODEL", DEFAULT_DEEPSEEK_MODEL),
            },
            dashscope: DashScopeConfig {
                api_key: SecretString::new(required(&get, "DASHSCOPE_API_KEY")?),
                app_id: required(&get, "DASHSCOPE_APP_ID")?,
                base_url: base_url(&get, "DASHSCOPE_BASE_URL", DEFAULT_DASHSCOPE_BASE_URL),
                timeout_secs,
            },
        })
    }
}

/// Look up a required variable; empty or whitespace-only values count as unset.
fn required<F>(get: &F, var: &str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::EnvVarNotFound {
            var: var.to_string(),
        })
}

/// Look up an optional variable, falling back to a default.
fn optional<F>(get: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get(var)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Like [`optional`], with trailing slashes trimmed so endpoint paths can be
/// appended with a single `/`.
fn base_url<F>(get: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    optional(get, var, default).trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DEEPSEEK_API_KEY", "sk-deepseek-test"),
            ("DASHSCOPE_API_KEY", "sk-dashscope-test"),
            ("DASHSCOPE_APP_ID", "app-test"),
        ])
    }

    fn lookup(env: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |var| env.get(var).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults_applied() {
        let config = GatewayConfig::from_source(lookup(full_env())).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.deepseek.base_url, "https://api.deepseek.com/v1");
        assert_eq!(config.deepseek.model, "deepseek-chat");
        assert_eq!(
            config.dashscope.base_url,
            "https://dashscope.aliyuncs.com/api/v1"
        );
        assert_eq!(config.dashscope.timeout_secs, 10);
        assert_eq!(config.system_prompt_path.to_str(), Some("systemPrompt.txt"));
        assert_eq!(config.user_prompt_path.to_str(), Some("userPrompt.txt"));
    }

    #[test]
    fn test_missing_credential_fails_closed() {
        let mut env = full_env();
        env.remove("DASHSCOPE_API_KEY");

        let result = GatewayConfig::from_source(lookup(env));

        match result {
            Err(ConfigError::EnvVarNotFound { var }) => {
                assert_eq!(var, "DASHSCOPE_API_KEY");
            }
            other => panic!("expected EnvVarNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_credential_counts_as_unset() {
        let mut env = full_env();
        env.insert("DEEPSEEK_API_KEY", "   ");

        let result = GatewayConfig::from_source(lookup(env));

        assert!(matches!(
            result,
            Err(ConfigError::EnvVarNotFound { var }) if var == "DEEPSEEK_API_KEY"
        ));
    }

    #[test]
    fn test_overrides_and_slash_trimming() {
        let mut env = full_env();
        env.insert("DEEPSEEK_BASE_URL", "http://localhost:9999/v1/");
        env.insert("DASHSCOPE_TIMEOUT_SECS", "3");
        env.insert("GATEWAY_BIND_ADDR", "0.0.0.0:3000");

        let config = GatewayConfig::from_source(lookup(env)).unwrap();

        assert_eq!(config.deepseek.base_url, "http://localhost:9999/v1");
        assert_eq!(config.dashscope.timeout_secs, 3);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let mut env = full_env();
        env.insert("DASHSCOPE_TIMEOUT_SECS", "soon");

        let result = GatewayConfig::from_source(lookup(env));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var, .. }) if var == "DASHSCOPE_TIMEOUT_SECS"
        ));
    }
}
