//! Console configuration.
//!
//! Values come from, in order of precedence: command-line flags (applied by
//! the binary through the `with_*` builders), environment variables, then
//! defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LLM_CONSOLE_URL` | `http://127.0.0.1:8000` |
//! | `LLM_CONSOLE_TOP_K` | `4` |
//! | `LLM_CONSOLE_LOG_LIMIT` | `50` |

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TOP_K: u32 = 4;
pub const DEFAULT_TOOL_LOG_LIMIT: u32 = 50;

/// Backend rejects larger retrieval depths.
pub const MAX_TOP_K: u32 = 20;

pub const ENV_BASE_URL: &str = "LLM_CONSOLE_URL";
pub const ENV_TOP_K: &str = "LLM_CONSOLE_TOP_K";
pub const ENV_LOG_LIMIT: &str = "LLM_CONSOLE_LOG_LIMIT";

/// Configuration for the backend client and console.
///
/// # Example
///
/// ```ignore
/// use llm_console::config::ClientConfig;
///
/// let config = ClientConfig::from_env()?
///     .with_base_url("http://localhost:9000")
///     .with_default_top_k(8);
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Retrieval depth for RAG and chain requests
    pub default_top_k: u32,
    /// Number of entries requested from the chain tool log
    pub tool_log_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_top_k: DEFAULT_TOP_K,
            tool_log_limit: DEFAULT_TOOL_LOG_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(value) = lookup(ENV_TOP_K) {
            config.default_top_k = parse_number(ENV_TOP_K, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LIMIT) {
            config.tool_log_limit = parse_number(ENV_LOG_LIMIT, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_top_k(mut self, top_k: u32) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn with_tool_log_limit(mut self, limit: u32) -> Self {
        self.tool_log_limit = limit;
        self
    }

    /// Check every field; the first problem wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        validate_top_k(self.default_top_k)?;

        if self.tool_log_limit == 0 {
            return Err(ConfigError::ZeroLogLimit);
        }
        Ok(())
    }
}

/// Reject retrieval depths the backend would refuse.
pub fn validate_top_k(top_k: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_TOP_K).contains(&top_k) {
        Ok(top_k)
    } else {
        Err(ConfigError::TopKOutOfRange(top_k))
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.default_top_k, 4);
        assert_eq!(config.tool_log_limit, 50);
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://llm.internal:9000/"),
            (ENV_TOP_K, "8"),
            (ENV_LOG_LIMIT, " 10 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://llm.internal:9000");
        assert_eq!(config.default_top_k, 8);
        assert_eq!(config.tool_log_limit, 10);
    }

    #[test]
    fn test_blank_url_falls_back_to_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_number() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_TOP_K, "four")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: ENV_TOP_K,
                value: "four".to_string()
            }
        );
    }

    #[test]
    fn test_top_k_bounds() {
        assert!(validate_top_k(1).is_ok());
        assert!(validate_top_k(20).is_ok());
        assert_eq!(validate_top_k(0), Err(ConfigError::TopKOutOfRange(0)));
        assert_eq!(validate_top_k(21), Err(ConfigError::TopKOutOfRange(21)));
    }

    #[test]
    fn test_invalid_urls() {
        let err = ClientConfig::new().with_base_url("not a url").validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ClientConfig::new()
            .with_base_url("ftp://backend")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { reason, .. } if reason.contains("ftp")));
    }

    #[test]
    fn test_zero_log_limit() {
        let err = ClientConfig::new().with_tool_log_limit(0).validate().unwrap_err();
        assert_eq!(err, ConfigError::ZeroLogLimit);
    }
}
