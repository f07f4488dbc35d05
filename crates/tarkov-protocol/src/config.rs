//! Configuration structures for backend clients

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{ProtocolError, Result};
use crate::retry::{RetryPolicy, env_parse};

pub const DEFAULT_LAUNCHER_URL: &str = "https://launcher.escapefromtarkov.com";
pub const DEFAULT_PROD_URL: &str = "https://prod.escapefromtarkov.com";
pub const DEFAULT_TRADING_URL: &str = "https://trading.escapefromtarkov.com";
pub const DEFAULT_RAGFAIR_URL: &str = "https://ragfair.escapefromtarkov.com";

pub const DEFAULT_LAUNCHER_VERSION: &str = "0.9.3.1023";
pub const DEFAULT_GAME_VERSION: &str = "0.12.3.5834";
pub const DEFAULT_UNITY_VERSION: &str = "2018.4.13f1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Launcher API host (login, hardware activation, version lookups)
    pub launcher_url: String,

    /// Main game API host
    pub prod_url: String,

    /// Trader API host
    pub trading_url: String,

    /// Flea market API host
    pub ragfair_url: String,

    pub launcher_version: String,
    pub game_version: String,
    pub unity_version: String,

    /// Backend protocol revision sent on token exchange
    pub backend_version: String,

    /// Release branch sent with launcher requests
    pub branch: String,

    pub http: HttpConfig,

    /// Retry policy for connection failures
    pub retry_policy: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            launcher_url: DEFAULT_LAUNCHER_URL.to_string(),
            prod_url: DEFAULT_PROD_URL.to_string(),
            trading_url: DEFAULT_TRADING_URL.to_string(),
            ragfair_url: DEFAULT_RAGFAIR_URL.to_string(),
            launcher_version: DEFAULT_LAUNCHER_VERSION.to_string(),
            game_version: DEFAULT_GAME_VERSION.to_string(),
            unity_version: DEFAULT_UNITY_VERSION.to_string(),
            backend_version: "6".to_string(),
            branch: "live".to_string(),
            http: HttpConfig::default(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Endpoint overrides are validated as URLs; malformed ones are rejected
    /// rather than silently replaced.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            launcher_url: std::env::var("TARKOV_LAUNCHER_URL").unwrap_or(defaults.launcher_url),
            prod_url: std::env::var("TARKOV_PROD_URL").unwrap_or(defaults.prod_url),
            trading_url: std::env::var("TARKOV_TRADING_URL").unwrap_or(defaults.trading_url),
            ragfair_url: std::env::var("TARKOV_RAGFAIR_URL").unwrap_or(defaults.ragfair_url),
            launcher_version: std::env::var("TARKOV_LAUNCHER_VERSION")
                .unwrap_or(defaults.launcher_version),
            game_version: std::env::var("TARKOV_GAME_VERSION").unwrap_or(defaults.game_version),
            unity_version: std::env::var("TARKOV_UNITY_VERSION").unwrap_or(defaults.unity_version),
            http: HttpConfig::from_env(),
            retry_policy: RetryPolicy::from_env(),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Point every endpoint at a single host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        self.launcher_url.clone_from(&base);
        self.prod_url.clone_from(&base);
        self.trading_url.clone_from(&base);
        self.ragfair_url = base;
        self
    }

    /// Check that every endpoint is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("launcher_url", &self.launcher_url),
            ("prod_url", &self.prod_url),
            ("trading_url", &self.trading_url),
            ("ragfair_url", &self.ragfair_url),
        ] {
            let url = Url::parse(value)
                .map_err(|e| ProtocolError::Config(format!("{name} '{value}': {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ProtocolError::Config(format!(
                    "{name} '{value}': unsupported scheme '{}'",
                    url.scheme()
                )));
            }
        }
        Ok(())
    }

    /// Launcher API URL for `path`
    pub fn launcher_endpoint(&self, path: &str) -> String {
        join(&self.launcher_url, path)
    }

    /// Game API URL for `path`
    pub fn prod_endpoint(&self, path: &str) -> String {
        join(&self.prod_url, path)
    }

    /// Trader API URL for `path`
    pub fn trading_endpoint(&self, path: &str) -> String {
        join(&self.trading_url, path)
    }

    /// Flea market API URL for `path`
    pub fn ragfair_endpoint(&self, path: &str) -> String {
        join(&self.ragfair_url, path)
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// HTTP client tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 4,
        }
    }
}

impl HttpConfig {
    /// Read `TARKOV_REQUEST_TIMEOUT` and `TARKOV_CONNECT_TIMEOUT` (seconds)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: env_parse("TARKOV_REQUEST_TIMEOUT")
                .map_or(defaults.timeout, Duration::from_secs),
            connect_timeout: env_parse("TARKOV_CONNECT_TIMEOUT")
                .map_or(defaults.connect_timeout, Duration::from_secs),
            ..defaults
        }
    }
}

#[cfg(test)]
#[allow(unsafe_code, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    // Environment is process-global; serialize the tests that touch it
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 12] = [
        "TARKOV_LAUNCHER_URL",
        "TARKOV_PROD_URL",
        "TARKOV_TRADING_URL",
        "TARKOV_RAGFAIR_URL",
        "TARKOV_LAUNCHER_VERSION",
        "TARKOV_GAME_VERSION",
        "TARKOV_UNITY_VERSION",
        "TARKOV_REQUEST_TIMEOUT",
        "TARKOV_CONNECT_TIMEOUT",
        "TARKOV_MAX_RETRIES",
        "TARKOV_RETRY_BACKOFF",
        "TARKOV_MAX_BACKOFF",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.launcher_url, "https://launcher.escapefromtarkov.com");
        assert_eq!(config.game_version, "0.12.3.5834");
        assert_eq!(config.launcher_version, "0.9.3.1023");
        assert_eq!(config.unity_version, "2018.4.13f1");
        assert_eq!(config.branch, "live");
        assert_eq!(config.retry_policy.max_attempts, 0);
        config.validate().expect("Operation should succeed");
    }

    #[test]
    fn test_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("Operation should succeed");
        clear_env();

        let config = ClientConfig::from_env().expect("Operation should succeed");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_from_env_overrides() {
        let _guard = ENV_LOCK.lock().expect("Operation should succeed");
        clear_env();
        unsafe {
            std::env::set_var("TARKOV_PROD_URL", "http://127.0.0.1:8080");
            std::env::set_var("TARKOV_GAME_VERSION", "0.13.0.1");
            std::env::set_var("TARKOV_REQUEST_TIMEOUT", "5");
            std::env::set_var("TARKOV_MAX_RETRIES", "2");
            std::env::set_var("TARKOV_CONNECT_TIMEOUT", "not-a-number");
        }

        let config = ClientConfig::from_env().expect("Operation should succeed");
        assert_eq!(config.prod_url, "http://127.0.0.1:8080");
        assert_eq!(config.game_version, "0.13.0.1");
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert_eq!(config.http.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.retry_policy.max_attempts, 2);

        clear_env();
    }

    #[test]
    fn test_from_env_rejects_bad_url() {
        let _guard = ENV_LOCK.lock().expect("Operation should succeed");
        clear_env();
        unsafe {
            std::env::set_var("TARKOV_TRADING_URL", "ftp://trading.example");
        }

        let result = ClientConfig::from_env();
        assert!(matches!(result, Err(ProtocolError::Config(msg)) if msg.contains("trading_url")));

        clear_env();
    }

    #[test]
    fn test_with_base_url() {
        let config = ClientConfig::default().with_base_url("http://localhost:9000/");
        assert_eq!(
            config.launcher_endpoint("/launcher/GetLauncherDistrib"),
            "http://localhost:9000/launcher/GetLauncherDistrib"
        );
        assert_eq!(
            config.ragfair_endpoint("/client/ragfair/find"),
            "http://localhost:9000/client/ragfair/find"
        );
        assert_eq!(config.prod_url, config.trading_url);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = ClientConfig::default().with_base_url("http://10.0.0.1");
        let json = serde_json::to_string(&config).expect("Operation should succeed");
        let back: ClientConfig = serde_json::from_str(&json).expect("Operation should succeed");
        assert_eq!(back, config);
    }
}
