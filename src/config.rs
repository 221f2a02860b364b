//! Configuration file parser for ~/.config/feedpulse/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged as warnings.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// What a failed feed does to user-visible state during a background round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollFailurePolicy {
    /// Log the failure and leave state untouched.
    #[default]
    Ignore,
    /// Mark the loading process failed and the form invalid.
    Surface,
}

/// Top-level application configuration.
///
/// Every field has a default, so any subset of keys may be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between the end of one refresh round and the start of the next.
    pub poll_interval_ms: u64,

    /// Per-request timeout for feed fetches.
    pub fetch_timeout_secs: u64,

    /// Upper bound on parallel fetches within one refresh round.
    pub max_concurrent_fetches: usize,

    /// Proxy URL template; `{url}` is replaced by the percent-encoded feed URL.
    pub proxy_url: String,

    pub poll_failure_policy: PollFailurePolicy,

    /// Permit feeds on localhost and private networks.
    pub allow_private_hosts: bool,
}

pub const DEFAULT_PROXY_URL: &str = "https://allorigins.hexlet.app/get?disableCache=true&url={url}";

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5000,
            fetch_timeout_secs: 10,
            max_concurrent_fetches: 16,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            poll_failure_policy: PollFailurePolicy::Ignore,
            allow_private_hosts: false,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "poll_interval_ms",
        "fetch_timeout_secs",
        "max_concurrent_fetches",
        "proxy_url",
        "poll_failure_policy",
        "allow_private_hosts",
    ];

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Values that would stall the poller → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            poll_interval_ms = config.poll_interval_ms,
            policy = ?config.poll_failure_policy,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Rejects values that would stall or spin the poller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }
        if !self.proxy_url.contains("{url}") {
            return Err(ConfigError::Invalid(
                "proxy_url must contain a {url} placeholder".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("feedpulse_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(5000));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_concurrent_fetches, 16);
        assert_eq!(config.poll_failure_policy, PollFailurePolicy::Ignore);
        assert!(config.proxy_url.contains("{url}"));
        assert!(!config.allow_private_hosts);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedpulse_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.poll_interval_ms, 5000);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.fetch_timeout_secs, 10);
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "poll_interval_ms = 250\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.max_concurrent_fetches, 16);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let path = write_config(
            "full",
            r#"
poll_interval_ms = 30000
fetch_timeout_secs = 5
max_concurrent_fetches = 4
proxy_url = "https://proxy.example/raw?u={url}"
poll_failure_policy = "surface"
allow_private_hosts = true
"#,
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 30000);
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.max_concurrent_fetches, 4);
        assert_eq!(config.proxy_url, "https://proxy.example/raw?u={url}");
        assert_eq!(config.poll_failure_policy, PollFailurePolicy::Surface);
        assert!(config.allow_private_hosts);
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let path = write_config("bad_policy", "poll_failure_policy = \"explode\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "poll_interval_ms = 100\nmystery = 1\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 100);
        cleanup(&path);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let path = write_config("zero_conc", "max_concurrent_fetches = 0\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
        cleanup(&path);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_proxy_without_placeholder_rejected() {
        let path = write_config("no_placeholder", "proxy_url = \"https://proxy.example/\"\n");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("{url}"));
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        cleanup(&path);
    }
}
