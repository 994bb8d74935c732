//! Configuration settings for yt-transcript.
//!
//! Settings come from a TOML file (all fields optional) and are then
//! overridden by `YT_MCP_*` environment variables.

use crate::error::{Result, TranscriptError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "YT_MCP_";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
    pub query: QuerySettings,
    pub server: ServerSettings,
}

/// Where transcripts come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Extract captions in-process with yt-dlp.
    #[default]
    #[serde(alias = "standalone")]
    Local,
    /// Call a remote transcript service.
    #[serde(alias = "backend")]
    Remote,
}

impl std::str::FromStr for ProviderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "standalone" => Ok(ProviderMode::Local),
            "remote" | "backend" => Ok(ProviderMode::Remote),
            _ => Err(format!("Unknown provider mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderMode::Local => write!(f, "local"),
            ProviderMode::Remote => write!(f, "remote"),
        }
    }
}

/// Transport for the MCP server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    #[default]
    Stdio,
    #[serde(alias = "streamable-http")]
    Http,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" | "streamable-http" => Ok(Transport::Http),
            _ => Err(format!("Unknown transport: {}", s)),
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http => write!(f, "http"),
        }
    }
}

/// Transcript provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider mode (local, remote).
    pub mode: ProviderMode,
    /// Base URL of the remote transcript service.
    pub backend_url: String,
    /// API key sent as `X-API-Key` (optional).
    pub backend_api_key: Option<String>,
    /// Per-request timeout for the remote service, in seconds.
    pub timeout_seconds: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            mode: ProviderMode::Local,
            backend_url: "http://127.0.0.1:8300".to_string(),
            backend_api_key: None,
            timeout_seconds: 60,
        }
    }
}

/// Transcript cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of cached transcripts.
    pub max_size: usize,
    /// Time-to-live of a cached transcript, in seconds.
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: 100,
            ttl_seconds: 3600,
        }
    }
}

/// Inbound request rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Requests admitted per sliding minute.
    pub per_minute: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self { per_minute: 30 }
    }
}

/// Query limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Maximum videos per batch request.
    pub max_batch: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { max_batch: 10 }
    }
}

/// MCP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub transport: Transport,
    /// Bind host for the HTTP transport.
    pub host: String,
    /// Bind port for the HTTP transport.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: "127.0.0.1".to_string(),
            port: 8401,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None, then
    /// apply environment overrides.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `YT_MCP_*` overrides. `lookup` maps a full variable name to its value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = var("MODE") {
            self.provider.mode = v.parse().map_err(TranscriptError::Config)?;
        }
        if let Some(v) = var("BACKEND_URL") {
            self.provider.backend_url = v;
        }
        if let Some(v) = var("BACKEND_API_KEY") {
            self.provider.backend_api_key = Some(v);
        }
        if let Some(v) = var("CACHE_MAX_SIZE") {
            self.cache.max_size = parse_number("CACHE_MAX_SIZE", &v)?;
        }
        if let Some(v) = var("CACHE_TTL_SECONDS") {
            self.cache.ttl_seconds = parse_number("CACHE_TTL_SECONDS", &v)?;
        }
        if let Some(v) = var("RATE_LIMIT_PER_MINUTE") {
            self.rate_limit.per_minute = parse_number("RATE_LIMIT_PER_MINUTE", &v)?;
        }
        if let Some(v) = var("TRANSPORT") {
            self.server.transport = v.parse().map_err(TranscriptError::Config)?;
        }

        Ok(())
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_size == 0 {
            return Err(TranscriptError::Config(
                "cache.max_size must be at least 1".to_string(),
            ));
        }
        if self.provider.timeout_seconds == 0 {
            return Err(TranscriptError::Config(
                "provider.timeout_seconds must be at least 1".to_string(),
            ));
        }
        if self.provider.mode == ProviderMode::Remote {
            url::Url::parse(&self.provider.backend_url).map_err(|e| {
                TranscriptError::Config(format!(
                    "Invalid backend URL '{}': {}",
                    self.provider.backend_url, e
                ))
            })?;
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| TranscriptError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("yt-transcript")
            .join("config.toml")
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        TranscriptError::Config(format!(
            "{}{} must be a non-negative integer, got '{}'",
            ENV_PREFIX, name, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.provider.mode, ProviderMode::Local);
        assert_eq!(settings.cache.max_size, 100);
        assert_eq!(settings.cache.ttl_seconds, 3600);
        assert_eq!(settings.rate_limit.per_minute, 30);
        assert_eq!(settings.query.max_batch, 10);
        assert_eq!(settings.server.transport, Transport::Stdio);
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [provider]
            mode = "backend"
            backend_url = "http://transcripts.internal:8300"

            [cache]
            ttl_seconds = 60
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider.mode, ProviderMode::Remote);
        assert_eq!(settings.cache.ttl_seconds, 60);
        assert_eq!(settings.cache.max_size, 100);
        assert_eq!(settings.provider.timeout_seconds, 60);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[
                ("YT_MCP_MODE", "backend"),
                ("YT_MCP_BACKEND_URL", "http://10.0.0.5:8300"),
                ("YT_MCP_BACKEND_API_KEY", "secret"),
                ("YT_MCP_CACHE_MAX_SIZE", "5"),
                ("YT_MCP_CACHE_TTL_SECONDS", "120"),
                ("YT_MCP_RATE_LIMIT_PER_MINUTE", "7"),
                ("YT_MCP_TRANSPORT", "streamable-http"),
            ]))
            .unwrap();

        assert_eq!(settings.provider.mode, ProviderMode::Remote);
        assert_eq!(settings.provider.backend_url, "http://10.0.0.5:8300");
        assert_eq!(settings.provider.backend_api_key.as_deref(), Some("secret"));
        assert_eq!(settings.cache.max_size, 5);
        assert_eq!(settings.cache.ttl_seconds, 120);
        assert_eq!(settings.rate_limit.per_minute, 7);
        assert_eq!(settings.server.transport, Transport::Http);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[("YT_MCP_BACKEND_API_KEY", "  ")]))
            .unwrap();
        assert_eq!(settings.provider.backend_api_key, None);
    }

    #[test]
    fn test_bad_env_values() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_overrides(env(&[("YT_MCP_CACHE_MAX_SIZE", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("YT_MCP_CACHE_MAX_SIZE"));

        let err = settings
            .apply_env_overrides(env(&[("YT_MCP_MODE", "hybrid")]))
            .unwrap_err();
        assert!(matches!(err, TranscriptError::Config(_)));
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.cache.max_size = 0;
        assert!(settings.validate().is_err());

        settings.cache.max_size = 10;
        settings.provider.mode = ProviderMode::Remote;
        settings.provider.backend_url = "nowhere".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.provider.timeout_seconds = 0;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_seconds"));
    }

    #[test]
    fn test_max_ttl_override_is_usable() {
        let mut settings = Settings::default();
        settings
            .apply_env_overrides(env(&[("YT_MCP_CACHE_TTL_SECONDS", "18446744073709551615")]))
            .unwrap();
        assert!(settings.validate().is_ok());

        let cache = crate::cache::TranscriptCache::new(
            settings.cache.max_size,
            std::time::Duration::from_secs(settings.cache.ttl_seconds),
        );
        let result = crate::transcript::TranscriptResult::from_segments("abc", "en", false, vec![], "local");
        cache.set("abc", "en", result.clone());
        assert_eq!(cache.get("abc", "en"), Some(result));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.rate_limit.per_minute = 12;
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let reloaded: Settings = toml::from_str(&content).unwrap();
        assert_eq!(reloaded.rate_limit.per_minute, 12);
    }
}
