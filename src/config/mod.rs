//! Configuration module for yt-transcript.
//!
//! Handles loading settings from TOML and `YT_MCP_*` environment variables.

mod settings;

pub use settings::{
    CacheSettings, ProviderMode, ProviderSettings, QuerySettings, RateLimitSettings,
    ServerSettings, Settings, Transport, ENV_PREFIX,
};
