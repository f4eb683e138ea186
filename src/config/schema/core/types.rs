use super::super::{GatewayConfig, NotifyConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    /// Base URL of the kHealth service, e.g. `https://khealth.example.com`
    #[serde(default)]
    pub url: String,
    /// Bearer token issued by kHealth for the HA integration
    #[serde(default)]
    pub api_token: String,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between polls of `/api/v1/ha/poll` (default: 60)
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,
    /// Timeout for polls, `/me` and notify calls (default: 10).
    /// Acknowledgments always use 10 s.
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    /// Consecutive component failures before the supervisor gives up (0 = never)
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
}

fn default_initial_backoff_secs() -> u64 {
    2
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_max_restarts() -> u32 {
    10
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            max_restarts: default_max_restarts(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
}
