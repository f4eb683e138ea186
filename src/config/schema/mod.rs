mod core;
mod gateway;
mod notify;

pub use self::core::{Config, LogConfig, LogLevel, PollConfig, ReliabilityConfig};
pub use gateway::GatewayConfig;
pub use notify::{NotifyBackend, NotifyConfig};
