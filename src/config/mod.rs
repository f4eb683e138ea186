pub mod schema;

pub use schema::{
    Config, GatewayConfig, LogConfig, LogLevel, NotifyBackend, NotifyConfig, PollConfig,
    ReliabilityConfig,
};
