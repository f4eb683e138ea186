use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `khealth-bridge` - kHealth wellness reminders as actionable phone notifications.
#[derive(Parser, Debug)]
#[command(name = "khealth-bridge")]
#[command(version)]
#[command(about = "Bridges kHealth reminders to Home Assistant notifications.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.khealth/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of `[log] level`
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the poller, notification engine and action gateway until Ctrl+C
    Daemon,

    /// Poll kHealth once and show reminders, progress, streaks and schedule
    Status,

    /// Verify the API token and notification settings
    Check,

    /// Acknowledge a reminder by action identifier, e.g. `KHEALTH_DONE_42`
    Ack {
        /// Action identifier as carried by the notification button
        token: String,

        /// Free-text note (only sent with `KHEALTH_ALT_*`)
        #[arg(long)]
        note: Option<String>,
    },
}
