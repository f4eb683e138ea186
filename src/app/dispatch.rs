use crate::app::status::render_status;
use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result, bail};
use khealth_bridge::Config;
use khealth_bridge::error::ApiError;
use khealth_bridge::reminders::{AcknowledgmentMachine, ActionOutcome, LastSeen};
use khealth_bridge::remote::{AckOutcome, KhealthClient};
use khealth_bridge::transport::channels::{LogChannel, build_channel};
use std::sync::Arc;

fn describe_poll_error(error: &ApiError) -> String {
    if error.is_auth() {
        format!("kHealth rejected the API token: {error}")
    } else {
        format!("Cannot connect to kHealth: {error}")
    }
}

async fn run_status(config: &Config) -> Result<()> {
    config.validate()?;
    let client = KhealthClient::from_config(config);
    let poll = client
        .poll()
        .await
        .map_err(|e| anyhow::anyhow!(describe_poll_error(&e)))?;
    println!("{}", render_status(config, &poll));
    Ok(())
}

async fn run_check(config: &Config) -> Result<()> {
    config.validate()?;
    let client = KhealthClient::from_config(config);

    if let Err(error) = client.poll().await {
        bail!(describe_poll_error(&error));
    }
    println!("✓ kHealth reachable at {}", client.base_url());

    let me = client.me().await.context("fetch /api/v1/me")?;
    match me.email {
        Some(email) => println!("✓ Authenticated as user {} ({email})", me.id),
        None => println!("✓ Authenticated as user {}", me.id),
    }

    let channel = build_channel(config)?;
    if channel.health_check().await {
        println!("✓ Notification channel '{}' reachable", channel.name());
    } else {
        println!("! Notification channel '{}' failed its health check", channel.name());
    }
    Ok(())
}

async fn run_ack(config: &Config, token: &str, note: Option<&str>) -> Result<()> {
    config.validate()?;

    // Nothing is on display for a fresh machine, so only the failure notice can reach the channel.
    let machine = AcknowledgmentMachine::new(
        KhealthClient::from_config(config),
        Arc::new(LogChannel::new()),
        Arc::new(LastSeen::new()),
    );
    match machine.on_action(token, note).await {
        ActionOutcome::Acknowledged {
            outcome: AckOutcome::Recorded,
            ..
        } => println!("✓ Response recorded"),
        ActionOutcome::Acknowledged {
            outcome: AckOutcome::AlreadyAcknowledged,
            ..
        } => println!("✓ Reminder was already acknowledged"),
        ActionOutcome::Failed => bail!("Failed to record response. Please try again."),
        ActionOutcome::Ignored => {
            bail!("'{token}' is not a kHealth action identifier (expected KHEALTH_<VERB>_<id>)")
        }
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Daemon => khealth_bridge::platform::daemon::run(Arc::new(config)).await,
        Commands::Status => run_status(&config).await,
        Commands::Check => run_check(&config).await,
        Commands::Ack { token, note } => run_ack(&config, &token, note.as_deref()).await,
    }
}
