use crate::config::Config;
use crate::reminders::NotificationManager;
use crate::remote::KhealthClient;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod poller;
mod state;
mod supervisor;

pub use poller::{DEGRADED_AFTER_FAILURES, POLLER_COMPONENT, SnapshotPoller};

use state::spawn_state_writer;
use supervisor::spawn_supervised_components;

const STATUS_FLUSH_SECONDS: u64 = 5;
const ACTION_QUEUE_CAPACITY: usize = 32;

pub async fn run(config: Arc<Config>) -> Result<()> {
    config.validate()?;
    let client = KhealthClient::from_config(&config);
    let channel = crate::transport::channels::build_channel(&config)
        .context("build notification channel")?;

    crate::diagnostics::health::mark_component_ok("daemon");

    let poller = Arc::new(SnapshotPoller::new(
        client.clone(),
        config.poll.interval_secs,
    ));
    let (action_tx, action_rx) = mpsc::channel(ACTION_QUEUE_CAPACITY);
    let manager = NotificationManager::new(client, channel);
    manager.start(poller.subscribe(), action_rx)?;

    let mut handles: Vec<JoinHandle<()>> = vec![spawn_state_writer(state_file_path(&config))];
    handles.extend(spawn_supervised_components(
        &config.reliability,
        config.gateway.clone(),
        poller,
        action_tx,
    ));

    println!("◆ kHealth bridge started");
    println!("   kHealth:  {}", config.api_base_url());
    println!("   Notify:   {}", config.notify.backend);
    println!(
        "   Gateway:  http://{}:{}/actions",
        config.gateway.host, config.gateway.port
    );
    println!("   Polling every {}s. Press Ctrl+C to stop.", config.poll.interval_secs);

    tokio::signal::ctrl_c().await?;
    crate::diagnostics::health::mark_component_error("daemon", "shutdown requested");

    manager.stop().await;
    for handle in &handles {
        handle.abort();
    }
    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}

pub fn state_file_path(config: &Config) -> PathBuf {
    state::state_file_path(config)
}
