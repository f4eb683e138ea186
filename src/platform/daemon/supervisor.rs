use super::poller::{POLLER_COMPONENT, SnapshotPoller};
use crate::config::{GatewayConfig, ReliabilityConfig};
use crate::diagnostics::health;
use crate::reminders::ActionEvent;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

pub(super) const GATEWAY_COMPONENT: &str = "gateway";

pub(super) fn spawn_component_supervisor<F, Fut>(
    name: &'static str,
    reliability: &ReliabilityConfig,
    mut run_component: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let initial_backoff = reliability.initial_backoff_secs.max(1);
    let max_backoff = reliability.max_backoff_secs.max(initial_backoff);
    let max_restarts = reliability.max_restarts;

    tokio::spawn(async move {
        let mut backoff = initial_backoff;
        let mut consecutive_failures: u32 = 0;

        loop {
            tracing::info!("Daemon component '{name}' starting");
            match run_component().await {
                Ok(()) => {
                    tracing::warn!("Daemon component '{name}' exited unexpectedly");
                    health::mark_component_error(name, "exited unexpectedly");
                    backoff = initial_backoff;
                    consecutive_failures = consecutive_failures.saturating_add(1);
                }
                Err(e) => {
                    tracing::error!("Daemon component '{name}' failed: {e:#}");
                    health::mark_component_error(name, format!("{e:#}"));
                    consecutive_failures = consecutive_failures.saturating_add(1);
                }
            }

            if max_restarts > 0 && consecutive_failures > max_restarts {
                tracing::error!(
                    "Daemon component '{name}' exceeded max restarts ({max_restarts}), circuit open"
                );
                break;
            }
            health::bump_component_restart(name);
            tokio::time::sleep(Duration::from_secs(backoff)).await;
            backoff = backoff.saturating_mul(2).min(max_backoff);
        }
    })
}

pub(super) fn spawn_supervised_components(
    reliability: &ReliabilityConfig,
    gateway: GatewayConfig,
    poller: Arc<SnapshotPoller>,
    actions: mpsc::Sender<ActionEvent>,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();

    handles.push(spawn_component_supervisor(
        POLLER_COMPONENT,
        reliability,
        move || {
            let poller = Arc::clone(&poller);
            async move { poller.run().await }
        },
    ));

    let gateway = Arc::new(gateway);
    handles.push(spawn_component_supervisor(
        GATEWAY_COMPONENT,
        reliability,
        move || {
            let gateway = Arc::clone(&gateway);
            let actions = actions.clone();
            async move {
                health::mark_component_ok(GATEWAY_COMPONENT);
                crate::transport::gateway::run_gateway(&gateway, actions).await
            }
        },
    ));

    handles
}
