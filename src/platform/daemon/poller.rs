use crate::diagnostics::health;
use crate::error::ApiError;
use crate::reminders::SnapshotReceiver;
use crate::remote::{KhealthClient, PollResponse};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};

pub const POLLER_COMPONENT: &str = "poller";
/// Consecutive failed polls before the poller reports itself degraded.
pub const DEGRADED_AFTER_FAILURES: u32 = 3;

/// Periodically fetches `/api/v1/ha/poll` and publishes each result to subscribers.
pub struct SnapshotPoller {
    client: KhealthClient,
    interval: Duration,
    latest: watch::Sender<Option<Arc<PollResponse>>>,
    component: &'static str,
}

impl SnapshotPoller {
    pub fn new(client: KhealthClient, interval_secs: u64) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            client,
            interval: Duration::from_secs(interval_secs.max(1)),
            latest,
            component: POLLER_COMPONENT,
        }
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.latest.subscribe()
    }

    /// Poll once. Successful results are published even when unchanged, so
    /// every poll reaches the reconciliation engine.
    pub async fn refresh(&self) -> Result<Arc<PollResponse>, ApiError> {
        match self.client.poll().await {
            Ok(poll) => {
                let poll = Arc::new(poll);
                self.latest.send_replace(Some(Arc::clone(&poll)));
                health::mark_component_ok(self.component);
                Ok(poll)
            }
            Err(error) => {
                let failures = health::mark_component_error(self.component, &error);
                if failures >= DEGRADED_AFTER_FAILURES {
                    health::mark_component_degraded(self.component);
                }
                tracing::warn!(failures, "kHealth poll failed: {error}");
                Err(error)
            }
        }
    }

    /// Poll immediately, then every interval. Returns only on an auth failure,
    /// which no amount of retrying at the poll interval will fix.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(error) = self.refresh().await
                && error.is_auth()
            {
                return Err(error.into());
            }
        }
    }
}
