use super::ack::AcknowledgmentMachine;
use super::last_seen::LastSeen;
use super::reconcile::ReconciliationEngine;
use crate::remote::{KhealthClient, PollResponse};
use crate::transport::channels::NotificationChannel;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

/// Latest poll result published by the poller. `None` until the first successful poll.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<PollResponse>>>;

/// A notification button press reported by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub action: String,
    pub reply_text: Option<String>,
}

impl ActionEvent {
    pub fn new(action: impl Into<String>, reply_text: Option<String>) -> Self {
        Self {
            action: action.into(),
            reply_text,
        }
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    last_seen: Arc<LastSeen>,
}

/// Hosts the reconciliation engine and the acknowledgment machine for one
/// connection, fed by a snapshot source and an action event stream.
pub struct NotificationManager {
    client: KhealthClient,
    channel: Arc<dyn NotificationChannel>,
    running: Mutex<Option<Running>>,
}

impl NotificationManager {
    pub fn new(client: KhealthClient, channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            client,
            channel,
            running: Mutex::new(None),
        }
    }

    /// What the running engine has on display. `None` while stopped.
    pub fn last_seen(&self) -> Option<Arc<LastSeen>> {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|running| Arc::clone(&running.last_seen))
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Start listening with an empty `LastSeen`. The current snapshot, if any,
    /// is reconciled right away.
    pub fn start(
        &self,
        snapshots: SnapshotReceiver,
        actions: mpsc::Receiver<ActionEvent>,
    ) -> anyhow::Result<()> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            anyhow::bail!("notification manager already started");
        }

        let last_seen = Arc::new(LastSeen::new());
        let reconciler = ReconciliationEngine::new(last_seen.clone(), self.channel.clone());
        let acks = Arc::new(AcknowledgmentMachine::new(
            self.client.clone(),
            self.channel.clone(),
            last_seen.clone(),
        ));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_event_loop(reconciler, acks, snapshots, actions, shutdown_rx));

        *running = Some(Running {
            shutdown,
            task,
            last_seen,
        });
        tracing::info!(channel = self.channel.name(), "notification manager started");
        Ok(())
    }

    /// Stop listening and wait for the event loop to exit.
    ///
    /// Both receivers are dropped before this returns; in-flight action
    /// handlers are aborted. Calling this twice, or without `start`, is a no-op.
    pub async fn stop(&self) {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(Running { shutdown, task, .. }) = running else {
            return;
        };

        let _ = shutdown.send(true);
        if let Err(error) = task.await
            && !error.is_cancelled()
        {
            tracing::warn!("notification event loop ended abnormally: {error}");
        }
        tracing::info!("notification manager stopped");
    }
}

async fn run_event_loop(
    reconciler: ReconciliationEngine,
    acks: Arc<AcknowledgmentMachine>,
    mut snapshots: SnapshotReceiver,
    mut actions: mpsc::Receiver<ActionEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut in_flight = JoinSet::new();
    let mut snapshots_open = true;

    let initial = snapshots.borrow_and_update().clone();
    if let Some(poll) = initial {
        reconciler.on_snapshot(&poll.snapshot()).await;
    }

    loop {
        tokio::select! {
            changed = snapshots.changed(), if snapshots_open => {
                if changed.is_err() {
                    // Acknowledgments keep working without fresh snapshots.
                    tracing::warn!("snapshot source closed; still handling actions");
                    snapshots_open = false;
                    continue;
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(poll) = latest {
                    reconciler.on_snapshot(&poll.snapshot()).await;
                }
            }
            event = actions.recv() => {
                let Some(event) = event else {
                    tracing::debug!("action source closed");
                    break;
                };
                let acks = acks.clone();
                in_flight.spawn(async move {
                    acks.on_action(&event.action, event.reply_text.as_deref()).await;
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(error) = joined {
                    tracing::warn!("action handler failed: {error}");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    in_flight.abort_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::test_support::RecordingChannel;
    use crate::reminders::{Reminder, ReminderType};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn poll_with_movement(id: Option<i64>) -> Option<Arc<PollResponse>> {
        let mut active_reminders = BTreeMap::new();
        active_reminders.insert(
            ReminderType::Movement,
            id.map(|id| Reminder::new(id, format!("move {id}"))),
        );
        Some(Arc::new(PollResponse {
            active_reminders,
            ..PollResponse::default()
        }))
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }

    fn manager(server_uri: &str, channel: Arc<RecordingChannel>) -> NotificationManager {
        NotificationManager::new(KhealthClient::new(server_uri, "tok", 5), channel)
    }

    #[tokio::test]
    async fn reconciles_initial_and_subsequent_snapshots() {
        let channel = Arc::new(RecordingChannel::default());
        let manager = manager("http://127.0.0.1:9", channel.clone());
        let (snapshot_tx, snapshot_rx) = watch::channel(poll_with_movement(Some(5)));
        let (_action_tx, action_rx) = mpsc::channel(8);

        manager.start(snapshot_rx, action_rx).unwrap();
        wait_for(|| channel.sent().len() == 1).await;
        let last_seen = manager.last_seen().unwrap();
        assert_eq!(last_seen.get(ReminderType::Movement), Some(5));

        snapshot_tx.send_replace(poll_with_movement(None));
        wait_for(|| channel.cleared().len() == 1).await;
        assert_eq!(last_seen.get(ReminderType::Movement), None);

        manager.stop().await;
    }

    #[tokio::test]
    async fn action_events_are_acknowledged_and_dismissed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/ha/acknowledge"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let channel = Arc::new(RecordingChannel::default());
        let manager = manager(&server.uri(), channel.clone());
        let (_snapshot_tx, snapshot_rx) = watch::channel(poll_with_movement(Some(42)));
        let (action_tx, action_rx) = mpsc::channel(8);
        manager.start(snapshot_rx, action_rx).unwrap();
        wait_for(|| channel.sent().len() == 1).await;

        action_tx
            .send(ActionEvent::new("KHEALTH_DONE_42", None))
            .await
            .unwrap();
        wait_for(|| channel.cleared() == ["khealth-movement"]).await;

        manager.stop().await;
    }

    #[tokio::test]
    async fn restart_begins_with_nothing_on_display() {
        let channel = Arc::new(RecordingChannel::default());
        let manager = manager("http://127.0.0.1:9", channel.clone());

        let (_tx1, rx1) = watch::channel(poll_with_movement(Some(5)));
        let (_atx1, arx1) = mpsc::channel(8);
        manager.start(rx1, arx1).unwrap();
        wait_for(|| channel.sent().len() == 1).await;
        manager.stop().await;
        assert!(manager.last_seen().is_none());

        let (_tx2, rx2) = watch::channel(poll_with_movement(Some(5)));
        let (_atx2, arx2) = mpsc::channel(8);
        manager.start(rx2, arx2).unwrap();
        wait_for(|| channel.sent().len() == 2).await;
        assert_eq!(
            manager.last_seen().unwrap().get(ReminderType::Movement),
            Some(5)
        );

        manager.stop().await;
    }

    #[tokio::test]
    async fn actions_are_handled_after_snapshot_source_closes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/ha/acknowledge"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let channel = Arc::new(RecordingChannel::default());
        let manager = manager(&server.uri(), channel.clone());
        let (snapshot_tx, snapshot_rx) = watch::channel(poll_with_movement(Some(42)));
        let (action_tx, action_rx) = mpsc::channel(8);
        manager.start(snapshot_rx, action_rx).unwrap();
        wait_for(|| channel.sent().len() == 1).await;

        drop(snapshot_tx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(manager.is_running());

        action_tx
            .send(ActionEvent::new("KHEALTH_DONE_42", None))
            .await
            .unwrap();
        wait_for(|| channel.cleared() == ["khealth-movement"]).await;

        manager.stop().await;
    }

    #[tokio::test]
    async fn stop_unregisters_listeners() {
        let channel = Arc::new(RecordingChannel::default());
        let manager = manager("http://127.0.0.1:9", channel.clone());
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (action_tx, action_rx) = mpsc::channel(8);

        manager.start(snapshot_rx, action_rx).unwrap();
        assert!(manager.is_running());
        manager.stop().await;
        assert!(!manager.is_running());

        assert!(action_tx.send(ActionEvent::new("KHEALTH_DONE_1", None)).await.is_err());
        assert!(snapshot_tx.send(poll_with_movement(Some(1))).is_err());
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_safe_without_start() {
        let manager = manager("http://127.0.0.1:9", Arc::new(RecordingChannel::default()));
        manager.stop().await;
        manager.stop().await;
        assert!(!manager.is_running());
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let manager = manager("http://127.0.0.1:9", Arc::new(RecordingChannel::default()));
        let (_tx1, rx1) = watch::channel(None);
        let (_atx1, arx1) = mpsc::channel(1);
        manager.start(rx1, arx1).unwrap();

        let (_tx2, rx2) = watch::channel(None);
        let (_atx2, arx2) = mpsc::channel(1);
        assert!(manager.start(rx2, arx2).is_err());
        manager.stop().await;
    }
}
