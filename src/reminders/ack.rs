use super::last_seen::LastSeen;
use super::reconcile::dismiss;
use super::types::{AcknowledgmentRequest, ActionToken, ReminderType};
use crate::remote::{AckOutcome, KhealthClient};
use crate::transport::channels::{Notification, NotificationChannel};
use std::sync::Arc;

pub const ERROR_TITLE: &str = "kHealth Error";
pub const ERROR_MESSAGE: &str = "Failed to record response. Please try again.";

/// What became of one action event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Not a kHealth action; nothing was sent anywhere.
    Ignored,
    /// The service gave a conclusive answer. `dismissed` names the slot that
    /// was cleared, if the reminder was still the one on display.
    Acknowledged {
        outcome: AckOutcome,
        dismissed: Option<ReminderType>,
    },
    /// Submission failed; the user was told and the notification stays up.
    Failed,
}

/// Turns notification button presses into acknowledgments.
pub struct AcknowledgmentMachine {
    client: KhealthClient,
    channel: Arc<dyn NotificationChannel>,
    last_seen: Arc<LastSeen>,
}

impl AcknowledgmentMachine {
    pub fn new(
        client: KhealthClient,
        channel: Arc<dyn NotificationChannel>,
        last_seen: Arc<LastSeen>,
    ) -> Self {
        Self {
            client,
            channel,
            last_seen,
        }
    }

    /// Handle one action event.
    ///
    /// The reminder id comes from the action identifier itself, so acks for
    /// reminders that were never (or are no longer) displayed are still
    /// submitted. Only the dismiss depends on last-seen.
    pub async fn on_action(&self, raw: &str, reply_text: Option<&str>) -> ActionOutcome {
        let Some(token) = ActionToken::parse(raw) else {
            tracing::trace!(action = raw, "ignoring non-kHealth action");
            return ActionOutcome::Ignored;
        };

        let request = AcknowledgmentRequest::from_action(token, reply_text);
        match self.client.acknowledge(&request).await {
            Ok(outcome) => {
                match outcome {
                    AckOutcome::Recorded => tracing::info!(
                        reminder_id = token.reminder_id,
                        response = %request.response,
                        "acknowledgment recorded"
                    ),
                    AckOutcome::AlreadyAcknowledged => tracing::debug!(
                        reminder_id = token.reminder_id,
                        "reminder already acknowledged elsewhere"
                    ),
                }
                let dismissed = self.last_seen.type_for(token.reminder_id);
                if let Some(rtype) = dismissed {
                    dismiss(self.channel.as_ref(), rtype).await;
                }
                ActionOutcome::Acknowledged { outcome, dismissed }
            }
            Err(error) => {
                tracing::error!(
                    reminder_id = token.reminder_id,
                    response = %request.response,
                    "failed to record acknowledgment: {error}"
                );
                self.notify_failure().await;
                ActionOutcome::Failed
            }
        }
    }

    async fn notify_failure(&self) {
        let notification = Notification::plain(ERROR_TITLE, ERROR_MESSAGE);
        if let Err(error) = self.channel.send(&notification).await {
            tracing::warn!(
                channel = self.channel.name(),
                "failed to deliver error notification: {error:#}"
            );
        }
    }
}
