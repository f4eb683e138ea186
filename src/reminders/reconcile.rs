use super::last_seen::{LastSeen, LastSeenIds};
use super::types::{ActionToken, ActionVerb, Reminder, ReminderType, Snapshot};
use crate::transport::channels::{Notification, NotificationAction, NotificationChannel, TextInput};
use std::sync::Arc;

pub const NOTIFICATION_TITLE: &str = "kHealth";
pub const NOTIFICATION_GROUP: &str = "khealth";

/// Channel call decided by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// New reminder, or a different id for a type that was already notified.
    /// The tag-based replace swaps content on the device; no dismiss precedes it.
    Send {
        rtype: ReminderType,
        reminder: Reminder,
    },
    /// The type's reminder went away with no replacement.
    Dismiss { rtype: ReminderType },
}

/// Diff `snapshot` against last-seen ids and record the new ids.
///
/// Pure apart from the writes into `ids`; callers perform the returned effects.
pub(super) fn plan(ids: &mut LastSeenIds<'_>, snapshot: &Snapshot) -> Vec<Effect> {
    let mut effects = Vec::new();
    for rtype in ReminderType::ALL {
        let old_id = ids.get(rtype);
        match snapshot.get(rtype) {
            Some(reminder) if Some(reminder.id) != old_id => {
                ids.set(rtype, Some(reminder.id));
                effects.push(Effect::Send {
                    rtype,
                    reminder: reminder.clone(),
                });
            }
            None if old_id.is_some() => {
                ids.set(rtype, None);
                effects.push(Effect::Dismiss { rtype });
            }
            _ => {}
        }
    }
    effects
}

/// Actionable notification for `reminder`. Every button id embeds the reminder id
/// so the acknowledgment path needs no lookup state to recover it.
pub fn reminder_notification(rtype: ReminderType, reminder: &Reminder) -> Notification {
    let action_id = |verb| ActionToken::new(verb, reminder.id).to_string();
    Notification {
        tag: Some(rtype.tag()),
        group: Some(NOTIFICATION_GROUP.to_string()),
        title: NOTIFICATION_TITLE.to_string(),
        message: reminder.message.clone(),
        actions: vec![
            NotificationAction::simple(action_id(ActionVerb::Done), "Done"),
            NotificationAction::simple(action_id(ActionVerb::Skip), "Skip"),
            NotificationAction::simple(action_id(ActionVerb::Snooze), "Snooze"),
            NotificationAction::with_text_input(
                action_id(ActionVerb::Alt),
                "Alternative...",
                TextInput {
                    button_title: "Send".into(),
                    placeholder: "What did you do instead?".into(),
                },
            ),
        ],
    }
}

/// Clear the notification slot for `rtype`. Failures are logged, never raised.
pub(super) async fn dismiss(channel: &dyn NotificationChannel, rtype: ReminderType) {
    let tag = rtype.tag();
    match channel.clear(&tag).await {
        Ok(()) => tracing::debug!(reminder_type = %rtype, tag, "notification dismissed"),
        Err(error) => tracing::warn!(
            reminder_type = %rtype,
            tag,
            channel = channel.name(),
            "failed to dismiss kHealth notification: {error:#}"
        ),
    }
}

/// Turns successive snapshots into send/replace/dismiss calls.
pub struct ReconciliationEngine {
    last_seen: Arc<LastSeen>,
    channel: Arc<dyn NotificationChannel>,
}

impl ReconciliationEngine {
    pub fn new(last_seen: Arc<LastSeen>, channel: Arc<dyn NotificationChannel>) -> Self {
        Self { last_seen, channel }
    }

    /// Reconcile one delivered snapshot and return the effects that were issued.
    ///
    /// The diff and the last-seen writes happen under one lock acquisition; the
    /// channel calls run afterwards. A failed call does not roll back last-seen:
    /// the next snapshot diffs against what was decided, not what was delivered.
    pub async fn on_snapshot(&self, snapshot: &Snapshot) -> Vec<Effect> {
        let effects = self.last_seen.update(|ids| plan(ids, snapshot));

        for effect in &effects {
            match effect {
                Effect::Send { rtype, reminder } => self.send(*rtype, reminder).await,
                Effect::Dismiss { rtype } => dismiss(self.channel.as_ref(), *rtype).await,
            }
        }
        effects
    }

    async fn send(&self, rtype: ReminderType, reminder: &Reminder) {
        let notification = reminder_notification(rtype, reminder);
        match self.channel.send(&notification).await {
            Ok(()) => tracing::info!(
                reminder_type = %rtype,
                reminder_id = reminder.id,
                "kHealth notification sent"
            ),
            Err(error) => tracing::warn!(
                reminder_type = %rtype,
                reminder_id = reminder.id,
                channel = self.channel.name(),
                "failed to send kHealth notification: {error:#}"
            ),
        }
    }
}
