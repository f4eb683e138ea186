//! Reminder notification lifecycle: per-type reconciliation of poll snapshots
//! against what the device currently shows, and acknowledgment of button presses.

pub mod ack;
mod last_seen;
pub mod manager;
pub mod reconcile;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;

pub use ack::{AcknowledgmentMachine, ActionOutcome};
pub use last_seen::LastSeen;
pub use manager::{ActionEvent, NotificationManager, SnapshotReceiver};
pub use reconcile::{Effect, ReconciliationEngine, reminder_notification};
pub use types::{
    AcknowledgmentRequest, ActionToken, ActionVerb, Reminder, ReminderType, ResponseKind, Snapshot,
};
