//! Wire types for the kHealth HA API (`/api/v1/ha/*`, `/api/v1/me`).

use crate::reminders::{Reminder, ReminderType, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full body of `GET /api/v1/ha/poll`.
///
/// Only `active_reminders` drives notifications; the remaining sections feed
/// the status view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    #[serde(default)]
    pub active_reminders: BTreeMap<ReminderType, Option<Reminder>>,
    #[serde(default)]
    pub today: BTreeMap<ReminderType, DailyProgress>,
    #[serde(default)]
    pub streaks: BTreeMap<ReminderType, u32>,
    #[serde(default)]
    pub schedule: Option<ScheduleWindow>,
}

impl PollResponse {
    /// Project the poll body onto the reminder snapshot the engine diffs.
    ///
    /// Types missing from the payload are treated as having no active reminder.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_fn(|rtype| self.active_reminders.get(&rtype).cloned().flatten())
    }

    /// First pending reminder in reminder-type order.
    pub fn first_pending(&self) -> Option<&Reminder> {
        ReminderType::ALL
            .iter()
            .find_map(|rtype| self.active_reminders.get(rtype).and_then(Option::as_ref))
    }

    pub fn any_pending(&self) -> bool {
        self.first_pending().is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub done: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    #[serde(default)]
    pub in_window: bool,
    #[serde(default)]
    pub window_start: Option<String>,
    #[serde(default)]
    pub window_end: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Body of `GET /api/v1/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Conclusive results of `POST /api/v1/ha/acknowledge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// 200: the response was recorded.
    Recorded,
    /// 409: another surface already acknowledged this reminder.
    AlreadyAcknowledged,
}
