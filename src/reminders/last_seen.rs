use super::types::ReminderType;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Reminder id currently represented by a live device notification, per type.
///
/// One instance per connection, shared by handle between the reconciliation
/// engine (sole writer) and the acknowledgment path (reader). The lock is only
/// ever held for a decide-and-mutate step, never across a network call.
#[derive(Debug, Default)]
pub struct LastSeen {
    ids: Mutex<BTreeMap<ReminderType, i64>>,
}

impl LastSeen {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<ReminderType, i64>> {
        // The map holds plain ids; a panic mid-update cannot leave it torn.
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, rtype: ReminderType) -> Option<i64> {
        self.lock().get(&rtype).copied()
    }

    /// The type whose outstanding notification carries `reminder_id`.
    ///
    /// Id spaces are disjoint across types, so the first match is the only one.
    pub fn type_for(&self, reminder_id: i64) -> Option<ReminderType> {
        self.lock()
            .iter()
            .find_map(|(rtype, id)| (*id == reminder_id).then_some(*rtype))
    }

    pub fn entries(&self) -> BTreeMap<ReminderType, i64> {
        self.lock().clone()
    }

    /// Run `f` with exclusive access. Reserved for the reconciliation engine.
    pub(super) fn update<R>(&self, f: impl FnOnce(&mut LastSeenIds<'_>) -> R) -> R {
        let mut guard = self.lock();
        let mut ids = LastSeenIds { ids: &mut guard };
        f(&mut ids)
    }
}

/// Mutable view handed out by [`LastSeen::update`].
pub(super) struct LastSeenIds<'a> {
    ids: &'a mut BTreeMap<ReminderType, i64>,
}

impl LastSeenIds<'_> {
    pub(super) fn get(&self, rtype: ReminderType) -> Option<i64> {
        self.ids.get(&rtype).copied()
    }

    pub(super) fn set(&mut self, rtype: ReminderType, id: Option<i64>) {
        match id {
            Some(id) => {
                self.ids.insert(rtype, id);
            }
            None => {
                self.ids.remove(&rtype);
            }
        }
    }
}
