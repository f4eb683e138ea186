use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reminder categories surfaced by the kHealth service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReminderType {
    Movement,
    Hydration,
}

impl ReminderType {
    pub const ALL: [Self; 2] = [Self::Movement, Self::Hydration];

    /// Notification slot on the device. Sending with the same tag replaces in place.
    pub fn tag(self) -> String {
        format!("khealth-{self}")
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Movement => "Movement",
            Self::Hydration => "Hydration",
        }
    }
}

/// One reminder occurrence. A new occurrence always carries a new `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub reminder_type: Option<ReminderType>,
    pub message: String,
    #[serde(default)]
    pub exercise: Option<String>,
    #[serde(default)]
    pub exercise_label: String,
    #[serde(default)]
    pub suggested_count: Option<u32>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub refired_at: Option<DateTime<Utc>>,
}

impl Reminder {
    pub fn new(id: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            reminder_type: None,
            message: message.into(),
            exercise: None,
            exercise_label: String::new(),
            suggested_count: None,
            sent_at: None,
            refired_at: None,
        }
    }
}

/// One poll's complete view: every reminder type maps to its active reminder or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    reminders: BTreeMap<ReminderType, Reminder>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_fn(mut f: impl FnMut(ReminderType) -> Option<Reminder>) -> Self {
        let reminders = ReminderType::ALL
            .into_iter()
            .filter_map(|rtype| f(rtype).map(|reminder| (rtype, reminder)))
            .collect();
        Self { reminders }
    }

    pub fn with(mut self, rtype: ReminderType, reminder: Reminder) -> Self {
        self.reminders.insert(rtype, reminder);
        self
    }

    pub fn get(&self, rtype: ReminderType) -> Option<&Reminder> {
        self.reminders.get(&rtype)
    }

    pub fn reminder_id(&self, rtype: ReminderType) -> Option<i64> {
        self.get(rtype).map(|reminder| reminder.id)
    }
}

/// Verb part of an action identifier (`KHEALTH_<VERB>_<id>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ActionVerb {
    Done,
    Skip,
    Snooze,
    Alt,
}

impl ActionVerb {
    pub const ALL: [Self; 4] = [Self::Done, Self::Skip, Self::Snooze, Self::Alt];

    pub fn response(self) -> ResponseKind {
        match self {
            Self::Done => ResponseKind::Done,
            Self::Skip => ResponseKind::Skipped,
            Self::Snooze => ResponseKind::Snoozed,
            Self::Alt => ResponseKind::Alternative,
        }
    }
}

/// Decoded action identifier carried by a notification button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionToken {
    pub verb: ActionVerb,
    pub reminder_id: i64,
}

impl ActionToken {
    const PREFIX: &'static str = "KHEALTH_";

    pub fn new(verb: ActionVerb, reminder_id: i64) -> Self {
        Self { verb, reminder_id }
    }

    /// Decode `KHEALTH_(DONE|SKIP|SNOOZE|ALT)_<digits>`.
    ///
    /// Anything else belongs to some other integration and yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(Self::PREFIX)?;
        let (verb, digits) = rest.split_once('_')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let verb = verb.parse::<ActionVerb>().ok()?;
        let reminder_id = digits.parse::<i64>().ok()?;
        Some(Self { verb, reminder_id })
    }
}

impl fmt::Display for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}_{}", Self::PREFIX, self.verb, self.reminder_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResponseKind {
    Done,
    Skipped,
    Snoozed,
    Alternative,
}

/// Body of `POST /api/v1/ha/acknowledge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentRequest {
    pub reminder_id: i64,
    pub response: ResponseKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AcknowledgmentRequest {
    /// Notes are only carried for `ALT` and only when the user actually typed something.
    pub fn from_action(token: ActionToken, reply_text: Option<&str>) -> Self {
        let notes = match token.verb {
            ActionVerb::Alt => reply_text
                .filter(|text| !text.is_empty())
                .map(ToString::to_string),
            _ => None,
        };
        Self {
            reminder_id: token.reminder_id,
            response: token.verb.response(),
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_naming_convention() {
        assert_eq!(ReminderType::Movement.tag(), "khealth-movement");
        assert_eq!(ReminderType::Hydration.tag(), "khealth-hydration");
    }

    #[test]
    fn parses_every_verb() {
        for verb in ActionVerb::ALL {
            let raw = format!("KHEALTH_{verb}_42");
            assert_eq!(ActionToken::parse(&raw), Some(ActionToken::new(verb, 42)));
        }
    }

    #[test]
    fn token_display_matches_parse() {
        let token = ActionToken::new(ActionVerb::Snooze, 1337);
        assert_eq!(token.to_string(), "KHEALTH_SNOOZE_1337");
        assert_eq!(ActionToken::parse(&token.to_string()), Some(token));
    }

    #[test]
    fn rejects_foreign_and_malformed_actions() {
        for raw in [
            "",
            "SOME_OTHER_ACTION",
            "KHEALTH_DONE_",
            "KHEALTH_DONE",
            "KHEALTH_WAVE_42",
            "KHEALTH_done_42",
            "KHEALTH_DONE_42x",
            "KHEALTH_DONE_-4",
            "KHEALTH_DONE_4_2",
            "XKHEALTH_DONE_42",
            "KHEALTH_DONE_99999999999999999999999",
        ] {
            assert_eq!(ActionToken::parse(raw), None, "{raw:?} should not parse");
        }
    }

    #[test]
    fn verbs_map_to_responses() {
        assert_eq!(ActionVerb::Done.response(), ResponseKind::Done);
        assert_eq!(ActionVerb::Skip.response(), ResponseKind::Skipped);
        assert_eq!(ActionVerb::Snooze.response(), ResponseKind::Snoozed);
        assert_eq!(ActionVerb::Alt.response(), ResponseKind::Alternative);
    }

    #[test]
    fn notes_only_for_alternative_with_text() {
        let alt = ActionToken::new(ActionVerb::Alt, 42);
        let request = AcknowledgmentRequest::from_action(alt, Some("walked the dog"));
        assert_eq!(request.notes.as_deref(), Some("walked the dog"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"reminder_id": 42, "response": "alternative", "notes": "walked the dog"})
        );

        let empty = AcknowledgmentRequest::from_action(alt, Some(""));
        assert_eq!(empty.notes, None);

        let done = ActionToken::new(ActionVerb::Done, 42);
        let request = AcknowledgmentRequest::from_action(done, Some("ignored"));
        assert_eq!(request.notes, None);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"reminder_id": 42, "response": "done"})
        );
    }

    #[test]
    fn snapshot_from_fn_only_keeps_present_types() {
        let snapshot = Snapshot::from_fn(|rtype| {
            (rtype == ReminderType::Hydration).then(|| Reminder::new(9, "Drink water"))
        });
        assert_eq!(snapshot.reminder_id(ReminderType::Movement), None);
        assert_eq!(snapshot.reminder_id(ReminderType::Hydration), Some(9));
    }
}
