use khealth_bridge::Config;
use khealth_bridge::reminders::ReminderType;
use khealth_bridge::remote::PollResponse;

fn pending_lines(poll: &PollResponse) -> Vec<String> {
    let pending = ReminderType::ALL.into_iter().find_map(|rtype| {
        poll.active_reminders
            .get(&rtype)
            .and_then(Option::as_ref)
            .map(|reminder| (rtype, reminder))
    });

    let Some((rtype, reminder)) = pending else {
        return vec!["Reminder pending:  no".to_string()];
    };

    let mut lines = vec![
        "Reminder pending:  yes".to_string(),
        format!("  Type:      {}", rtype.label()),
    ];
    if !reminder.exercise_label.is_empty() {
        lines.push(format!("  Exercise:  {}", reminder.exercise_label));
    }
    lines.push(format!("  Message:   {}", reminder.message));
    if let Some(sent_at) = reminder.sent_at {
        lines.push(format!("  Sent at:   {}", sent_at.to_rfc3339()));
    }
    lines
}

pub fn render_status(config: &Config, poll: &PollResponse) -> String {
    let mut lines = vec![
        "◆ kHealth status".to_string(),
        String::new(),
        format!("Version:   {}", env!("CARGO_PKG_VERSION")),
        format!("Config:    {}", config.config_path.display()),
        format!("kHealth:   {}", config.api_base_url()),
        String::new(),
    ];

    lines.extend(pending_lines(poll));
    lines.push(String::new());

    for rtype in ReminderType::ALL {
        let today = poll
            .today
            .get(&rtype)
            .map_or_else(|| "-".to_string(), |p| format!("{}/{}", p.done, p.total));
        let streak = poll
            .streaks
            .get(&rtype)
            .map_or_else(|| "-".to_string(), ToString::to_string);
        lines.push(format!(
            "{:<10} today {today:<6} streak {streak}",
            rtype.label()
        ));
    }
    lines.push(String::new());

    match &poll.schedule {
        Some(schedule) => {
            let state = if schedule.in_window { "active" } else { "inactive" };
            let timezone = schedule.timezone.as_deref().unwrap_or("local time");
            let detail = match (&schedule.window_start, &schedule.window_end) {
                (Some(start), Some(end)) => format!("{start}-{end} {timezone}"),
                _ => timezone.to_string(),
            };
            lines.push(format!("Schedule:  {state} ({detail})"));
        }
        None => lines.push("Schedule:  unknown".to_string()),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn poll(value: serde_json::Value) -> PollResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn renders_pending_reminder_progress_and_schedule() {
        let poll = poll(json!({
            "active_reminders": {
                "movement": null,
                "hydration": {
                    "id": 8,
                    "type": "hydration",
                    "message": "Drink a glass of water",
                    "exercise_label": "Water",
                    "sent_at": "2026-03-01T09:00:00Z"
                }
            },
            "today": {"movement": {"done": 3, "total": 8}},
            "streaks": {"movement": 4, "hydration": 0},
            "schedule": {
                "in_window": true,
                "window_start": "09:00",
                "window_end": "18:00",
                "timezone": "Europe/Berlin"
            }
        }));

        let out = render_status(&Config::default(), &poll);
        assert!(out.contains("Reminder pending:  yes"));
        assert!(out.contains("Type:      Hydration"));
        assert!(out.contains("Exercise:  Water"));
        assert!(out.contains("Drink a glass of water"));
        assert!(out.contains("2026-03-01T09:00:00+00:00"));
        assert!(out.contains("Movement   today 3/8    streak 4"));
        assert!(out.contains("Hydration  today -      streak 0"));
        assert!(out.contains("Schedule:  active (09:00-18:00 Europe/Berlin)"));
    }

    #[test]
    fn renders_idle_state() {
        let poll = poll(json!({
            "active_reminders": {"movement": null, "hydration": null},
            "schedule": {"in_window": false}
        }));

        let out = render_status(&Config::default(), &poll);
        assert!(out.contains("Reminder pending:  no"));
        assert!(out.contains("Schedule:  inactive (local time)"));
    }
}
