use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{OnceLock, RwLock};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentStatus {
    Ok,
    Starting,
    /// Failing repeatedly; still being retried.
    Degraded,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub updated_at: String,
    pub last_ok: Option<String>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub restart_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Worst component status, `ok` when nothing is registered yet.
    pub status: ComponentStatus,
    pub pid: u32,
    pub updated_at: String,
    pub uptime_seconds: u64,
    pub components: BTreeMap<String, ComponentHealth>,
}

struct HealthRegistry {
    started_at: Instant,
    components: RwLock<BTreeMap<String, ComponentHealth>>,
}

static REGISTRY: OnceLock<HealthRegistry> = OnceLock::new();

fn registry() -> &'static HealthRegistry {
    REGISTRY.get_or_init(|| HealthRegistry {
        started_at: Instant::now(),
        components: RwLock::new(BTreeMap::new()),
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn upsert_component<F, R>(component: &str, update: F) -> Option<R>
where
    F: FnOnce(&mut ComponentHealth) -> R,
{
    let mut map = registry().components.write().ok()?;
    let now = now_rfc3339();
    let entry = map
        .entry(component.to_string())
        .or_insert_with(|| ComponentHealth {
            status: ComponentStatus::Starting,
            updated_at: now.clone(),
            last_ok: None,
            last_error: None,
            consecutive_failures: 0,
            restart_count: 0,
        });
    let result = update(entry);
    entry.updated_at = now;
    Some(result)
}

pub fn mark_component_ok(component: &str) {
    upsert_component(component, |entry| {
        entry.status = ComponentStatus::Ok;
        entry.last_ok = Some(now_rfc3339());
        entry.last_error = None;
        entry.consecutive_failures = 0;
    });
}

/// Record a failure and return the run of consecutive failures including this one.
#[allow(clippy::needless_pass_by_value)]
pub fn mark_component_error(component: &str, error: impl ToString) -> u32 {
    let err = error.to_string();
    upsert_component(component, move |entry| {
        entry.status = ComponentStatus::Error;
        entry.last_error = Some(err);
        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        entry.consecutive_failures
    })
    .unwrap_or(0)
}

/// Still running, but failing repeatedly. Cleared by the next `mark_component_ok`.
pub fn mark_component_degraded(component: &str) {
    upsert_component(component, |entry| {
        entry.status = ComponentStatus::Degraded;
    });
}

pub fn bump_component_restart(component: &str) {
    upsert_component(component, |entry| {
        entry.restart_count = entry.restart_count.saturating_add(1);
    });
}

pub fn component(name: &str) -> Option<ComponentHealth> {
    registry()
        .components
        .read()
        .ok()
        .and_then(|map| map.get(name).cloned())
}

pub fn snapshot() -> HealthSnapshot {
    let components = registry()
        .components
        .read()
        .map_or_else(|_| BTreeMap::new(), |map| map.clone());
    let status = components
        .values()
        .map(|entry| entry.status)
        .max()
        .unwrap_or(ComponentStatus::Ok);

    HealthSnapshot {
        status,
        pid: std::process::id(),
        updated_at: now_rfc3339(),
        uptime_seconds: registry().started_at.elapsed().as_secs(),
        components,
    }
}

pub fn snapshot_json() -> serde_json::Value {
    serde_json::to_value(snapshot()).unwrap_or_else(|_| {
        serde_json::json!({
            "status": "error",
            "message": "failed to serialize health snapshot"
        })
    })
}
