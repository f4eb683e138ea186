use crate::config::Config;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tokio::time::Duration;

#[derive(Debug, Clone, serde::Serialize)]
pub(super) struct DaemonStatus {
    #[serde(flatten)]
    snapshot: serde_json::Map<String, serde_json::Value>,
    written_at: String,
}

pub(super) fn state_file_path(config: &Config) -> PathBuf {
    config
        .config_path
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join("daemon_state.json")
}

async fn write_state(path: &Path) -> std::io::Result<()> {
    let mut json = crate::diagnostics::health::snapshot_json();
    if let Some(snapshot) = json.as_object().cloned() {
        let status = DaemonStatus {
            snapshot,
            written_at: Utc::now().to_rfc3339(),
        };
        json = serde_json::to_value(status).unwrap_or_else(|_| serde_json::json!({}));
    }

    let data = serde_json::to_vec_pretty(&json).unwrap_or_else(|_| b"{}".to_vec());
    tokio::fs::write(path, data).await
}

pub(super) fn spawn_state_writer(path: PathBuf) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(parent) = path.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!(%error, "failed to create state file directory");
        }

        let mut interval = tokio::time::interval(Duration::from_secs(super::STATUS_FLUSH_SECONDS));
        loop {
            interval.tick().await;
            if let Err(error) = write_state(&path).await {
                tracing::warn!(%error, "failed to write daemon state file");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn state_file_path_uses_config_directory() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            config_path: tmp.path().join("config.toml"),
            ..Config::default()
        };

        assert_eq!(state_file_path(&config), tmp.path().join("daemon_state.json"));
    }

    #[tokio::test]
    async fn writer_flushes_health_snapshot_immediately() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("daemon_state.json");
        crate::diagnostics::health::mark_component_ok("state-writer-test");

        let handle = spawn_state_writer(path.clone());
        for _ in 0..100 {
            if path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.get("written_at").is_some());
        assert_eq!(json["components"]["state-writer-test"]["status"], "ok");
    }
}
