use super::traits::{CLEAR_NOTIFICATION, Notification, NotificationChannel};
use crate::error::TransportError;
use crate::remote::http_client::build_client_with_timeout;
use serde_json::{Map, Value, json};
use std::future::Future;
use std::pin::Pin;

/// Home Assistant `notify.<device>` service, as exposed by the Companion App.
///
/// Calls `POST <base>/api/services/notify/<device>` with a long-lived access token.
pub struct HomeAssistantChannel {
    api_url: String,
    service_url: String,
    token: String,
    client: reqwest::Client,
}

impl HomeAssistantChannel {
    pub fn new(base_url: &str, token: &str, device: &str, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let device = device.strip_prefix("notify.").unwrap_or(device);
        Self {
            api_url: format!("{base_url}/api/"),
            service_url: format!("{base_url}/api/services/notify/{device}"),
            token: token.to_string(),
            client: build_client_with_timeout(timeout_secs),
        }
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    async fn call_service(&self, payload: &Value) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.service_url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Send {
                channel: self.name().to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Send {
                channel: self.name().to_string(),
                message: format!("notify service returned {status}"),
            }
            .into());
        }
        Ok(())
    }
}

/// Companion App service payload. Tag and actions live under `data`.
pub(crate) fn service_payload(notification: &Notification) -> Value {
    let mut payload = Map::new();
    payload.insert("message".into(), json!(notification.message));
    payload.insert("title".into(), json!(notification.title));

    let mut data = Map::new();
    if let Some(tag) = &notification.tag {
        data.insert("tag".into(), json!(tag));
    }
    if let Some(group) = &notification.group {
        data.insert("group".into(), json!(group));
    }
    if !notification.actions.is_empty() {
        let actions: Vec<Value> = notification
            .actions
            .iter()
            .map(|action| {
                let mut entry = Map::new();
                entry.insert("action".into(), json!(action.id));
                entry.insert("title".into(), json!(action.label));
                if let Some(input) = &action.text_input {
                    entry.insert("behavior".into(), json!("textInput"));
                    entry.insert("textInputButtonTitle".into(), json!(input.button_title));
                    entry.insert("textInputPlaceholder".into(), json!(input.placeholder));
                }
                Value::Object(entry)
            })
            .collect();
        data.insert("actions".into(), Value::Array(actions));
    }
    if !data.is_empty() {
        payload.insert("data".into(), Value::Object(data));
    }

    Value::Object(payload)
}

pub(crate) fn clear_payload(tag: &str) -> Value {
    json!({
        "message": CLEAR_NOTIFICATION,
        "data": {"tag": tag},
    })
}

impl NotificationChannel for HomeAssistantChannel {
    fn name(&self) -> &str {
        "home_assistant"
    }

    fn send<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.call_service(&service_payload(notification)).await })
    }

    fn clear<'a>(
        &'a self,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { self.call_service(&clear_payload(tag)).await })
    }

    /// `GET /api/` answers 200 only for a reachable instance and a valid token.
    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .get(&self.api_url)
                .bearer_auth(&self.token)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false)
        })
    }
}
