use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotifyBackend {
    /// Home Assistant `notify.mobile_app_*` service
    #[default]
    HomeAssistant,
    /// Write notifications to the log only
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub backend: NotifyBackend,
    /// Home Assistant base URL, e.g. `http://homeassistant.local:8123`
    #[serde(default)]
    pub home_assistant_url: Option<String>,
    /// Long-lived Home Assistant access token
    #[serde(default)]
    pub home_assistant_token: Option<String>,
    /// Notify service name of the target device, e.g. `mobile_app_pixel_8`
    #[serde(default)]
    pub device: Option<String>,
}
