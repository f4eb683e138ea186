use super::{HomeAssistantChannel, LogChannel, NotificationChannel};
use crate::config::{Config, NotifyBackend};
use crate::error::ConfigError;
use std::sync::Arc;

/// Build the notification channel selected by `[notify] backend`.
pub fn build_channel(config: &Config) -> anyhow::Result<Arc<dyn NotificationChannel>> {
    let notify = &config.notify;
    match notify.backend {
        NotifyBackend::Log => Ok(Arc::new(LogChannel::new())),
        NotifyBackend::HomeAssistant => {
            let required = |value: &Option<String>, key: &str| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(ToString::to_string)
                    .ok_or_else(|| ConfigError::Validation(format!("notify.{key} is required")))
            };
            let base_url = required(&notify.home_assistant_url, "home_assistant_url")?;
            let token = required(&notify.home_assistant_token, "home_assistant_token")?;
            let device = required(&notify.device, "device")?;

            Ok(Arc::new(HomeAssistantChannel::new(
                &base_url,
                &token,
                &device,
                config.poll.timeout_secs,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifyConfig;

    #[test]
    fn log_backend_needs_no_settings() {
        let mut config = Config::default();
        config.notify.backend = NotifyBackend::Log;
        assert_eq!(build_channel(&config).unwrap().name(), "log");
    }

    #[test]
    fn home_assistant_backend_requires_device() {
        let mut config = Config::default();
        config.notify = NotifyConfig {
            backend: NotifyBackend::HomeAssistant,
            home_assistant_url: Some("http://ha.local:8123".into()),
            home_assistant_token: Some("tok".into()),
            device: None,
        };
        let err = build_channel(&config).err().unwrap();
        assert!(err.to_string().contains("notify.device"), "{err}");

        config.notify.device = Some("mobile_app_pixel".into());
        assert_eq!(build_channel(&config).unwrap().name(), "home_assistant");
    }
}
