use super::Config;
use crate::config::NotifyBackend;
use crate::error::ConfigError;

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl Config {
    /// Check everything the runtime needs before any network call is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "`url` is empty; set it in {} or via KHEALTH_URL",
                self.config_path.display()
            )));
        }
        let parsed = url::Url::parse(self.url.trim())
            .map_err(|e| ConfigError::Validation(format!("`url` is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "`url` must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "`api_token` is empty; set it in config or via KHEALTH_API_TOKEN".into(),
            ));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "`poll.interval_secs` must be at least 1".into(),
            ));
        }

        if self.notify.backend == NotifyBackend::HomeAssistant {
            let missing: Vec<&str> = [
                ("notify.home_assistant_url", self.notify.home_assistant_url.as_deref()),
                ("notify.home_assistant_token", self.notify.home_assistant_token.as_deref()),
                ("notify.device", self.notify.device.as_deref()),
            ]
            .into_iter()
            .filter(|(_, value)| is_blank(*value))
            .map(|(name, _)| name)
            .collect();
            if !missing.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "home_assistant backend requires {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// Base URL without the trailing slash users tend to paste.
    pub fn api_base_url(&self) -> &str {
        self.url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config {
            url: "https://khealth.example.com/".into(),
            api_token: "tok".into(),
            ..Config::default()
        };
        config.notify.home_assistant_url = Some("http://ha.local:8123".into());
        config.notify.home_assistant_token = Some("ha".into());
        config.notify.device = Some("mobile_app_pixel".into());
        config
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(valid_config().api_base_url(), "https://khealth.example.com");
    }

    #[test]
    fn empty_url_is_rejected() {
        let config = Config {
            url: "  ".into(),
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("`url` is empty"));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let config = Config {
            url: "ftp://khealth.example.com".into(),
            ..valid_config()
        };
        assert!(config.validate().unwrap_err().to_string().contains("http or https"));
    }

    #[test]
    fn missing_token_is_rejected() {
        let config = Config {
            api_token: String::new(),
            ..valid_config()
        };
        assert!(config.validate().unwrap_err().to_string().contains("api_token"));
    }

    #[test]
    fn home_assistant_backend_lists_missing_fields() {
        let mut config = valid_config();
        config.notify.device = None;
        config.notify.home_assistant_token = Some(String::new());
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("notify.device"));
        assert!(message.contains("notify.home_assistant_token"));
        assert!(!message.contains("notify.home_assistant_url"));
    }

    #[test]
    fn log_backend_needs_no_device() {
        let mut config = valid_config();
        config.notify.backend = NotifyBackend::Log;
        config.notify.device = None;
        assert!(config.validate().is_ok());
    }
}
