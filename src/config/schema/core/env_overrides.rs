use super::Config;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KHEALTH_URL")
            && !url.is_empty()
        {
            self.url = url;
        }

        if let Ok(token) = std::env::var("KHEALTH_API_TOKEN")
            && !token.is_empty()
        {
            self.api_token = token;
        }

        if let Ok(device) = std::env::var("KHEALTH_NOTIFY_DEVICE")
            && !device.is_empty()
        {
            self.notify.device = Some(device);
        }

        if let Ok(ha_url) = std::env::var("KHEALTH_HA_URL")
            && !ha_url.is_empty()
        {
            self.notify.home_assistant_url = Some(ha_url);
        }

        if let Ok(ha_token) = std::env::var("KHEALTH_HA_TOKEN")
            && !ha_token.is_empty()
        {
            self.notify.home_assistant_token = Some(ha_token);
        }

        if let Ok(port_str) = std::env::var("KHEALTH_GATEWAY_PORT")
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) = std::env::var("KHEALTH_GATEWAY_HOST")
            && !host.is_empty()
        {
            self.gateway.host = host;
        }
    }
}
