use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const GENERATE_ENDPOINT: &str = "/api/generate";
pub const DEFAULT_TEXT_MODEL: &str = "black-forest-labs/flux-1.1-pro";
pub const DEFAULT_REPLICATE_URL: &str = "https://api.replicate.com/v1";

/// Reported by the client constructor and by the generate endpoint when no token is set.
pub const MISSING_TOKEN_DETAIL: &str =
    "REPLICATE_API_TOKEN is not set. Provide it in your environment.";

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub base_url: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_token: Option<String>,
    pub model: String,
    pub image_to_image_model: Option<String>,
    pub base_url: String,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub studio: StudioConfig,
    pub server: ServerConfig,
    pub replicate: ReplicateConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        StudioConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: GENERATE_ENDPOINT.to_string(),
        }
    }
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("STUDIO_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        StudioConfig {
            base_url,
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Absolute URL of the generate endpoint.
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: "static".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);
        let static_dir = env::var("STATIC_DIR").unwrap_or(defaults.static_dir);

        ServerConfig {
            host,
            port,
            static_dir,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<String>) -> Self {
        self.static_dir = dir.into();
        self
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        ReplicateConfig {
            api_token: None,
            model: DEFAULT_TEXT_MODEL.to_string(),
            image_to_image_model: None,
            base_url: DEFAULT_REPLICATE_URL.to_string(),
            poll_interval: Duration::from_millis(1000),
        }
    }
}

impl ReplicateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());

        ReplicateConfig {
            api_token: non_empty("REPLICATE_API_TOKEN"),
            model: non_empty("REPLICATE_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_to_image_model: non_empty("REPLICATE_IMAGE_TO_IMAGE_MODEL"),
            base_url: non_empty("REPLICATE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_REPLICATE_URL.to_string()),
            ..Default::default()
        }
    }

    pub fn with_credentials(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_image_to_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_to_image_model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            studio: StudioConfig::from_env(),
            server: ServerConfig::from_env(),
            replicate: ReplicateConfig::from_env(),
        }
    }

    pub fn with_studio(mut self, config: StudioConfig) -> Self {
        self.studio = config;
        self
    }

    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    pub fn with_replicate(mut self, config: ReplicateConfig) -> Self {
        self.replicate = config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_without_double_slash() {
        let config = StudioConfig::new().with_base_url("http://localhost:9000/");
        assert_eq!(config.endpoint_url(), "http://localhost:9000/api/generate");

        let config = StudioConfig::new().with_base_url("http://localhost:9000");
        assert_eq!(config.endpoint_url(), "http://localhost:9000/api/generate");
    }

    #[test]
    fn replicate_defaults() {
        let config = ReplicateConfig::new();
        assert!(config.api_token.is_none());
        assert_eq!(config.model, DEFAULT_TEXT_MODEL);
        assert!(config.image_to_image_model.is_none());
    }

    #[test]
    fn builders_override_defaults() {
        let config = Config::new()
            .with_server(ServerConfig::new().with_port(9100).with_static_dir("web"))
            .with_replicate(ReplicateConfig::new().with_credentials("r8_token"));
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.static_dir, "web");
        assert_eq!(config.replicate.api_token.as_deref(), Some("r8_token"));
    }
}
