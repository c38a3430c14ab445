use crate::errors::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Content source configuration (pull variant).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SourceConfig {
    /// Endpoint polled for raw content
    pub url: String,
    /// Polling interval in seconds (default: 5)
    pub poll_interval: Option<u64>,
}

impl SourceConfig {
    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval.unwrap_or(5)
    }
}

/// API server configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: Option<String>,
    /// Port number for the API server
    pub port: u16,
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        let host = self.host.as_deref().unwrap_or("0.0.0.0");
        format!("{}:{}", host, self.port)
    }
}

/// Subscriber registry configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotifierConfig {
    /// Path of the persisted subscriber file
    pub subscriber_file: String,
    /// Per-delivery timeout in seconds (default: 10)
    pub delivery_timeout: Option<u64>,
}

impl NotifierConfig {
    pub fn delivery_timeout_secs(&self) -> u64 {
        self.delivery_timeout.unwrap_or(10)
    }
}

/// Service configuration loaded once at startup from a TOML file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Service name used in logs
    pub name: String,
    /// Pull source; optional so a push-only deployment can omit it
    pub source: Option<SourceConfig>,
    pub api: ApiConfig,
    pub notifier: NotifierConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::ReadFailed(e.into()))?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(source) = &self.source {
            if source.url.is_empty() {
                return Err(ConfigError::InvalidValue("source.url is empty".to_string()).into());
            }
            if source.poll_interval_secs() == 0 {
                return Err(
                    ConfigError::InvalidValue("source.poll_interval must be > 0".to_string())
                        .into(),
                );
            }
        }
        if self.notifier.subscriber_file.is_empty() {
            return Err(
                ConfigError::InvalidValue("notifier.subscriber_file is empty".to_string()).into(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_config_success() {
        let file = write_config(
            r#"
            name = "feedwatch"

            [source]
            url = "http://localhost:8000/content"
            poll_interval = 2

            [api]
            port = 8080

            [notifier]
            subscriber_file = "/tmp/subscribers.json"
            delivery_timeout = 5
        "#,
        );

        let config = Config::load(file.path()).expect("config should load");
        assert_eq!(config.name, "feedwatch");
        assert_eq!(config.source.as_ref().unwrap().poll_interval_secs(), 2);
        assert_eq!(config.api.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.notifier.delivery_timeout_secs(), 5);
    }

    #[test]
    fn test_load_config_defaults() {
        let file = write_config(
            r#"
            name = "feedwatch"

            [source]
            url = "http://localhost:8000/content"

            [api]
            port = 8080

            [notifier]
            subscriber_file = "subscribers.json"
        "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.source.as_ref().unwrap().poll_interval_secs(), 5);
        assert_eq!(config.notifier.delivery_timeout_secs(), 10);
    }

    #[test]
    fn test_load_config_not_found() {
        let result = Config::load("non_existent_file.toml");
        assert!(result.is_err());
        assert!(result.err().unwrap().is_config());
    }

    #[test]
    fn test_load_config_rejects_zero_interval() {
        let file = write_config(
            r#"
            name = "feedwatch"

            [source]
            url = "http://localhost:8000/content"
            poll_interval = 0

            [api]
            port = 8080

            [notifier]
            subscriber_file = "subscribers.json"
        "#,
        );

        assert!(Config::load(file.path()).is_err());
    }
}
