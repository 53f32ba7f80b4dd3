use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

const CONFIG_PATHS: [&str; 2] = ["config.toml", "config.default.toml"];

impl Config {
    /// Loads `config.toml`, falling back to `config.default.toml`, then applies
    /// credential overrides from the environment. Returns the path used.
    pub fn load() -> AnyResult<(Self, &'static str)> {
        let config_path = CONFIG_PATHS
            .into_iter()
            .find(|p| std::path::Path::new(p).exists())
            .ok_or("config.toml or config.default.toml not found")?;

        let config_str = std::fs::read_to_string(config_path)?;
        if config_str.trim().is_empty() {
            return Err(format!("{} is empty", config_path).into());
        }

        let mut config = Self::from_toml_str(&config_str)?;
        config.spotify.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, config_path))
    }

    pub fn from_toml_str(source: &str) -> AnyResult<Self> {
        Ok(toml::from_str(source)?)
    }

    fn validate(&self) -> AnyResult<()> {
        if self.spotify.client_id.is_empty() || self.spotify.client_secret.is_empty() {
            return Err(
                "spotify.client_id and spotify.client_secret must be set \
                 (config file or SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET)"
                    .into(),
            );
        }
        if self.stream.base_delay_ms == 0 || self.stream.max_delay_ms < self.stream.base_delay_ms {
            return Err("stream.max_delay_ms must be >= stream.base_delay_ms > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [spotify]
            client_id = "id"
            client_secret = "secret"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.spotify.api_base, "https://api.spotify.com/v1");
        assert_eq!(config.spotify.accounts_base, "https://accounts.spotify.com");
        assert_eq!(config.stream.base_delay_ms, 5_000);
        assert_eq!(config.stream.max_delay_ms, 60_000);
        assert_eq!(config.stream.refresh_margin_ms, 60_000);
        assert!(config.logging.file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = Config::from_toml_str("").expect("empty config should parse");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_delays_rejected() {
        let config = Config::from_toml_str(
            r#"
            [spotify]
            client_id = "id"
            client_secret = "secret"

            [stream]
            base_delay_ms = 10000
            max_delay_ms = 5000
            "#,
        )
        .expect("config should parse");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            cors_origins = ["http://localhost:5173"]

            [spotify]
            client_id = "id"
            client_secret = "secret"
            api_base = "http://localhost:9000/v1"
            request_timeout_ms = 2500

            [stream]
            keep_alive_secs = 0

            [logging]
            level = "debug"

            [logging.file]
            path = "./logs/nowplaying.log"
            max_lines = 5000
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.address(), "127.0.0.1:8080");
        assert_eq!(config.server.cors_origins.len(), 1);
        assert_eq!(config.spotify.api_base, "http://localhost:9000/v1");
        assert_eq!(config.spotify.request_timeout_ms, 2_500);
        assert_eq!(config.stream.keep_alive_secs, 0);
        let file = config.logging.file.expect("file logging configured");
        assert_eq!(file.max_lines, 5_000);
    }
}
