use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upstream endpoints and the client credentials used for token refresh.
#[derive(Deserialize, Serialize, Clone)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_accounts_base")]
    pub accounts_base: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SpotifyConfig {
    pub fn currently_playing_url(&self) -> String {
        format!(
            "{}/me/player/currently-playing",
            self.api_base.trim_end_matches('/')
        )
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base.trim_end_matches('/'))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Overrides credentials with `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`
    /// when the lookup yields a non-empty value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("SPOTIFY_CLIENT_ID").filter(|v| !v.is_empty()) {
            self.client_id = id;
        }
        if let Some(secret) = lookup("SPOTIFY_CLIENT_SECRET").filter(|v| !v.is_empty()) {
            self.client_secret = secret;
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base: default_api_base(),
            accounts_base: default_accounts_base(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

// Keeps the secret out of logs.
impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("accounts_base", &self.accounts_base)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

fn default_api_base() -> String {
    "https://api.spotify.com/v1".to_string()
}

fn default_accounts_base() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}
