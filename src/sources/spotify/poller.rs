use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    common::errors::ErrorClass,
    configs::SpotifyConfig,
    protocol::PlaybackSnapshot,
    sources::{
        plugin::{NowPlayingSource, PollOutcome},
        spotify::parser::SpotifyParser,
    },
};

/// Reads `GET /me/player/currently-playing` for a single listener.
pub struct SpotifyPoller {
    client: reqwest::Client,
    url: String,
}

impl SpotifyPoller {
    pub fn new(client: reqwest::Client, config: &SpotifyConfig) -> Self {
        Self {
            client,
            url: config.currently_playing_url(),
        }
    }

    /// Maps an upstream status to its outcome. `None` means the body should be
    /// parsed as a snapshot.
    pub fn classify_status(status: StatusCode) -> Option<PollOutcome> {
        let code = status.as_u16();
        match code {
            204 => Some(PollOutcome::NoContent),
            401 => Some(PollOutcome::Unauthorized),
            429 | 500..=u16::MAX => Some(PollOutcome::RateLimitedOrServerError(code)),
            402..=499 => Some(PollOutcome::ClientError(code)),
            _ => None,
        }
    }

    fn parse_body(bytes: &[u8]) -> PlaybackSnapshot {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(body) => SpotifyParser::parse_currently_playing(&body),
            Err(e) => {
                warn!(
                    class = ?ErrorClass::Protocol,
                    "Currently-playing body is not JSON ({} bytes): {}",
                    bytes.len(),
                    e
                );
                PlaybackSnapshot::default()
            }
        }
    }
}

#[async_trait]
impl NowPlayingSource for SpotifyPoller {
    async fn poll(&self, access_token: &str) -> PollOutcome {
        let resp = match self
            .client
            .get(&self.url)
            .bearer_auth(access_token)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                debug!("Currently-playing request failed: {}", e);
                return PollOutcome::NetworkError(e.to_string());
            }
        };

        let status = resp.status();
        if let Some(outcome) = Self::classify_status(status) {
            debug!("Currently-playing returned {}", status);
            return outcome;
        }

        match resp.bytes().await {
            Ok(bytes) => PollOutcome::Snapshot(Self::parse_body(&bytes)),
            Err(e) => {
                debug!("Failed to read currently-playing body: {}", e);
                PollOutcome::NetworkError(e.to_string())
            }
        }
    }
}
