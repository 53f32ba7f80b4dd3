use async_trait::async_trait;

use crate::{
    common::errors::ErrorClass,
    protocol::PlaybackSnapshot,
    sources::token::{RefreshError, TokenState},
};

/// Normalized result of one "currently playing" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Snapshot(PlaybackSnapshot),
    /// Upstream reports nothing playing.
    NoContent,
    Unauthorized,
    RateLimitedOrServerError(u16),
    ClientError(u16),
    NetworkError(String),
}

impl PollOutcome {
    /// Failure class of this outcome, `None` for the successful ones.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Snapshot(_) | Self::NoContent => None,
            Self::Unauthorized => Some(ErrorClass::Auth),
            Self::RateLimitedOrServerError(_) | Self::NetworkError(_) => {
                Some(ErrorClass::UpstreamTransient)
            }
            Self::ClientError(_) => Some(ErrorClass::UpstreamClient),
        }
    }
}

/// Reads the listener's current playback from the upstream service.
#[async_trait]
pub trait NowPlayingSource: Send + Sync {
    /// Performs a single request with the given access token. Never fails:
    /// every failure mode is folded into a [`PollOutcome`] variant.
    async fn poll(&self, access_token: &str) -> PollOutcome;
}

/// Exchanges a refresh token for a fresh grant.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Returns the replacement token state. When the upstream response omits
    /// a refresh token, the one passed in is carried over.
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenState, RefreshError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_classes() {
        assert_eq!(PollOutcome::NoContent.class(), None);
        assert_eq!(
            PollOutcome::Snapshot(PlaybackSnapshot::default()).class(),
            None
        );
        assert_eq!(PollOutcome::Unauthorized.class(), Some(ErrorClass::Auth));
        assert_eq!(
            PollOutcome::RateLimitedOrServerError(429).class(),
            Some(ErrorClass::UpstreamTransient)
        );
        assert_eq!(
            PollOutcome::NetworkError("timed out".into()).class(),
            Some(ErrorClass::UpstreamTransient)
        );
        assert_eq!(
            PollOutcome::ClientError(404).class(),
            Some(ErrorClass::UpstreamClient)
        );
    }
}
