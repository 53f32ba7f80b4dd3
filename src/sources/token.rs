use thiserror::Error;

use crate::common::errors::ErrorClass;

/// OAuth credentials held by one streaming session.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry of `access_token`, in milliseconds since the Unix epoch.
    pub expires_at_ms: u64,
}

impl TokenState {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at_ms: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at_ms,
        }
    }

    /// A token is stale once `now` is within `margin_ms` of its expiry.
    pub fn is_stale(&self, now_ms: u64, margin_ms: u64) -> bool {
        now_ms > self.expires_at_ms.saturating_sub(margin_ms)
    }
}

impl std::fmt::Debug for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenState")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh failed: {status}")]
    Rejected { status: u16 },

    #[error("Refresh request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Refresh response unreadable: {0}")]
    InvalidResponse(String),
}

impl RefreshError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingRefreshToken => ErrorClass::Auth,
            Self::Rejected { status } if *status == 429 || *status >= 500 => {
                ErrorClass::UpstreamTransient
            }
            Self::Rejected { .. } => ErrorClass::Auth,
            Self::Network(_) => ErrorClass::UpstreamTransient,
            Self::InvalidResponse(_) => ErrorClass::Protocol,
        }
    }
}
