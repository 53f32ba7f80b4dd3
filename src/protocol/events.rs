use serde::{Deserialize, Serialize};

use super::models::PlaybackSnapshot;

/// The unit of data pushed to a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    NowPlaying {
        data: PlaybackSnapshot,
    },
    NoContent,
    Error {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        status: Option<u16>,
    },
}

impl StreamEvent {
    pub fn now_playing(data: PlaybackSnapshot) -> Self {
        Self::NowPlaying { data }
    }

    pub fn error_message(message: impl Into<String>) -> Self {
        Self::Error {
            message: Some(message.into()),
            status: None,
        }
    }

    pub fn error_status(status: u16) -> Self {
        Self::Error {
            message: None,
            status: Some(status),
        }
    }

    /// Serialized JSON payload. This exact string is what goes on the wire and
    /// what consecutive-duplicate suppression compares.
    pub fn to_payload(&self) -> String {
        // Serializing plain strings, integers and options cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"error"}"#.to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NowPlaying { .. } => "now_playing",
            Self::NoContent => "no_content",
            Self::Error { .. } => "error",
        }
    }
}
