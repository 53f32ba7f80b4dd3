use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    common::types::{SessionId, now_ms},
    configs::Config,
    sources::spotify::SpotifySource,
};

/// Bookkeeping for one open stream.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub opened_at_ms: u64,
}

/// Top-level application state.
pub struct AppState {
    pub config: Config,
    pub source: SpotifySource,
    /// Streams currently attached to a client.
    pub sessions: DashMap<SessionId, SessionInfo>,
    /// Parent of every session token. Cancelled on shutdown.
    pub shutdown: CancellationToken,
    pub started_at: Instant,
    pub streams_opened: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, source: SpotifySource) -> Self {
        Self {
            config,
            source,
            sessions: DashMap::new(),
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
            streams_opened: AtomicU64::new(0),
        }
    }

    /// Registers a new stream and returns the guard that tears it down.
    pub fn open_stream(self: &Arc<Self>, id: SessionId) -> StreamGuard {
        let cancel = self.shutdown.child_token();
        self.sessions.insert(
            id.clone(),
            SessionInfo {
                opened_at_ms: now_ms(),
            },
        );
        self.streams_opened.fetch_add(1, Ordering::Relaxed);
        debug!("[{}] Stream registered ({} active)", id, self.sessions.len());

        StreamGuard {
            id,
            cancel,
            state: Arc::clone(self),
        }
    }

    pub fn uptime_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    /// Age of the longest-lived open stream, `None` when nothing is open.
    pub fn oldest_stream_age_ms(&self, now_ms: u64) -> Option<u64> {
        self.sessions
            .iter()
            .map(|entry| entry.opened_at_ms)
            .min()
            .map(|opened| now_ms.saturating_sub(opened))
    }
}

/// Cancels a stream's session and drops its registry entry when the client
/// response body is dropped.
pub struct StreamGuard {
    id: SessionId,
    cancel: CancellationToken,
    state: Arc<AppState>,
}

impl StreamGuard {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.state.sessions.remove(&self.id);
        debug!("[{}] Stream released", self.id);
    }
}
