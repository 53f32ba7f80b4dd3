use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    common::types::{SessionId, now_ms},
    configs::StreamConfig,
    protocol::StreamEvent,
    sources::{NowPlayingSource, PollOutcome, TokenRefresher, TokenState},
    stream::backoff::Backoff,
};

const UNAUTHORIZED_REFRESH_FAILED: &str = "Unauthorized and refresh failed";

/// Why a refresh is being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// The held token is within the refresh margin of its expiry.
    Stale,
    /// Upstream rejected the held token.
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Token freshness check before the upstream request.
    Polling,
    Refreshing(RefreshTrigger),
    /// Upstream request in flight.
    Fetching,
    Emitting(StreamEvent),
    Waiting(Duration),
    Closed,
}

/// One client connection's poll loop.
///
/// The session owns its token state and backoff outright. It runs until the
/// cancellation token fires or the event receiver is dropped.
pub struct LiveSession {
    id: SessionId,
    tokens: TokenState,
    backoff: Backoff,
    refresh_margin_ms: u64,
    last_payload: Option<String>,
    poller: Arc<dyn NowPlayingSource>,
    refresher: Arc<dyn TokenRefresher>,
    events: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
}

impl LiveSession {
    pub fn new(
        id: SessionId,
        tokens: TokenState,
        config: &StreamConfig,
        poller: Arc<dyn NowPlayingSource>,
        refresher: Arc<dyn TokenRefresher>,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            tokens,
            backoff: Backoff::new(config.base_delay(), config.max_delay()),
            refresh_margin_ms: config.refresh_margin_ms,
            last_payload: None,
            poller,
            refresher,
            events,
            cancel,
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        info!("[{}] Stream session opened", self.id);

        let mut state = SessionState::Idle;
        loop {
            if self.cancel.is_cancelled() {
                state = SessionState::Closed;
            }

            let next = match state {
                SessionState::Idle => SessionState::Polling,
                SessionState::Polling => self.check_token(),
                SessionState::Refreshing(trigger) => self.refresh(trigger).await,
                SessionState::Fetching => self.fetch().await,
                SessionState::Emitting(event) => self.emit(event).await,
                SessionState::Waiting(delay) => self.wait(delay).await,
                SessionState::Closed => break,
            };
            debug!("[{}] -> {:?}", self.id, next);
            state = next;
        }

        // Idempotent; also releases anything else holding this token.
        self.cancel.cancel();
        info!("[{}] Stream session closed", self.id);
    }

    fn check_token(&self) -> SessionState {
        if self.tokens.is_stale(now_ms(), self.refresh_margin_ms) {
            debug!(
                "[{}] Access token stale (expires at {}), refreshing first",
                self.id, self.tokens.expires_at_ms
            );
            SessionState::Refreshing(RefreshTrigger::Stale)
        } else {
            SessionState::Fetching
        }
    }

    async fn refresh(&mut self, trigger: RefreshTrigger) -> SessionState {
        let result = self
            .refresher
            .refresh(self.tokens.refresh_token.as_deref())
            .await;
        if self.cancel.is_cancelled() {
            return SessionState::Closed;
        }

        match result {
            Ok(tokens) => {
                self.tokens = tokens;
                match trigger {
                    RefreshTrigger::Stale => SessionState::Fetching,
                    RefreshTrigger::Unauthorized => {
                        debug!("[{}] Re-authorized, polling again immediately", self.id);
                        self.backoff.reset();
                        SessionState::Waiting(Duration::ZERO)
                    }
                }
            }
            Err(e) => {
                self.backoff.grow();
                warn!(
                    "[{}] Token refresh failed ({:?}, {:?}): {}. Retrying in {:?}",
                    self.id,
                    trigger,
                    e.class(),
                    e,
                    self.backoff.current()
                );
                let message = match trigger {
                    RefreshTrigger::Stale => e.to_string(),
                    RefreshTrigger::Unauthorized => UNAUTHORIZED_REFRESH_FAILED.to_string(),
                };
                SessionState::Emitting(StreamEvent::error_message(message))
            }
        }
    }

    async fn fetch(&mut self) -> SessionState {
        let outcome = self.poller.poll(&self.tokens.access_token).await;
        if self.cancel.is_cancelled() {
            return SessionState::Closed;
        }

        if let Some(class) = outcome.class() {
            warn!(
                "[{}] Upstream poll failed: {:?} ({:?}, failure #{})",
                self.id,
                outcome,
                class,
                self.backoff.failures() + 1
            );
        }

        match outcome {
            PollOutcome::Snapshot(snapshot) => {
                self.backoff.reset();
                SessionState::Emitting(StreamEvent::now_playing(snapshot))
            }
            PollOutcome::NoContent => SessionState::Emitting(StreamEvent::NoContent),
            PollOutcome::Unauthorized => SessionState::Refreshing(RefreshTrigger::Unauthorized),
            PollOutcome::RateLimitedOrServerError(status) => {
                self.backoff.grow();
                SessionState::Emitting(StreamEvent::error_status(status))
            }
            PollOutcome::ClientError(status) => {
                SessionState::Emitting(StreamEvent::error_status(status))
            }
            PollOutcome::NetworkError(message) => {
                self.backoff.grow();
                SessionState::Emitting(StreamEvent::error_message(message))
            }
        }
    }

    async fn emit(&mut self, event: StreamEvent) -> SessionState {
        let payload = event.to_payload();
        let delay = self.backoff.current();

        if self.last_payload.as_deref() == Some(payload.as_str()) {
            trace!("[{}] Suppressed duplicate {} event", self.id, event.kind());
            return SessionState::Waiting(delay);
        }

        debug!("[{}] Emitting {} event", self.id, event.kind());
        if self.events.send(event).await.is_err() {
            debug!("[{}] Client receiver dropped", self.id);
            return SessionState::Closed;
        }
        self.last_payload = Some(payload);
        SessionState::Waiting(delay)
    }

    async fn wait(&self, delay: Duration) -> SessionState {
        if delay.is_zero() {
            return SessionState::Polling;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => SessionState::Closed,
            _ = self.events.closed() => SessionState::Closed,
            _ = tokio::time::sleep(delay) => SessionState::Polling,
        }
    }
}
