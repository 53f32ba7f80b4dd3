use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::header,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    common::types::SessionId,
    server::{AppState, StreamGuard},
    stream::LiveSession,
    transport::extract::SessionTokens,
};

/// GET /api/spotify/stream
pub async fn stream_now_playing(
    State(state): State<Arc<AppState>>,
    SessionTokens(tokens): SessionTokens,
) -> Response {
    let id = SessionId::generate();
    info!("[{}] Client opened now-playing stream", id);

    let guard = state.open_stream(id.clone());
    let (tx, rx) = mpsc::channel(state.config.stream.channel_capacity.max(1));

    LiveSession::new(
        id,
        tokens,
        &state.config.stream,
        state.source.poller.clone(),
        state.source.refresher.clone(),
        tx,
        guard.token(),
    )
    .spawn();

    // The guard lives as long as the body; dropping it cancels the session.
    let events = stream::unfold((rx, guard), |(mut rx, guard): (_, StreamGuard)| async move {
        let event = rx.recv().await?;
        let frame = Event::default().data(event.to_payload());
        Some((Ok::<_, Infallible>(frame), (rx, guard)))
    });

    let headers = [
        (header::CACHE_CONTROL, "no-cache, no-transform"),
        (header::CONNECTION, "keep-alive"),
    ];
    match state.config.stream.keep_alive() {
        Some(interval) => (
            headers,
            Sse::new(events).keep_alive(KeepAlive::new().interval(interval)),
        )
            .into_response(),
        None => (headers, Sse::new(events)).into_response(),
    }
}
