use std::sync::{Arc, atomic::Ordering};

use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::{common::types::now_ms, server::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub active_streams: usize,
    pub uptime_ms: u64,
    pub streams_opened: u64,
    pub oldest_stream_age_ms: Option<u64>,
}

/// GET /stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<Stats> {
    tracing::debug!("GET /stats");
    Json(Stats {
        active_streams: state.sessions.len(),
        uptime_ms: state.uptime_ms(),
        streams_opened: state.streams_opened.load(Ordering::Relaxed),
        oldest_stream_age_ms: state.oldest_stream_age_ms(now_ms()),
    })
}

/// GET /version
pub async fn get_version() -> String {
    tracing::debug!("GET /version");
    env!("CARGO_PKG_VERSION").to_string()
}
