use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, warn};

use crate::{
    common::{errors::ApiError, types::now_ms},
    server::AppState,
    sources::PollOutcome,
    transport::extract::SessionTokens,
};

const PATH: &str = "/api/spotify/now-playing";

/// GET /api/spotify/now-playing
pub async fn get_now_playing(
    State(state): State<Arc<AppState>>,
    SessionTokens(mut tokens): SessionTokens,
) -> Response {
    if tokens.is_stale(now_ms(), state.config.stream.refresh_margin_ms) {
        debug!("Snapshot request carries a stale token, refreshing");
        match state
            .source
            .refresher
            .refresh(tokens.refresh_token.as_deref())
            .await
        {
            Ok(fresh) => tokens = fresh,
            Err(e) => {
                warn!("Snapshot token refresh failed: {}", e);
                return error_response(ApiError::Unauthorized(e.to_string()));
            }
        }
    }

    match state.source.poller.poll(&tokens.access_token).await {
        PollOutcome::Snapshot(snapshot) => Json(snapshot).into_response(),
        PollOutcome::NoContent => StatusCode::NO_CONTENT.into_response(),
        outcome => {
            warn!("Snapshot poll failed: {:?}", outcome);
            error_response(outcome_error(outcome))
        }
    }
}

fn outcome_error(outcome: PollOutcome) -> ApiError {
    match outcome {
        PollOutcome::Unauthorized => {
            ApiError::Unauthorized("Spotify rejected the access token".into())
        }
        PollOutcome::RateLimitedOrServerError(429) => ApiError::Upstream {
            status: 429,
            message: "Spotify rate limit reached".into(),
        },
        PollOutcome::RateLimitedOrServerError(status) => ApiError::Upstream {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            message: format!("Spotify returned {}", status),
        },
        PollOutcome::ClientError(status) => ApiError::Upstream {
            status,
            message: format!("Spotify returned {}", status),
        },
        PollOutcome::NetworkError(message) => ApiError::Upstream {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            message,
        },
        PollOutcome::Snapshot(_) | PollOutcome::NoContent => {
            ApiError::Internal("unexpected successful outcome".into())
        }
    }
}

fn error_response(error: ApiError) -> Response {
    let status = error.status();
    (status, Json(error.into_body(PATH))).into_response()
}
