use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{
    server::AppState,
    transport::{
        extract::{EXPIRES_AT_HEADER, REFRESH_TOKEN_HEADER},
        middleware::add_response_headers,
        routes,
    },
};

const API_SPOTIFY: &str = "/api/spotify";

pub fn router(state: Arc<AppState>) -> Router {
    let spotify_routes = Router::new()
        .route("/stream", get(routes::stream_now_playing))
        .route("/now-playing", get(routes::get_now_playing));

    let router = Router::new()
        .nest(API_SPOTIFY, spotify_routes)
        .route("/version", get(routes::get_version))
        .route("/stats", get(routes::get_stats))
        .layer(middleware::from_fn(add_response_headers))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(&state.config.server.cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };
    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET])
            .allow_headers([
                header::AUTHORIZATION,
                HeaderName::from_static(REFRESH_TOKEN_HEADER),
                HeaderName::from_static(EXPIRES_AT_HEADER),
            ])
            .allow_credentials(true),
    )
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::Ordering, time::Duration};

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use futures::StreamExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        common::types::now_ms,
        configs::Config,
        protocol::PlaybackSnapshot,
        server::app_state::tests::{FixedPoller, FixedRefresher, state_with},
        sources::{PollOutcome, spotify::SpotifySource},
    };

    fn authed(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", "Bearer acc")
            .header("x-refresh-token", "ref")
            .header("x-token-expires-at", (now_ms() + 3_600_000).to_string())
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn snapshot() -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: true,
            progress_ms: Some(10_000),
            duration_ms: Some(200_000),
            title: Some("Song".into()),
            artist: "A, B".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_version_and_api_header() {
        let app = router(state_with(PollOutcome::NoContent));
        let response = app
            .oneshot(Request::get("/version").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-nowplaying-api-version"], "1");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_now_playing_snapshot() {
        let app = router(state_with(PollOutcome::Snapshot(snapshot())));
        let response = app.oneshot(authed("/api/spotify/now-playing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["artist"], "A, B");
        assert_eq!(body["progressMs"], 10_000);
        assert_eq!(body["durationMs"], 200_000);
        assert_eq!(body["isPlaying"], true);
    }

    #[tokio::test]
    async fn test_now_playing_no_content() {
        let app = router(state_with(PollOutcome::NoContent));
        let response = app.oneshot(authed("/api/spotify/now-playing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_now_playing_upstream_error_body() {
        let app = router(state_with(PollOutcome::RateLimitedOrServerError(503)));
        let response = app.oneshot(authed("/api/spotify/now-playing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["status"], 502);
        assert_eq!(body["error"], "Bad Gateway");
        assert_eq!(body["message"], "Spotify returned 503");
        assert_eq!(body["path"], "/api/spotify/now-playing");
    }

    #[tokio::test]
    async fn test_now_playing_stale_token_with_failed_refresh() {
        let source = SpotifySource {
            poller: Arc::new(FixedPoller(PollOutcome::NoContent)),
            refresher: Arc::new(FixedRefresher(None)),
        };
        let app = router(Arc::new(AppState::new(Config::default(), source)));
        let request = Request::get("/api/spotify/now-playing")
            .header("authorization", "Bearer acc")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Refresh failed: 400");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let state = state_with(PollOutcome::NoContent);
        let app = router(state.clone());
        let response = app
            .oneshot(Request::get("/api/spotify/stream").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(state.streams_opened.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_stream_emits_events_and_releases_on_drop() {
        let state = state_with(PollOutcome::Snapshot(snapshot()));
        let app = router(state.clone());
        let response = app.oneshot(authed("/api/spotify/stream")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        assert_eq!(response.headers()["cache-control"], "no-cache, no-transform");
        assert_eq!(response.headers()["connection"], "keep-alive");
        assert_eq!(state.sessions.len(), 1);

        let mut body = response.into_body().into_data_stream();
        let first = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("first frame")
            .expect("stream open")
            .unwrap();
        let text = String::from_utf8(first.to_vec()).unwrap();
        assert!(text.starts_with("data: {\"type\":\"now_playing\""), "{}", text);
        assert!(text.ends_with("\n\n"));

        drop(body);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_ends_open_streams() {
        let state = state_with(PollOutcome::NoContent);
        let app = router(state.clone());
        let response = app.oneshot(authed("/api/spotify/stream")).await.unwrap();
        let mut body = response.into_body().into_data_stream();

        assert!(body.next().await.is_some());
        state.shutdown.cancel();

        let end = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(frame) = body.next().await {
                frame.unwrap();
            }
        })
        .await;
        assert!(end.is_ok(), "stream should end after shutdown");
    }

    #[tokio::test]
    async fn test_stats_counts_streams() {
        let state = state_with(PollOutcome::NoContent);
        let stream = router(state.clone())
            .oneshot(authed("/api/spotify/stream"))
            .await
            .unwrap();

        let response = router(state.clone())
            .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["activeStreams"], 1);
        assert_eq!(body["streamsOpened"], 1);
        assert!(body["uptimeMs"].is_u64());
        assert!(body["oldestStreamAgeMs"].is_u64());

        drop(stream);
        assert!(state.sessions.is_empty());

        let response = router(state.clone())
            .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["activeStreams"], 0);
        assert!(body["oldestStreamAgeMs"].is_null());
    }

    #[test]
    fn test_cors_layer_only_with_valid_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["bad\norigin".to_string()]).is_none());
        assert!(cors_layer(&["https://example.com".to_string()]).is_some());
    }
}
