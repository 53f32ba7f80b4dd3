use std::sync::Arc;

use nowplaying_live::{
    common::{
        banner::{BannerInfo, print_banner},
        http::HttpClient,
        logger,
        types::AnyResult,
    },
    configs::Config,
    server::AppState,
    sources::spotify::SpotifySource,
    transport,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let (config, config_path) = Config::load()?;
    logger::init(&config.logging);

    let address = config.server.address();
    print_banner(&BannerInfo::default(), &address);
    info!("Loaded configuration from {}", config_path);

    let client = HttpClient::new(config.spotify.request_timeout())?;
    let source = SpotifySource::new(&config.spotify, client);
    let state = Arc::new(AppState::new(config, source));
    let shutdown = state.shutdown.clone();

    let app = transport::router(state);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Now-playing server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM, cancelling every live session first so open
/// streams end and the server can drain.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, closing live streams");
    shutdown.cancel();
}
