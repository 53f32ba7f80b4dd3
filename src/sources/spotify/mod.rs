use std::sync::Arc;

use crate::{
    configs::SpotifyConfig,
    sources::plugin::{NowPlayingSource, TokenRefresher},
};

pub mod parser;
pub mod poller;
pub mod token;

pub use poller::SpotifyPoller;
pub use token::SpotifyTokenRefresher;

/// Both upstream collaborators sharing one HTTP client.
pub struct SpotifySource {
    pub poller: Arc<dyn NowPlayingSource>,
    pub refresher: Arc<dyn TokenRefresher>,
}

impl SpotifySource {
    pub fn new(config: &SpotifyConfig, client: reqwest::Client) -> Self {
        Self {
            poller: Arc::new(SpotifyPoller::new(client.clone(), config)),
            refresher: Arc::new(SpotifyTokenRefresher::new(client, config)),
        }
    }
}
