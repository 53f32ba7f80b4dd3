pub mod plugin;
pub mod spotify;
pub mod token;

pub use plugin::{NowPlayingSource, PollOutcome, TokenRefresher};
pub use token::{RefreshError, TokenState};
