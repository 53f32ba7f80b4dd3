pub mod snapshot;
pub mod stats;
pub mod stream;

pub use snapshot::get_now_playing;
pub use stats::{get_stats, get_version};
pub use stream::stream_now_playing;
