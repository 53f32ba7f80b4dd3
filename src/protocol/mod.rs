//! Wire types shared by the stream and snapshot endpoints.

pub mod events;
pub mod models;

pub use events::StreamEvent;
pub use models::PlaybackSnapshot;
