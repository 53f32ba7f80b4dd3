use serde::{Deserialize, Serialize};

/// A point-in-time description of what is currently playing.
///
/// Absent fields serialize as `null` rather than being skipped, so every
/// snapshot carries the same set of keys in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub album_image_url: Option<String>,
    /// Artist names joined with `", "`. Empty when the track lists none.
    pub artist: String,
    pub song_url: Option<String>,
}
