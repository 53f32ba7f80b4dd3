use serde_json::Value;

use crate::protocol::PlaybackSnapshot;

pub struct SpotifyParser;

impl SpotifyParser {
    /// Normalizes a `currently-playing` response body. Any missing or
    /// mistyped nested field becomes absent instead of failing the parse.
    pub fn parse_currently_playing(body: &Value) -> PlaybackSnapshot {
        let item = body.get("item").filter(|v| v.is_object());
        let album = item.and_then(|i| i.get("album"));

        PlaybackSnapshot {
            is_playing: body
                .get("is_playing")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            progress_ms: body.get("progress_ms").and_then(|v| v.as_u64()),
            duration_ms: item
                .and_then(|i| i.get("duration_ms"))
                .and_then(|v| v.as_u64()),
            title: item.and_then(|i| Self::string_at(i, "name")),
            album: album.and_then(|a| Self::string_at(a, "name")),
            album_image_url: album
                .and_then(|a| a.get("images"))
                .and_then(|i| i.as_array())
                .and_then(|i| i.first())
                .and_then(|i| Self::string_at(i, "url")),
            artist: item.map(Self::extract_artists).unwrap_or_default(),
            song_url: item
                .and_then(|i| i.get("external_urls"))
                .and_then(|u| Self::string_at(u, "spotify")),
        }
    }

    fn extract_artists(item: &Value) -> String {
        item.get("artists")
            .and_then(|a| a.as_array())
            .map(|artists| {
                artists
                    .iter()
                    .filter_map(|a| a.get("name").and_then(|n| n.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    fn string_at(value: &Value, key: &str) -> Option<String> {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}
