use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the per-connection live stream.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StreamConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// A token this close to expiry is refreshed before use.
    #[serde(default = "default_refresh_margin_ms")]
    pub refresh_margin_ms: u64,
    /// Interval between SSE comment keep-alives. 0 disables them.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl StreamConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_secs > 0).then(|| Duration::from_secs(self.keep_alive_secs))
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            refresh_margin_ms: default_refresh_margin_ms(),
            keep_alive_secs: default_keep_alive_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    5_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_refresh_margin_ms() -> u64 {
    60_000
}

fn default_keep_alive_secs() -> u64 {
    15
}

fn default_channel_capacity() -> usize {
    16
}
