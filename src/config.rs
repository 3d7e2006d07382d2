use std::time::Duration;

use serde::Deserialize;

/// Client configuration. Every field has a default, so an empty document
/// deserializes to the same thing as `ClientConfig::default()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Timeout applied to every backend request.
    pub request_timeout_secs: u64,
    /// Delay before the canned reply in historical conversations, ms.
    pub history_reply_delay_ms: u64,
    pub upload: UploadTimings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            history_reply_delay_ms: 1000,
            upload: UploadTimings::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn history_reply_delay(&self) -> Duration {
        Duration::from_millis(self.history_reply_delay_ms)
    }
}

/// Timings for the simulated upload/processing timeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadTimings {
    /// Interval between simulated progress ticks, ms.
    pub tick_interval_ms: u64,
    /// Upper bound on the random progress increment per tick.
    pub max_increment: f64,
    /// Pause after the bar fills so the 100% frame is visible, ms.
    pub full_bar_hold_ms: u64,
    /// Simulated server-side indexing time, ms.
    pub processing_ms: u64,
}

impl Default for UploadTimings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            max_increment: 15.0,
            full_bar_hold_ms: 500,
            processing_ms: 2000,
        }
    }
}

impl UploadTimings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn full_bar_hold(&self) -> Duration {
        Duration::from_millis(self.full_bar_hold_ms)
    }

    pub fn processing(&self) -> Duration {
        Duration::from_millis(self.processing_ms)
    }
}
