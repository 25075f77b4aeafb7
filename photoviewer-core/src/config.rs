use std::time::Duration;
use serde::Deserialize;

/// Strip offsets (percent of the three-panel strip width).
pub const STRIP_PREVIOUS_PCT: f64 = 0.0;
pub const STRIP_REST_PCT: f64 = -33.333;
pub const STRIP_NEXT_PCT: f64 = -66.666;
/// One panel's share of the strip; a full-viewport drag moves the strip this far.
pub const STRIP_PANEL_PCT: f64 = 33.333;

/// Viewer timings and gesture thresholds. Shipped alongside the gallery
/// data; anything missing falls back to the defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub transition_ms: u64,
    pub zoom_transition_ms: u64,
    /// Added to `transition_ms` before giving up on the completion signal.
    pub transition_margin_ms: u64,
    /// Fraction of the viewport width a swipe has to exceed to change slides.
    pub swipe_threshold: f64,
    pub tap_slop_px: f64,
    pub arrow_reveal_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            transition_ms: 300,
            zoom_transition_ms: 200,
            transition_margin_ms: 100,
            swipe_threshold: 0.2,
            tap_slop_px: 10.0,
            arrow_reveal_ms: 1000,
        }
    }
}

impl ViewerConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn zoom_transition(&self) -> Duration {
        Duration::from_millis(self.zoom_transition_ms)
    }

    /// Upper bound on waiting for a strip transition to report completion.
    pub fn transition_timeout(&self) -> Duration {
        Duration::from_millis(self.transition_ms + self.transition_margin_ms)
    }

    pub fn arrow_reveal(&self) -> Duration {
        Duration::from_millis(self.arrow_reveal_ms)
    }
}
