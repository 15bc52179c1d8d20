use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

pub const DEFAULT_LANE_COUNT: usize = 10;
/// Travel speed in px/ms.
pub const DEFAULT_SPEED: f64 = 0.08;
/// Extra gap added after a comment's tail has entered its lane.
pub const DEFAULT_SAFETY_MARGIN_MS: f64 = 100.0;

/// Overlay construction options.
///
/// Deserializes from camelCase JSON; only `container` is required
/// (`el` is accepted as an alias):
///
/// ```json
/// { "container": "#player", "delay": 500, "touchStop": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayOptions {
    /// Selector or handle name resolved by a [`crate::SurfaceHost`].
    #[serde(default, alias = "el")]
    pub container: String,
    /// Initial animation delay in ms, applied surface-wide.
    #[serde(default)]
    pub delay: Option<f64>,
    /// Tag every emitted element so interaction can freeze its travel.
    #[serde(default)]
    pub touch_stop: bool,
    #[serde(default = "default_lane_count")]
    pub lane_count: usize,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: f64,
}

fn default_lane_count() -> usize {
    DEFAULT_LANE_COUNT
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

fn default_safety_margin_ms() -> f64 {
    DEFAULT_SAFETY_MARGIN_MS
}

impl OverlayOptions {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            delay: None,
            touch_stop: false,
            lane_count: DEFAULT_LANE_COUNT,
            speed: DEFAULT_SPEED,
            safety_margin_ms: DEFAULT_SAFETY_MARGIN_MS,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check every option that can be checked without a surface.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.container.trim().is_empty() {
            return Err(ConfigurationError::MissingContainer);
        }
        if self.lane_count == 0 {
            return Err(ConfigurationError::NoLanes);
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigurationError::InvalidSpeed(self.speed));
        }
        if let Some(delay) = self.delay
            && (!delay.is_finite() || delay < 0.0)
        {
            return Err(ConfigurationError::InvalidDelay(delay));
        }
        if !self.safety_margin_ms.is_finite() || self.safety_margin_ms < 0.0 {
            return Err(ConfigurationError::InvalidMargin(self.safety_margin_ms));
        }
        Ok(())
    }

    /// Vertical band of lane `index` (1-based) as a percentage of surface
    /// height. Lanes divide the surface evenly, lane 1 at the top.
    pub fn lane_top_percent(&self, index: usize) -> f64 {
        let count = self.lane_count.max(1) as f64;
        index.saturating_sub(1) as f64 * 100.0 / count
    }
}
