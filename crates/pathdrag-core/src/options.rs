//! Engine-wide drag options.

use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};

/// Default distance a touch may travel before it counts as a drag.
pub const DEFAULT_TAP_TOLERANCE: f64 = 15.0;

/// Class marking draggable shapes.
pub const DRAGGABLE_CLASS: &str = "leaflet-path-draggable";

/// Class added to the render container while a shape is pressed.
pub const INTERACTIVE_CLASS: &str = "leaflet-interactive";

/// Oldest host version the engine is known to work with.
pub const MIN_HOST_VERSION: &str = "1.7";

/// Options shared by every drag controller created by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragOptions {
    /// Distance in pixels a touch may move before it becomes a drag.
    pub tap_tolerance: f64,
    /// Class added to draggable shapes.
    pub draggable_class: String,
    /// Class added to the render container on press.
    pub interactive_class: String,
    /// Minimum supported host version (`major.minor`).
    pub min_host_version: String,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            tap_tolerance: DEFAULT_TAP_TOLERANCE,
            draggable_class: DRAGGABLE_CLASS.to_string(),
            interactive_class: INTERACTIVE_CLASS.to_string(),
            min_host_version: MIN_HOST_VERSION.to_string(),
        }
    }
}

impl DragOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the tap tolerance (builder style).
    pub fn with_tap_tolerance(mut self, tap_tolerance: f64) -> Self {
        self.tap_tolerance = tap_tolerance;
        self
    }
}
