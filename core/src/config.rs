use serde::{Deserialize, Serialize};

/// What to do when the payload decodes to more samples than declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Keep the first `channels × samples` elements and drop the rest.
    #[default]
    Truncate,
    /// Re-derive the per-channel sample count from the decoded length.
    Extend,
}

/// Which markers a tool switch clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerClearPolicy {
    #[default]
    AllChannels,
    ActiveChannel,
}

/// Parameters behind the display filter presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub high_pass_hz: f64,
    pub low_pass_hz: f64,
    pub smooth_half_window: usize,
    pub smoother_half_window: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            high_pass_hz: 0.5,
            low_pass_hz: 40.0,
            smooth_half_window: 2,
            smoother_half_window: 4,
        }
    }
}

/// Viewer configuration, passed by value into each component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub dots_per_inch: f64,
    pub default_speed: f64,
    pub default_amplitude: f64,
    pub overflow: OverflowPolicy,
    pub marker_clear: MarkerClearPolicy,
    pub filters: FilterSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dots_per_inch: 96.0,
            default_speed: 25.0,
            default_amplitude: 10.0,
            overflow: OverflowPolicy::Truncate,
            marker_clear: MarkerClearPolicy::AllChannels,
            filters: FilterSettings::default(),
        }
    }
}

impl ViewerConfig {
    pub fn pixels_per_mm(&self) -> f64 {
        self.dots_per_inch / 25.4
    }
}
