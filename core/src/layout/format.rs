use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds of trace shown across the width of the multi-column formats.
pub const GRID_SECONDS: f64 = 10.0;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 10.0;
pub const ZOOM_STEP: f64 = 0.5;

pub const SPEED_PRESETS: [f64; 4] = [12.5, 25.0, 50.0, 100.0];
pub const AMPLITUDE_PRESETS: [f64; 6] = [3.0, 5.0, 10.0, 15.0, 20.0, 30.0];

/// Standardized lead arrangements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    /// One column, whole recording.
    #[default]
    Default,
    /// 2 × 6 grid, 5 s per cell.
    TwoColumn,
    /// 4 × 3 grid, 2.5 s per cell.
    FourColumn,
    /// 4 × 3 grid plus a full-width rhythm row.
    FourColumnWithRhythm,
}

impl DisplayFormat {
    pub const ALL: [DisplayFormat; 4] = [
        DisplayFormat::Default,
        DisplayFormat::TwoColumn,
        DisplayFormat::FourColumn,
        DisplayFormat::FourColumnWithRhythm,
    ];

    pub fn columns(self) -> usize {
        match self {
            DisplayFormat::Default => 1,
            DisplayFormat::TwoColumn => 2,
            DisplayFormat::FourColumn | DisplayFormat::FourColumnWithRhythm => 4,
        }
    }

    pub fn has_rhythm_strip(self) -> bool {
        matches!(self, DisplayFormat::FourColumnWithRhythm)
    }

    /// Seconds covered by the full layout width.
    pub fn seconds_to_display(self, recording_seconds: f64) -> f64 {
        match self {
            DisplayFormat::Default => recording_seconds,
            _ => GRID_SECONDS,
        }
    }

    /// Seconds covered by a single grid cell.
    pub fn seconds_per_cell(self, recording_seconds: f64) -> f64 {
        self.seconds_to_display(recording_seconds) / self.columns() as f64
    }
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DisplayFormat::Default => "1xfull",
            DisplayFormat::TwoColumn => "2x5s",
            DisplayFormat::FourColumn => "4x2.5s",
            DisplayFormat::FourColumnWithRhythm => "4x2.5s & RS",
        };
        f.write_str(label)
    }
}

/// A speed or amplitude: a fixed value or fitted to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    #[default]
    Auto,
    Fixed(f64),
}

/// Zoom factor applied on top of speed and amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zoom {
    Auto,
    Factor(f64),
}

impl Default for Zoom {
    fn default() -> Self {
        Zoom::Factor(1.0)
    }
}

/// User-controlled display state consumed by every geometry recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutState {
    pub format: DisplayFormat,
    pub speed: Scale,
    pub amplitude: Scale,
    pub zoom: Zoom,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            format: DisplayFormat::Default,
            speed: Scale::Fixed(25.0),
            amplitude: Scale::Fixed(10.0),
            zoom: Zoom::default(),
        }
    }
}

impl LayoutState {
    fn current_zoom(&self) -> f64 {
        match self.zoom {
            Zoom::Auto => 1.0,
            Zoom::Factor(z) => z,
        }
    }

    pub fn zoom_in(&mut self) {
        let next = (self.current_zoom() + ZOOM_STEP).min(MAX_ZOOM);
        self.zoom = Zoom::Factor(next);
    }

    pub fn zoom_out(&mut self) {
        let next = (self.current_zoom() - ZOOM_STEP).max(MIN_ZOOM);
        self.zoom = Zoom::Factor(next);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = Zoom::Factor(1.0);
    }
}
