use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointer tool that owns a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Start/stop markers with time and amplitude readouts.
    #[default]
    VerticalMeasure,
    /// Start/stop markers with amplitude readouts only.
    HorizontalMeasure,
    /// Free-form markers moved together by dragging.
    MultipleMarkers,
}

impl Tool {
    pub const ALL: [Tool; 3] = [
        Tool::VerticalMeasure,
        Tool::HorizontalMeasure,
        Tool::MultipleMarkers,
    ];

    /// Whether the tool places typed start/stop markers.
    pub fn is_measure(self) -> bool {
        !matches!(self, Tool::MultipleMarkers)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tool::VerticalMeasure => "vertical measure",
            Tool::HorizontalMeasure => "horizontal measure",
            Tool::MultipleMarkers => "multiple markers",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerType {
    Start,
    Stop,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMarker {
    pub tool: Tool,
    pub kind: MarkerType,
    pub sample: usize,
    pub channel: String,
}

impl SampleMarker {
    pub fn new(tool: Tool, kind: MarkerType, sample: usize, channel: &str) -> Self {
        Self {
            tool,
            kind,
            sample,
            channel: channel.to_string(),
        }
    }

    /// Markers with the same key replace each other; `Any` markers never do.
    pub fn same_slot(&self, tool: Tool, kind: MarkerType) -> bool {
        self.tool == tool && self.kind == kind && kind != MarkerType::Any
    }

    /// Moves the marker by `delta` samples. Returns `false` when the result
    /// leaves `[0, sample_count)`.
    pub fn shift(&mut self, delta: i64, sample_count: usize) -> bool {
        let moved = self.sample as i64 + delta;
        if moved < 0 || moved >= sample_count as i64 {
            return false;
        }
        self.sample = moved as usize;
        true
    }
}
