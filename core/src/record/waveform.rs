use serde::{Deserialize, Serialize};

use crate::record::StoredAnnotation;

/// Per-channel metadata as handed over by the DICOM object collaborator.
/// Absent attributes stay `None` and are rejected during calibration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity_correction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_code: Option<String>,
    /// Marks the channel recorded as the rhythm strip.
    #[serde(default)]
    pub rhythm: bool,
}

impl ChannelRecord {
    pub fn new(name: &str, sensitivity: f64, correction: f64, baseline: f64, unit: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            sensitivity: Some(sensitivity),
            sensitivity_correction: Some(correction),
            baseline: Some(baseline),
            unit_code: Some(unit.to_string()),
            rhythm: false,
        }
    }
}

/// Pre-parsed waveform sequence item consumed by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveformRecord {
    #[serde(default)]
    pub modality: String,
    pub sampling_frequency: f64,
    pub samples_per_channel: usize,
    pub channel_count: usize,
    pub bits_allocated: u16,
    #[serde(default)]
    pub big_endian: bool,
    pub data: Vec<u8>,
    pub channels: Vec<ChannelRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<StoredAnnotation>,
}

impl WaveformRecord {
    pub fn has_samples(&self) -> bool {
        !self.data.is_empty() && self.channel_count > 0
    }
}
