use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::FilterSettings;
use crate::filters::{
    CombinedFilter, HighPassFilter, IdentityFilter, LowPassFilter, MovingAverageFilter,
};
use crate::prelude::SignalFilter;

/// Display filters offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    #[default]
    Noop,
    HighPass,
    LowPass,
    Combined,
    Smooth,
    Smoother,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::Noop,
        FilterPreset::HighPass,
        FilterPreset::LowPass,
        FilterPreset::Combined,
        FilterPreset::Smooth,
        FilterPreset::Smoother,
    ];

    pub fn build(self, sample_rate: f64, settings: &FilterSettings) -> Box<dyn SignalFilter> {
        match self {
            FilterPreset::Noop => Box::new(IdentityFilter),
            FilterPreset::HighPass => {
                Box::new(HighPassFilter::new(sample_rate, settings.high_pass_hz))
            }
            FilterPreset::LowPass => Box::new(LowPassFilter::new(sample_rate, settings.low_pass_hz)),
            FilterPreset::Combined => Box::new(
                CombinedFilter::default()
                    .then(Box::new(HighPassFilter::new(
                        sample_rate,
                        settings.high_pass_hz,
                    )))
                    .then(Box::new(LowPassFilter::new(
                        sample_rate,
                        settings.low_pass_hz,
                    ))),
            ),
            FilterPreset::Smooth => Box::new(MovingAverageFilter::new(settings.smooth_half_window)),
            FilterPreset::Smoother => {
                Box::new(MovingAverageFilter::new(settings.smoother_half_window))
            }
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterPreset::Noop => "noop",
            FilterPreset::HighPass => "high-pass",
            FilterPreset::LowPass => "low-pass",
            FilterPreset::Combined => "combined",
            FilterPreset::Smooth => "smooth",
            FilterPreset::Smoother => "smoother",
        };
        f.write_str(label)
    }
}

impl FromStr for FilterPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        FilterPreset::ALL
            .into_iter()
            .find(|preset| preset.to_string() == normalized)
            .ok_or_else(|| format!("unknown filter preset: {}", s))
    }
}
