use std::f64::consts::PI;

use crate::prelude::SignalFilter;

/// First-order RC high-pass filter.
#[derive(Debug, Clone, Copy)]
pub struct HighPassFilter {
    dt: f64,
    rc: f64,
}

impl HighPassFilter {
    pub fn new(sample_rate: f64, cutoff_hz: f64) -> Self {
        Self {
            dt: 1.0 / sample_rate,
            rc: 1.0 / (2.0 * PI * cutoff_hz),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.rc / (self.rc + self.dt)
    }
}

impl SignalFilter for HighPassFilter {
    fn name(&self) -> &'static str {
        "high-pass"
    }

    fn init(&self, raw: &[i32]) -> Vec<i32> {
        let alpha = self.alpha();
        let mut out = Vec::with_capacity(raw.len());
        let Some(&first) = raw.first() else {
            return out;
        };
        out.push(first);
        for i in 1..raw.len() {
            let delta = (raw[i] as f64) - (raw[i - 1] as f64);
            let value = alpha * out[i - 1] as f64 + alpha * delta;
            out.push(value as i32);
        }
        out
    }
}
