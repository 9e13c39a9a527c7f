use std::f64::consts::PI;

use crate::prelude::SignalFilter;

/// First-order RC low-pass filter.
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    dt: f64,
    rc: f64,
}

impl LowPassFilter {
    pub fn new(sample_rate: f64, cutoff_hz: f64) -> Self {
        Self {
            dt: 1.0 / sample_rate,
            rc: 1.0 / (2.0 * PI * cutoff_hz),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.dt / (self.rc + self.dt)
    }
}

impl SignalFilter for LowPassFilter {
    fn name(&self) -> &'static str {
        "low-pass"
    }

    fn init(&self, raw: &[i32]) -> Vec<i32> {
        let alpha = self.alpha();
        let mut out = Vec::with_capacity(raw.len());
        let Some(&first) = raw.first() else {
            return out;
        };
        out.push(first);
        for i in 1..raw.len() {
            // alpha·x + (1-alpha)·y, arranged so a settled output stays exact
            let prev = out[i - 1] as f64;
            let value = prev + alpha * (raw[i] as f64 - prev);
            out.push(value as i32);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_input_is_steady_state() {
        let filter = LowPassFilter::new(500.0, 40.0);
        assert_eq!(filter.init(&[-321; 32]), vec![-321; 32]);
        assert_eq!(filter.init(&[1024; 32]), vec![1024; 32]);
    }

    #[test]
    fn settled_output_does_not_drift_near_full_scale() {
        // the expanded alpha·x + (1-alpha)·y truncates this to -32765
        let filter = LowPassFilter::new(1000.0, 100.0);
        assert_eq!(filter.init(&[-32766; 16]), vec![-32766; 16]);
        let filter = LowPassFilter::new(1000.0, 150.0);
        assert_eq!(filter.init(&[-32750; 16]), vec![-32750; 16]);
    }

    #[test]
    fn step_rises_monotonically_without_overshoot() {
        let filter = LowPassFilter::new(1000.0, 60.0);
        let mut raw = vec![0; 4];
        raw.extend(vec![1000; 60]);
        let out = filter.init(&raw);
        assert!(out.windows(2).all(|w| w[1] >= w[0]));
        assert!(out.iter().all(|&v| v <= 1000));
        assert!(out[63] > 900);
    }
}
