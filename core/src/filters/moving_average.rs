use crate::math::stats::StatsHelper;
use crate::prelude::SignalFilter;

/// Centered moving average; the window shrinks at the edges instead of
/// padding with zeros.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverageFilter {
    half_window: usize,
}

impl MovingAverageFilter {
    pub fn new(half_window: usize) -> Self {
        Self { half_window }
    }
}

impl SignalFilter for MovingAverageFilter {
    fn name(&self) -> &'static str {
        "moving-average"
    }

    fn init(&self, raw: &[i32]) -> Vec<i32> {
        let n = raw.len();
        (0..n)
            .map(|i| {
                let lo = i.saturating_sub(self.half_window);
                let hi = (i + self.half_window + 1).min(n);
                StatsHelper::truncated_mean(&raw[lo..hi]).unwrap_or(raw[i])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_half_window_is_identity() {
        let raw = [5, -3, 8, 13, 0, -21];
        assert_eq!(MovingAverageFilter::new(0).init(&raw), raw.to_vec());
    }

    #[test]
    fn window_shrinks_at_boundaries() {
        let raw = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let out = MovingAverageFilter::new(4).init(&raw);
        // i = 0 averages 1..=5, i = 4 averages everything
        assert_eq!(out[0], 3);
        assert_eq!(out[4], 5);
        assert_eq!(out[8], 7);
    }

    #[test]
    fn reads_source_not_partial_output() {
        let raw = [0, 10, 0];
        assert_eq!(MovingAverageFilter::new(1).init(&raw), vec![5, 3, 5]);
    }
}
