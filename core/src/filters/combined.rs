use crate::prelude::SignalFilter;

/// Sequential composition: each filter consumes the previous one's output.
#[derive(Default)]
pub struct CombinedFilter {
    filters: Vec<Box<dyn SignalFilter>>,
}

impl CombinedFilter {
    pub fn new(filters: Vec<Box<dyn SignalFilter>>) -> Self {
        Self { filters }
    }

    pub fn then(mut self, filter: Box<dyn SignalFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl SignalFilter for CombinedFilter {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn init(&self, raw: &[i32]) -> Vec<i32> {
        self.filters
            .iter()
            .fold(raw.to_vec(), |data, filter| filter.init(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{HighPassFilter, LowPassFilter, MovingAverageFilter};

    #[test]
    fn empty_combination_passes_through() {
        assert_eq!(CombinedFilter::default().init(&[3, 1, 4]), vec![3, 1, 4]);
    }

    #[test]
    fn zero_baseline_survives_high_then_low_pass() {
        let filter = CombinedFilter::default()
            .then(Box::new(HighPassFilter::new(500.0, 0.5)))
            .then(Box::new(LowPassFilter::new(500.0, 40.0)));
        assert_eq!(filter.init(&[0; 64]), vec![0; 64]);
        assert_eq!(filter.stage_names(), vec!["high-pass", "low-pass"]);
    }

    #[test]
    fn stages_run_in_configured_order() {
        let raw = [0, 0, 90, 0, 0, 0, 30, 0];
        let filter = CombinedFilter::new(vec![
            Box::new(MovingAverageFilter::new(1)) as Box<dyn SignalFilter>,
            Box::new(HighPassFilter::new(100.0, 1.0)),
            Box::new(LowPassFilter::new(100.0, 10.0)),
        ]);

        let smoothed = MovingAverageFilter::new(1).init(&raw);
        let high = HighPassFilter::new(100.0, 1.0).init(&smoothed);
        let expected = LowPassFilter::new(100.0, 10.0).init(&high);
        assert_eq!(filter.init(&raw), expected);
        assert_eq!(
            filter.stage_names(),
            vec!["moving-average", "high-pass", "low-pass"]
        );
    }
}
