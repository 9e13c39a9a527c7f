use ndarray::{Array2, Axis};

/// Channel-major matrix of raw ADC samples, `channels × samples_per_channel`.
///
/// The shape is fixed once decoded; only baselines are applied in place.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSampleMatrix {
    data: Array2<i32>,
}

impl RawSampleMatrix {
    pub fn zeros(channels: usize, samples_per_channel: usize) -> Self {
        Self {
            data: Array2::zeros((channels, samples_per_channel)),
        }
    }

    /// Scatters channel-interleaved elements: element `i` lands in channel
    /// `i % channels` at position `i / channels`. Missing tail elements stay 0.
    pub(crate) fn from_interleaved(
        elements: &[i32],
        channels: usize,
        samples_per_channel: usize,
    ) -> Self {
        let mut matrix = Self::zeros(channels, samples_per_channel);
        let limit = channels * samples_per_channel;
        for (i, &value) in elements.iter().take(limit).enumerate() {
            matrix.data[[i % channels, i / channels]] = value;
        }
        matrix
    }

    pub fn channels(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn samples_per_channel(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn channel(&self, index: usize) -> Option<&[i32]> {
        if index >= self.channels() {
            return None;
        }
        self.data.row(index).to_slice()
    }

    pub fn sample(&self, channel: usize, index: usize) -> Option<i32> {
        self.data.get([channel, index]).copied()
    }

    /// Shifts a channel by its baseline, truncating the sum towards zero.
    pub(crate) fn apply_baseline(&mut self, channel: usize, baseline: f64) {
        if channel >= self.channels() || baseline == 0.0 {
            return;
        }
        self.data
            .row_mut(channel)
            .mapv_inplace(|v| (v as f64 + baseline).trunc() as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_elements_are_split_by_channel() {
        let matrix = RawSampleMatrix::from_interleaved(&[1, 10, 2, 20, 3, 30], 2, 3);
        assert_eq!(matrix.channel(0), Some(&[1, 2, 3][..]));
        assert_eq!(matrix.channel(1), Some(&[10, 20, 30][..]));
        assert_eq!(matrix.channel(2), None);
    }

    #[test]
    fn short_payload_leaves_zero_tail() {
        let matrix = RawSampleMatrix::from_interleaved(&[5, 6, 7], 2, 3);
        assert_eq!(matrix.channel(0), Some(&[5, 7, 0][..]));
        assert_eq!(matrix.channel(1), Some(&[6, 0, 0][..]));
    }

    #[test]
    fn baseline_shifts_only_its_channel() {
        let mut matrix = RawSampleMatrix::from_interleaved(&[1, 1, 2, 2], 2, 2);
        matrix.apply_baseline(1, -3.0);
        assert_eq!(matrix.channel(0), Some(&[1, 2][..]));
        assert_eq!(matrix.channel(1), Some(&[-2, -1][..]));
    }
}
