/// Common error type for opening and measuring a waveform.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WaveformError {
    #[error("unsupported bit depth: {bits} bits per sample")]
    UnsupportedBitDepth { bits: u16 },
    #[error("unsupported sensitivity unit: {code}")]
    UnsupportedUnit { code: String },
    #[error("channel {channel}: missing {field}")]
    MissingChannelMetadata { channel: usize, field: &'static str },
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("ambiguous measurement: {count} channels hold a duration")]
    AmbiguousMeasurement { count: usize },
    #[error("no measured duration found")]
    NoMeasurementFound,
    #[error("interval must be measured in ms, got {unit}")]
    IntervalUnit { unit: String },
    #[error("no waveform open")]
    NotOpen,
}

impl WaveformError {
    /// Measurement commit errors can be fixed in place by the user; everything
    /// else aborts opening the waveform.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WaveformError::AmbiguousMeasurement { .. }
                | WaveformError::NoMeasurementFound
                | WaveformError::IntervalUnit { .. }
        )
    }
}

pub type WaveformResult<T> = Result<T, WaveformError>;

/// Stateless display transform over one channel's raw samples.
///
/// Implementations read the whole input, may look at neighbouring samples and
/// truncate real-valued intermediates towards zero. The input is never mutated.
pub trait SignalFilter {
    fn name(&self) -> &'static str;
    fn init(&self, raw: &[i32]) -> Vec<i32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_commit_errors_are_recoverable() {
        assert!(WaveformError::NoMeasurementFound.is_recoverable());
        assert!(WaveformError::AmbiguousMeasurement { count: 2 }.is_recoverable());
        assert!(!WaveformError::UnsupportedBitDepth { bits: 12 }.is_recoverable());
        assert!(!WaveformError::UnsupportedUnit { code: "mmHg".into() }.is_recoverable());
    }

    #[test]
    fn missing_metadata_names_channel_and_field() {
        let err = WaveformError::MissingChannelMetadata {
            channel: 3,
            field: "sensitivity",
        };
        assert_eq!(err.to_string(), "channel 3: missing sensitivity");
    }
}
