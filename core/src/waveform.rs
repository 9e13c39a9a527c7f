use crate::calibration::ChannelDefinition;
use crate::config::{FilterSettings, ViewerConfig};
use crate::decode::{ByteOrder, DecodeRequest, RawSampleMatrix, WaveformDecoder};
use crate::filters::{FilterBank, FilteredView};
use crate::measure::MeasuredChannel;
use crate::prelude::{WaveformError, WaveformResult};
use crate::record::WaveformRecord;
use crate::telemetry::log::LogManager;

/// A decoded and calibrated waveform, ready for layout and measurement.
#[derive(Debug, Clone)]
pub struct Waveform {
    modality: String,
    sample_rate: f64,
    definitions: Vec<ChannelDefinition>,
    matrix: RawSampleMatrix,
    rhythm: Option<usize>,
}

impl Waveform {
    /// Calibrates every channel, decodes the payload and computes extents.
    /// Any failure aborts the whole open.
    pub fn open(record: &WaveformRecord, config: &ViewerConfig) -> WaveformResult<Self> {
        let logger = LogManager::new("waveform");
        if !(record.sampling_frequency.is_finite() && record.sampling_frequency > 0.0) {
            return Err(WaveformError::InvalidDimensions(format!(
                "sampling frequency {} Hz",
                record.sampling_frequency
            )));
        }
        if record.channels.len() < record.channel_count {
            return Err(WaveformError::MissingChannelMetadata {
                channel: record.channels.len(),
                field: "channel definition",
            });
        }

        let mut definitions = record
            .channels
            .iter()
            .take(record.channel_count)
            .enumerate()
            .map(|(index, channel)| ChannelDefinition::from_record(index, channel))
            .collect::<WaveformResult<Vec<_>>>()?;

        let baselines: Vec<f64> = definitions.iter().map(ChannelDefinition::baseline).collect();
        let matrix = WaveformDecoder::new(config.overflow).decode(&DecodeRequest {
            bytes: &record.data,
            bits_per_sample: record.bits_allocated,
            byte_order: ByteOrder::from_big_endian(record.big_endian),
            channel_count: record.channel_count,
            sample_count: record.samples_per_channel,
            baselines: &baselines,
        })?;

        for (index, definition) in definitions.iter_mut().enumerate() {
            definition.compute_extent(matrix.channel(index).unwrap_or_default());
        }

        let rhythm = record
            .channels
            .iter()
            .take(record.channel_count)
            .position(|c| c.rhythm);

        logger.record(&format!(
            "opened {} waveform: {} channels, {} samples at {} Hz",
            if record.modality.is_empty() { "unnamed" } else { record.modality.as_str() },
            matrix.channels(),
            matrix.samples_per_channel(),
            record.sampling_frequency
        ));

        Ok(Self {
            modality: record.modality.clone(),
            sample_rate: record.sampling_frequency,
            definitions,
            matrix,
            rhythm,
        })
    }

    pub fn modality(&self) -> &str {
        &self.modality
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.matrix.channels()
    }

    pub fn samples_per_channel(&self) -> usize {
        self.matrix.samples_per_channel()
    }

    /// Whole seconds recorded.
    pub fn seconds(&self) -> usize {
        (self.samples_per_channel() as f64 / self.sample_rate).floor() as usize
    }

    /// Samples per whole recorded second; the nominal rate for recordings
    /// shorter than a second.
    pub fn samples_per_second(&self) -> f64 {
        match self.seconds() {
            0 => self.sample_rate,
            seconds => self.samples_per_channel() as f64 / seconds as f64,
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples_per_channel() as f64 / self.sample_rate
    }

    /// Millivolt cells each row reserves: twice the largest extent in whole
    /// millivolts, never fewer than two.
    pub fn millivolt_cells(&self) -> f64 {
        let peak_mv = self
            .definitions
            .iter()
            .filter_map(ChannelDefinition::extent)
            .map(|e| e.magnitude_uv() / 1000.0)
            .fold(0.0, f64::max);
        (peak_mv.ceil() * 2.0).max(2.0)
    }

    pub fn definitions(&self) -> &[ChannelDefinition] {
        &self.definitions
    }

    pub fn definition(&self, channel: usize) -> Option<&ChannelDefinition> {
        self.definitions.get(channel)
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.definitions
            .iter()
            .position(|d| d.name().eq_ignore_ascii_case(name))
    }

    pub fn rhythm_channel(&self) -> Option<usize> {
        self.rhythm
    }

    pub fn matrix(&self) -> &RawSampleMatrix {
        &self.matrix
    }

    pub fn filter_bank(&self, settings: &FilterSettings) -> FilterBank {
        FilterBank::new(&self.matrix, self.sample_rate, settings.clone())
    }

    /// Samples for measurement: the filtered view when given, raw otherwise.
    pub fn measured_channel<'a>(
        &'a self,
        channel: usize,
        view: Option<&'a FilteredView>,
    ) -> Option<MeasuredChannel<'a>> {
        let definition = self.definitions.get(channel)?;
        let samples = match view {
            Some(view) => view.as_slice(),
            None => self.matrix.channel(channel)?,
        };
        Some(MeasuredChannel {
            index: channel,
            definition,
            samples,
            sample_rate: self.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ChannelRecord;
    use approx::assert_relative_eq;

    fn record(samples: &[[i16; 2]]) -> WaveformRecord {
        WaveformRecord {
            modality: "ECG".into(),
            sampling_frequency: 4.0,
            samples_per_channel: samples.len(),
            channel_count: 2,
            bits_allocated: 16,
            big_endian: false,
            data: samples
                .iter()
                .flat_map(|pair| pair.iter().flat_map(|s| s.to_le_bytes()))
                .collect(),
            channels: vec![
                ChannelRecord::new("Lead I", 1.0, 1.0, 0.0, "uV"),
                ChannelRecord::new("Lead II", 0.005, 1.0, 10.0, "mV"),
            ],
            annotations: Vec::new(),
        }
    }

    #[test]
    fn open_calibrates_decodes_and_measures_extent() {
        let rec = record(&[[100, 0], [-2500, 40], [300, -20], [0, 0], [0, 0], [0, 0]]);
        let waveform = Waveform::open(&rec, &ViewerConfig::default()).unwrap();

        assert_eq!(waveform.channel_count(), 2);
        assert_eq!(waveform.samples_per_channel(), 6);
        assert_eq!(waveform.matrix().channel(1).unwrap(), &[10, 50, -10, 10, 10, 10]);

        let lead_two = waveform.definition(1).unwrap();
        assert_relative_eq!(lead_two.scaling(), 5.0);
        let extent = lead_two.extent().unwrap();
        assert_relative_eq!(extent.max_uv, 250.0);
        assert_relative_eq!(extent.min_uv, -50.0);

        assert_eq!(waveform.seconds(), 1);
        assert_relative_eq!(waveform.samples_per_second(), 6.0);
        assert_relative_eq!(waveform.duration_seconds(), 1.5);
        // Lead I peaks at -2.5 mV
        assert_relative_eq!(waveform.millivolt_cells(), 6.0);
        assert_eq!(waveform.channel_index("lead ii"), Some(1));
    }

    #[test]
    fn any_channel_failure_aborts_open() {
        let mut rec = record(&[[1, 1]]);
        rec.channels[1].unit_code = Some("mmHg".into());
        assert_eq!(
            Waveform::open(&rec, &ViewerConfig::default()).unwrap_err(),
            WaveformError::UnsupportedUnit {
                code: "mmHg".into()
            }
        );

        let mut rec = record(&[[1, 1]]);
        rec.channels[0].sensitivity = None;
        assert_eq!(
            Waveform::open(&rec, &ViewerConfig::default()).unwrap_err(),
            WaveformError::MissingChannelMetadata {
                channel: 0,
                field: "sensitivity"
            }
        );

        let mut rec = record(&[[1, 1]]);
        rec.bits_allocated = 12;
        assert_eq!(
            Waveform::open(&rec, &ViewerConfig::default()).unwrap_err(),
            WaveformError::UnsupportedBitDepth { bits: 12 }
        );

        let mut rec = record(&[[1, 1]]);
        rec.channels.pop();
        assert!(matches!(
            Waveform::open(&rec, &ViewerConfig::default()),
            Err(WaveformError::MissingChannelMetadata { channel: 1, .. })
        ));
    }

    #[test]
    fn overstated_sample_count_fails_open() {
        let mut rec = record(&[[1, 2], [3, 4]]);
        rec.samples_per_channel = usize::MAX / 2 + 1;
        assert!(matches!(
            Waveform::open(&rec, &ViewerConfig::default()),
            Err(WaveformError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn flat_recording_reserves_two_cells() {
        let waveform = Waveform::open(&record(&[[0, -10], [0, -10]]), &ViewerConfig::default()).unwrap();
        assert_relative_eq!(waveform.millivolt_cells(), 2.0);
        assert_eq!(waveform.seconds(), 0);
        assert_relative_eq!(waveform.samples_per_second(), 4.0);
        assert_eq!(waveform.rhythm_channel(), None);
    }

    #[test]
    fn measured_channel_prefers_filtered_view() {
        let rec = record(&[[10, 0], [20, 0], [30, 0]]);
        let waveform = Waveform::open(&rec, &ViewerConfig::default()).unwrap();
        let view = FilteredView::build(
            waveform.matrix().channel(0).unwrap(),
            &crate::filters::MovingAverageFilter::new(1),
        );
        let raw = waveform.measured_channel(0, None).unwrap();
        let filtered = waveform.measured_channel(0, Some(&view)).unwrap();
        assert_eq!(raw.samples, &[10, 20, 30]);
        assert_eq!(filtered.samples, &[15, 20, 25]);
        assert!(waveform.measured_channel(2, None).is_none());
    }
}
