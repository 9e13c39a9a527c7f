use crate::config::OverflowPolicy;
use crate::decode::matrix::RawSampleMatrix;
use crate::prelude::{WaveformError, WaveformResult};
use crate::telemetry::log::LogManager;

/// Supported sample widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl TryFrom<u16> for BitDepth {
    type Error = WaveformError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            other => Err(WaveformError::UnsupportedBitDepth { bits: other }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn from_big_endian(big_endian: bool) -> Self {
        if big_endian {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

/// Everything needed to turn a sample payload into a matrix.
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    pub bytes: &'a [u8],
    pub bits_per_sample: u16,
    pub byte_order: ByteOrder,
    pub channel_count: usize,
    pub sample_count: usize,
    /// One raw-unit baseline per channel, added after decoding.
    pub baselines: &'a [f64],
}

/// Decodes channel-interleaved sample payloads.
pub struct WaveformDecoder {
    overflow: OverflowPolicy,
    logger: LogManager,
}

impl WaveformDecoder {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self {
            overflow,
            logger: LogManager::new("decoder"),
        }
    }

    pub fn decode(&self, request: &DecodeRequest<'_>) -> WaveformResult<RawSampleMatrix> {
        let depth = BitDepth::try_from(request.bits_per_sample)?;
        let channels = request.channel_count;
        if channels == 0 {
            return Err(WaveformError::InvalidDimensions(
                "channel count must be positive".into(),
            ));
        }
        if request.baselines.len() != channels {
            return Err(WaveformError::InvalidDimensions(format!(
                "expected {} baselines, got {}",
                channels,
                request.baselines.len()
            )));
        }

        let elements = decode_elements(request.bytes, depth, request.byte_order);
        let declared = channels.checked_mul(request.sample_count).ok_or_else(|| {
            WaveformError::InvalidDimensions(format!(
                "{} channels x {} samples does not fit in memory",
                channels, request.sample_count
            ))
        })?;
        let mut samples = request.sample_count;

        if elements.len() > declared {
            match self.overflow {
                OverflowPolicy::Truncate => self.logger.warn(&format!(
                    "payload holds {} samples, {} declared; discarding the excess",
                    elements.len(),
                    declared
                )),
                OverflowPolicy::Extend => {
                    samples = elements.len() / channels;
                    self.logger.warn(&format!(
                        "payload holds {} samples, {} declared; using {} per channel",
                        elements.len(),
                        declared,
                        samples
                    ));
                }
            }
        } else if elements.len() < declared {
            let available = elements.len().div_ceil(channels);
            match self.overflow {
                // Only a partial last frame is padded; anything shorter is a
                // record that lies about its length.
                OverflowPolicy::Truncate if available < request.sample_count => {
                    return Err(WaveformError::InvalidDimensions(format!(
                        "payload holds {} samples, {} declared",
                        elements.len(),
                        declared
                    )));
                }
                OverflowPolicy::Truncate => {}
                OverflowPolicy::Extend => samples = available,
            }
            self.logger.warn(&format!(
                "payload holds {} samples, {} declared; using {} per channel",
                elements.len(),
                declared,
                samples
            ));
        }

        let mut matrix = RawSampleMatrix::from_interleaved(&elements, channels, samples);
        for (channel, &baseline) in request.baselines.iter().enumerate() {
            matrix.apply_baseline(channel, baseline);
        }

        self.logger.trace(&format!(
            "decoded {} channels x {} samples",
            matrix.channels(),
            matrix.samples_per_channel()
        ));
        Ok(matrix)
    }
}

fn decode_elements(bytes: &[u8], depth: BitDepth, order: ByteOrder) -> Vec<i32> {
    match depth {
        BitDepth::Eight => bytes.iter().map(|&b| b as i8 as i32).collect(),
        // A dangling odd byte cannot form a sample and is ignored.
        BitDepth::Sixteen => bytes
            .chunks_exact(2)
            .map(|pair| {
                let pair = [pair[0], pair[1]];
                match order {
                    ByteOrder::Little => i16::from_le_bytes(pair) as i32,
                    ByteOrder::Big => i16::from_be_bytes(pair) as i32,
                }
            })
            .collect(),
    }
}
