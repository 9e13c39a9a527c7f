use anyhow::Context;
use ecgcore::record::{AnnotationValue, ChannelRecord, StoredAnnotation, WaveformRecord};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const LEADS: [&str; 12] = [
    "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

/// Relative P, QRS and T amplitudes per lead.
const LEAD_GAINS: [(f64, f64, f64); 12] = [
    (0.6, 0.8, 0.5),
    (1.0, 1.0, 0.7),
    (0.4, 0.3, 0.2),
    (-0.8, -0.9, -0.6),
    (0.2, 0.4, 0.3),
    (0.7, 0.7, 0.5),
    (0.3, -0.6, 0.2),
    (0.4, -0.2, 0.8),
    (0.4, 0.5, 0.9),
    (0.4, 1.2, 0.9),
    (0.4, 1.3, 0.7),
    (0.4, 1.0, 0.5),
];

/// Microvolts per stored sample unit.
const SENSITIVITY_UV: f64 = 2.5;

/// Configuration for generating a synthetic resting ECG.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seconds: f64,
    pub sample_rate: f64,
    pub heart_rate_bpm: f64,
    /// Peak QRS amplitude in microvolts for a unit-gain lead.
    pub qrs_uv: f64,
    pub noise_uv: f64,
    pub seed: u64,
    /// Append a separate full-length rhythm channel recorded from lead II.
    pub rhythm_channel: bool,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seconds: 10.0,
            sample_rate: 500.0,
            heart_rate_bpm: 72.0,
            qrs_uv: 1200.0,
            noise_uv: 15.0,
            seed: 0,
            rhythm_channel: false,
        }
    }
}

fn bump(t: f64, centre: f64, width: f64) -> f64 {
    let x = (t - centre) / width;
    (-0.5 * x * x).exp()
}

/// One beat sampled at `phase` seconds after its onset.
fn beat(phase: f64, gains: (f64, f64, f64), qrs_uv: f64) -> f64 {
    let (p, qrs, t) = gains;
    let p_wave = 0.15 * p * bump(phase, 0.12, 0.025);
    let q_wave = -0.12 * qrs * bump(phase, 0.225, 0.008);
    let r_wave = qrs * bump(phase, 0.25, 0.011);
    let s_wave = -0.25 * qrs * bump(phase, 0.275, 0.009);
    let t_wave = 0.3 * t * bump(phase, 0.5, 0.05);
    (p_wave + q_wave + r_wave + s_wave + t_wave) * qrs_uv
}

pub fn build_record_from_config(config: &SyntheticConfig) -> anyhow::Result<WaveformRecord> {
    anyhow::ensure!(
        config.sample_rate > 0.0 && config.heart_rate_bpm > 0.0,
        "sample rate and heart rate must be positive"
    );
    let samples = (config.seconds * config.sample_rate).round() as usize;
    let rr = 60.0 / config.heart_rate_bpm;

    let mut gains: Vec<(&str, (f64, f64, f64))> = LEADS.iter().copied().zip(LEAD_GAINS).collect();
    if config.rhythm_channel {
        gains.push(("Rhythm II", LEAD_GAINS[1]));
    }
    let channel_count = gains.len();

    let byte_len = samples
        .checked_mul(channel_count * 2)
        .context("overflow computing synthetic payload size")?;
    let mut data = Vec::with_capacity(byte_len);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = config.noise_uv.abs();

    for i in 0..samples {
        let phase = (i as f64 / config.sample_rate) % rr;
        for (_, lead_gains) in &gains {
            let jitter = if noise > 0.0 {
                rng.gen_range(-noise..noise)
            } else {
                0.0
            };
            let uv = beat(phase, *lead_gains, config.qrs_uv) + jitter;
            let raw = (uv / SENSITIVITY_UV)
                .round()
                .clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            data.extend_from_slice(&raw.to_le_bytes());
        }
    }

    let channels = gains
        .iter()
        .map(|(name, _)| {
            let label = if name.starts_with("Rhythm") {
                name.to_string()
            } else {
                format!("Lead {}", name)
            };
            let mut channel = ChannelRecord::new(&label, SENSITIVITY_UV, 1.0, 0.0, "uV");
            channel.rhythm = name.starts_with("Rhythm");
            channel
        })
        .collect();

    let rr_ms = (rr * 1000.0).round();
    Ok(WaveformRecord {
        modality: "ECG".into(),
        sampling_frequency: config.sample_rate,
        samples_per_channel: samples,
        channel_count,
        bits_allocated: 16,
        big_endian: false,
        data,
        channels,
        annotations: vec![
            StoredAnnotation {
                name: "Patient Name".into(),
                value: AnnotationValue::from("Synthetic^Patient"),
                unit: String::new(),
                channel: String::new(),
            },
            StoredAnnotation {
                name: "RR Interval".into(),
                value: AnnotationValue::Number(rr_ms),
                unit: "ms".into(),
                channel: String::new(),
            },
        ],
    })
}

pub fn build_record(seed: u64, rhythm_channel: bool) -> anyhow::Result<WaveformRecord> {
    let config = SyntheticConfig {
        seed,
        rhythm_channel,
        ..Default::default()
    };
    build_record_from_config(&config)
}
