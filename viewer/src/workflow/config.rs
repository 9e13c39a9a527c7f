use anyhow::Context;
use ecgcore::config::ViewerConfig;
use ecgcore::filters::FilterPreset;
use ecgcore::layout::{DisplayFormat, Scale, Size, Zoom};
use ecgcore::measure::IntervalKind;
use ecgcore::record::WaveformRecord;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ViewerConfig> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading viewer config {}", path_ref.display()))?;
    let config: ViewerConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("parsing viewer config {}", path_ref.display()))?;
    Ok(config)
}

pub fn load_record<P: AsRef<Path>>(path: P) -> anyhow::Result<WaveformRecord> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading waveform record {}", path_ref.display()))?;
    let record: WaveformRecord = serde_json::from_str(&contents)
        .with_context(|| format!("parsing waveform record {}", path_ref.display()))?;
    Ok(record)
}

/// `auto` or a positive number.
pub fn parse_scale(value: &str) -> Result<Scale, String> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Ok(Scale::Auto);
    }
    match value.trim().parse::<f64>() {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(Scale::Fixed(v)),
        _ => Err(format!("expected 'auto' or a positive number, got '{}'", value)),
    }
}

pub fn parse_zoom(value: &str) -> Result<Zoom, String> {
    parse_scale(value).map(|scale| match scale {
        Scale::Auto => Zoom::Auto,
        Scale::Fixed(z) => Zoom::Factor(z),
    })
}

/// Display state requested on the command line.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub format: DisplayFormat,
    pub speed: Scale,
    pub amplitude: Scale,
    pub zoom: Zoom,
    pub filter: FilterPreset,
    pub viewport: Size,
}

impl DisplayOptions {
    /// Defaults taken from the viewer configuration.
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            format: DisplayFormat::Default,
            speed: Scale::Fixed(config.default_speed),
            amplitude: Scale::Fixed(config.default_amplitude),
            zoom: Zoom::default(),
            filter: FilterPreset::Noop,
            viewport: Size::new(1280.0, 800.0),
        }
    }
}

/// A scripted vertical measurement: `LEAD:START:STOP[:rr|qt]`, samples
/// inclusive of the start.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRequest {
    pub lead: String,
    pub start: usize,
    pub stop: usize,
    pub commit: Option<IntervalKind>,
}

impl FromStr for MeasureRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let sample = |text: &str| {
            text.parse::<usize>()
                .map_err(|_| format!("invalid sample index '{}' in '{}'", text, s))
        };
        let commit = match parts.get(3).copied() {
            None => None,
            Some(kind) if kind.eq_ignore_ascii_case("rr") => Some(IntervalKind::Rr),
            Some(kind) if kind.eq_ignore_ascii_case("qt") => Some(IntervalKind::Qt),
            Some(kind) => return Err(format!("unknown interval '{}'", kind)),
        };
        match parts.as_slice() {
            [lead, start, stop, ..] if parts.len() <= 4 && !lead.is_empty() => Ok(Self {
                lead: lead.to_string(),
                start: sample(*start)?,
                stop: sample(*stop)?,
                commit,
            }),
            _ => Err(format!("expected LEAD:START:STOP[:rr|qt], got '{}'", s)),
        }
    }
}
