use approx::assert_relative_eq;
use ecgcore::config::ViewerConfig;
use ecgcore::filters::FilterPreset;
use ecgcore::layout::{DisplayFormat, Scale, Size};
use ecgcore::measure::{IntervalKind, PointerButton, PointerEvent, Tool};
use ecgcore::plugin::{PluginRegistry, TabContent};
use ecgcore::record::{ChannelRecord, WaveformRecord};
use ecgcore::{Waveform, WaveformError};

const LEADS: [&str; 12] = [
    "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];
const RATE: usize = 500;
const SAMPLES: usize = 5000;

/// Twelve leads stored in reverse order, each a 1 s sawtooth scaled by lead.
fn twelve_lead_record() -> WaveformRecord {
    let channels: Vec<ChannelRecord> = LEADS
        .iter()
        .rev()
        .map(|lead| ChannelRecord::new(&format!("Lead {}", lead), 2.5, 1.0, 0.0, "uV"))
        .collect();
    let mut data = Vec::with_capacity(SAMPLES * channels.len() * 2);
    for i in 0..SAMPLES {
        for ch in 0..channels.len() {
            let value = ((i % RATE) as i16 - 250) * (ch as i16 + 1);
            data.extend_from_slice(&value.to_le_bytes());
        }
    }
    WaveformRecord {
        modality: "ECG".into(),
        sampling_frequency: RATE as f64,
        samples_per_channel: SAMPLES,
        channel_count: channels.len(),
        bits_allocated: 16,
        big_endian: false,
        data,
        channels,
        annotations: Vec::new(),
    }
}

#[test]
fn reversed_leads_open_into_standard_four_column_layout() {
    let mut registry = PluginRegistry::with_defaults(ViewerConfig::default());
    let (mut plugin, tab) = registry.open(&twelve_lead_record()).expect("ecg plugin");
    assert!(matches!(tab, TabContent::PluginActive(_)));

    let session = plugin.as_waveform_mut().expect("waveform plugin");
    let layout = session.layout_mut().unwrap();
    assert!(layout.ordering().is_standard());
    layout.set_format(DisplayFormat::FourColumnWithRhythm);
    layout.set_speed(Scale::Auto);

    let (size, placements) = layout.layout_for_viewport(Size::new(1200.0, 900.0));
    assert!(size.mm_per_second >= 1.0 && size.mm_per_second <= 25.0);
    let names: Vec<&str> = placements
        .iter()
        .map(|p| p.name.trim_start_matches("Lead "))
        .collect();
    assert_eq!(
        names,
        vec!["I", "aVR", "V1", "V4", "II", "aVL", "V2", "V5", "III", "aVF", "V3", "V6", "II"]
    );
    assert!(placements[12].rhythm);
    assert_eq!(placements[3].first_sample, 3750);
}

#[test]
fn measure_then_commit_rr_and_qt() {
    let config = ViewerConfig::default();
    let mut registry = PluginRegistry::with_defaults(config);
    let (mut plugin, _) = registry.open(&twelve_lead_record()).unwrap();
    let session = plugin.as_waveform_mut().unwrap();

    let layout = session.layout_mut().unwrap();
    layout.set_format(DisplayFormat::FourColumn);
    let placements = layout.layout(Size::new(1000.0, 600.0));
    let lead_one = session.placement_of(&placements, 11).unwrap().clone();
    assert_eq!(lead_one.name, "Lead I");

    // 250 px per 2.5 s cell: 5 samples per pixel
    let press = |button, x| PointerEvent::Press { button, x };
    session.pointer(&lead_one, press(PointerButton::Primary, 20.0)).unwrap();
    session.pointer(&lead_one, press(PointerButton::Secondary, 180.0)).unwrap();
    let committed = session.commit_interval(IntervalKind::Rr).unwrap();
    assert_relative_eq!(committed.milliseconds, 1600.0);
    assert_eq!(committed.bpm, Some(37.0));

    let lead_two = session.placement_of(&placements, 10).unwrap().clone();
    session.pointer(&lead_two, press(PointerButton::Primary, 10.0)).unwrap();
    session.pointer(&lead_two, press(PointerButton::Secondary, 90.0)).unwrap();
    assert_eq!(
        session.commit_interval(IntervalKind::Qt).unwrap_err(),
        WaveformError::AmbiguousMeasurement { count: 2 }
    );

    session
        .pointer(&lead_one, press(PointerButton::Middle, 20.0))
        .unwrap();
    let committed = session.commit_interval(IntervalKind::Qt).unwrap();
    assert_relative_eq!(committed.milliseconds, 800.0);
    // 1000 * 0.8 / sqrt(1.6)
    assert_eq!(committed.qtc_milliseconds, Some(632.0));

    session.set_tool(Tool::HorizontalMeasure).unwrap();
    assert_eq!(
        session.commit_interval(IntervalKind::Qt).unwrap_err(),
        WaveformError::NoMeasurementFound
    );
}

#[test]
fn filtering_changes_measured_values_but_not_source() {
    let record = twelve_lead_record();
    let config = ViewerConfig::default();
    let waveform = Waveform::open(&record, &config).unwrap();
    let mut bank = waveform.filter_bank(&config.filters);
    let raw = waveform.matrix().channel(0).unwrap().to_vec();

    assert!(bank.set_preset(waveform.matrix(), FilterPreset::Smoother));
    let smoothed = bank.view(0).unwrap();
    assert_eq!(smoothed.len(), raw.len());
    // sawtooth wrap at sample 500 is softened
    assert!(smoothed.get(500).unwrap() > raw[500]);
    assert_eq!(waveform.matrix().channel(0).unwrap(), raw.as_slice());

    let measured = waveform.measured_channel(0, Some(smoothed)).unwrap();
    assert_eq!(measured.samples.len(), SAMPLES);
}

#[test]
fn corrupt_record_fails_as_a_whole() {
    let mut record = twelve_lead_record();
    record.channels[7].unit_code = Some("mmHg".into());
    let mut registry = PluginRegistry::with_defaults(ViewerConfig::default());
    let (plugin, tab) = registry.open(&record).unwrap();
    assert!(plugin.as_waveform().map_or(false, |w| !w.is_open()));
    assert_eq!(tab, TabContent::Error("unsupported sensitivity unit: mmHg".into()));
}
