use serde::Serialize;

use crate::calibration::ChannelDefinition;
use crate::config::MarkerClearPolicy;
use crate::layout::ChannelPlacement;
use crate::math::StatsHelper;
use crate::measure::marker::{MarkerType, SampleMarker, Tool};
use crate::measure::sink::{AnnotationSink, NO_CHANNEL};
use crate::record::AnnotationValue;
use crate::telemetry::log::LogManager;

pub const CURSOR_TIME: &str = "cursor time";
pub const CURSOR_VALUE: &str = "cursor value";
pub const START_TIME: &str = "start time";
pub const START_VALUE: &str = "start value";
pub const STOP_TIME: &str = "stop time";
pub const STOP_VALUE: &str = "stop value";
pub const DURATION: &str = "duration";
pub const AMPLITUDE_DIFFERENCE: &str = "amplitude difference";
pub const AMPLITUDE_RANGE: &str = "amplitude range";
pub const MARKER_COUNT: &str = "marker count";

/// Samples a measurement reads, filtered or raw, with their calibration.
#[derive(Debug, Clone, Copy)]
pub struct MeasuredChannel<'a> {
    pub index: usize,
    pub definition: &'a ChannelDefinition,
    pub samples: &'a [i32],
    pub sample_rate: f64,
}

impl MeasuredChannel<'_> {
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    fn in_range(&self, sample: Option<usize>) -> Option<usize> {
        sample.filter(|&s| s < self.samples.len())
    }

    fn seconds(&self, sample: usize) -> f64 {
        sample as f64 / self.sample_rate
    }

    fn millivolts(&self, sample: usize) -> Option<f64> {
        self.samples
            .get(sample)
            .map(|&raw| self.definition.to_millivolts(raw))
    }

    /// Physical peak-to-peak over `[min(a, b), max(a, b)]`.
    fn range_millivolts(&self, a: usize, b: usize) -> Option<f64> {
        let (lo, hi) = (a.min(b), a.max(b));
        let window = self.samples.get(lo..=hi)?;
        let (min, max) = StatsHelper::min_max(window)?;
        Some((self.definition.to_millivolts(max) - self.definition.to_millivolts(min)).abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureState {
    Empty,
    Highlighted,
    /// One marker placed.
    StartSet,
    StartAndStopSet,
}

/// Values derived from the active tool's markers on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MeasureReading {
    pub start_time: Option<f64>,
    pub start_value_mv: Option<f64>,
    pub stop_time: Option<f64>,
    pub stop_value_mv: Option<f64>,
    pub duration_seconds: Option<f64>,
    pub amplitude_difference_mv: Option<f64>,
    pub amplitude_range_mv: Option<f64>,
    pub marker_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input over one channel cell, in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { x: f64 },
    Press { button: PointerButton, x: f64 },
    Drag { button: PointerButton, x: f64, dx: f64 },
}

#[derive(Debug, Clone, Default)]
struct ChannelTrack {
    highlighted: Option<usize>,
    markers: Vec<SampleMarker>,
}

/// Converts a horizontal drag inside `placement` into a sample shift.
pub fn drag_delta_samples(dx: f64, placement: &ChannelPlacement) -> i64 {
    let seconds = dx * placement.seconds_per_pixel();
    let samples = (seconds * placement.sample_rate).round();
    if samples.is_finite() {
        samples as i64
    } else {
        0
    }
}

/// Pointer-driven markers per (tool, channel) and the measures derived from
/// them.
pub struct MeasurementEngine {
    tool: Tool,
    clear_policy: MarkerClearPolicy,
    names: Vec<String>,
    sample_count: usize,
    tracks: Vec<ChannelTrack>,
    active_channel: Option<usize>,
    logger: LogManager,
}

impl MeasurementEngine {
    pub fn new(names: Vec<String>, sample_count: usize, clear_policy: MarkerClearPolicy) -> Self {
        Self {
            tool: Tool::default(),
            clear_policy,
            tracks: vec![ChannelTrack::default(); names.len()],
            names,
            sample_count,
            active_channel: None,
            logger: LogManager::new("measure"),
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn active_channel(&self) -> Option<usize> {
        self.active_channel
    }

    pub fn highlighted(&self, channel: usize) -> Option<usize> {
        self.tracks.get(channel).and_then(|t| t.highlighted)
    }

    pub fn markers(&self, channel: usize) -> &[SampleMarker] {
        self.tracks
            .get(channel)
            .map(|t| t.markers.as_slice())
            .unwrap_or_default()
    }

    pub fn marker(&self, channel: usize, kind: MarkerType) -> Option<usize> {
        self.markers(channel)
            .iter()
            .find(|m| m.tool == self.tool && m.kind == kind)
            .map(|m| m.sample)
    }

    pub fn state(&self, channel: usize) -> MeasureState {
        let Some(track) = self.tracks.get(channel) else {
            return MeasureState::Empty;
        };
        let has = |kind| track.markers.iter().any(|m| m.tool == self.tool && m.kind == kind);
        let placed = track.markers.iter().filter(|m| m.tool == self.tool).count();
        if has(MarkerType::Start) && has(MarkerType::Stop) {
            MeasureState::StartAndStopSet
        } else if placed > 0 {
            MeasureState::StartSet
        } else if track.highlighted.is_some() {
            MeasureState::Highlighted
        } else {
            MeasureState::Empty
        }
    }

    /// Moves the highlight. Out-of-range samples clear it and reset the
    /// cursor readouts.
    pub fn set_highlighted(
        &mut self,
        channel: &MeasuredChannel<'_>,
        sample: Option<usize>,
        sink: &mut dyn AnnotationSink,
    ) -> Option<usize> {
        let sample = channel.in_range(sample);
        let Some(track) = self.tracks.get_mut(channel.index) else {
            return None;
        };
        track.highlighted = sample;

        let readout = sample.and_then(|s| Some((channel.seconds(s), channel.millivolts(s)?)));
        match readout {
            Some((time, value)) => {
                sink.set_measure(CURSOR_TIME, NO_CHANNEL, time.into(), "s", false);
                sink.set_measure(CURSOR_VALUE, NO_CHANNEL, value.into(), "mV", false);
            }
            None => {
                sink.set_measure(CURSOR_TIME, NO_CHANNEL, "".into(), "", false);
                sink.set_measure(CURSOR_VALUE, NO_CHANNEL, "".into(), "", false);
            }
        }
        sample
    }

    /// Places or replaces the start/stop marker of the active tool. An
    /// out-of-range sample removes that marker instead.
    pub fn set_measure_marker(
        &mut self,
        channel: &MeasuredChannel<'_>,
        sample: Option<usize>,
        kind: MarkerType,
        sink: &mut dyn AnnotationSink,
    ) {
        if !self.tool.is_measure() || kind == MarkerType::Any {
            return;
        }
        let tool = self.tool;
        let sample = channel.in_range(sample);
        let Some(track) = self.touch(channel.index) else {
            return;
        };

        track.markers.retain(|m| !m.same_slot(tool, kind));
        if let Some(sample) = sample {
            track
                .markers
                .push(SampleMarker::new(tool, kind, sample, channel.name()));
        }
        self.logger.trace(&format!(
            "{} {:?} marker on {} at {:?}",
            tool,
            kind,
            channel.name(),
            sample
        ));
        self.publish(channel, sink);
    }

    /// Adds a free marker for the multiple-markers tool.
    pub fn add_marker(
        &mut self,
        channel: &MeasuredChannel<'_>,
        sample: Option<usize>,
        sink: &mut dyn AnnotationSink,
    ) -> bool {
        if self.tool != Tool::MultipleMarkers {
            return false;
        }
        let Some(sample) = channel.in_range(sample) else {
            return false;
        };
        let Some(track) = self.touch(channel.index) else {
            return false;
        };
        if track
            .markers
            .iter()
            .any(|m| m.tool == Tool::MultipleMarkers && m.sample == sample)
        {
            return false;
        }
        track.markers.push(SampleMarker::new(
            Tool::MultipleMarkers,
            MarkerType::Any,
            sample,
            channel.name(),
        ));
        self.publish(channel, sink);
        true
    }

    /// Shifts every free marker of the active tool on every channel. Markers
    /// pushed out of the recording are dropped.
    pub fn shift_markers(&mut self, delta_samples: i64, sink: &mut dyn AnnotationSink) {
        if delta_samples == 0 {
            return;
        }
        let tool = self.tool;
        let sample_count = self.sample_count;
        for (index, track) in self.tracks.iter_mut().enumerate() {
            let before = track.markers.len();
            let mut moved = false;
            track.markers.retain_mut(|m| {
                if m.tool != tool || m.kind != MarkerType::Any {
                    return true;
                }
                moved = true;
                m.shift(delta_samples, sample_count)
            });
            if moved && track.markers.len() != before {
                publish_count(tool, &self.names[index], track, sink);
            }
        }
    }

    /// Switches tools, clearing markers according to the clear policy.
    pub fn set_tool(&mut self, tool: Tool, sink: &mut dyn AnnotationSink) {
        if tool == self.tool {
            return;
        }
        match self.clear_policy {
            MarkerClearPolicy::AllChannels => self.clear_all(sink),
            MarkerClearPolicy::ActiveChannel => {
                if let Some(active) = self.active_channel {
                    self.clear_channel(active, sink);
                }
                // Other channels keep their markers until touched, but what
                // the outgoing tool published goes now.
                let outgoing = self.tool;
                for (track, name) in self.tracks.iter().zip(&self.names) {
                    if track.markers.iter().any(|m| m.tool == outgoing) {
                        sink.remove_measures(None, name);
                    }
                }
            }
        }
        self.logger.record(&format!("tool {} -> {}", self.tool, tool));
        self.tool = tool;
    }

    pub fn clear_channel(&mut self, channel: usize, sink: &mut dyn AnnotationSink) {
        if let (Some(track), Some(name)) = (self.tracks.get_mut(channel), self.names.get(channel)) {
            track.markers.clear();
            sink.remove_measures(None, name);
        }
    }

    pub fn clear_all(&mut self, sink: &mut dyn AnnotationSink) {
        for channel in 0..self.tracks.len() {
            self.clear_channel(channel, sink);
        }
    }

    /// Republishes the measures of `channel` from its current samples.
    /// Channels without markers are left alone.
    pub fn refresh(&self, channel: &MeasuredChannel<'_>, sink: &mut dyn AnnotationSink) {
        if self.markers(channel.index).is_empty() {
            return;
        }
        self.publish(channel, sink);
    }

    /// Derived values for the active tool on `channel`.
    pub fn reading(&self, channel: &MeasuredChannel<'_>) -> MeasureReading {
        let start = self.marker(channel.index, MarkerType::Start);
        let stop = self.marker(channel.index, MarkerType::Stop);
        let start_value = start.and_then(|s| channel.millivolts(s));
        let stop_value = stop.and_then(|s| channel.millivolts(s));
        let difference = start_value.zip(stop_value).map(|(a, b)| b - a);

        match self.tool {
            Tool::VerticalMeasure => MeasureReading {
                start_time: start.map(|s| channel.seconds(s)),
                start_value_mv: start_value,
                stop_time: stop.map(|s| channel.seconds(s)),
                stop_value_mv: stop_value,
                duration_seconds: start
                    .zip(stop)
                    .map(|(a, b)| (b as f64 - a as f64) / channel.sample_rate),
                amplitude_difference_mv: difference,
                amplitude_range_mv: start
                    .zip(stop)
                    .and_then(|(a, b)| channel.range_millivolts(a, b)),
                marker_count: usize::from(start.is_some()) + usize::from(stop.is_some()),
            },
            Tool::HorizontalMeasure => MeasureReading {
                start_value_mv: start_value,
                stop_value_mv: stop_value,
                amplitude_difference_mv: difference,
                marker_count: usize::from(start.is_some()) + usize::from(stop.is_some()),
                ..MeasureReading::default()
            },
            Tool::MultipleMarkers => MeasureReading {
                marker_count: self
                    .markers(channel.index)
                    .iter()
                    .filter(|m| m.tool == Tool::MultipleMarkers)
                    .count(),
                ..MeasureReading::default()
            },
        }
    }

    /// Applies one pointer event over `placement`.
    pub fn handle(
        &mut self,
        channel: &MeasuredChannel<'_>,
        placement: &ChannelPlacement,
        event: PointerEvent,
        sink: &mut dyn AnnotationSink,
    ) {
        match event {
            PointerEvent::Move { x } => {
                self.set_highlighted(channel, placement.x_to_sample(x), sink);
            }
            PointerEvent::Press { button, x } => {
                let sample = self.set_highlighted(channel, placement.x_to_sample(x), sink);
                match (button, self.tool.is_measure()) {
                    (PointerButton::Middle, _) => self.clear_channel(channel.index, sink),
                    (PointerButton::Primary, true) => {
                        self.set_measure_marker(channel, sample, MarkerType::Start, sink)
                    }
                    (PointerButton::Secondary, true) => {
                        self.set_measure_marker(channel, sample, MarkerType::Stop, sink)
                    }
                    (PointerButton::Primary, false) => {
                        self.add_marker(channel, sample, sink);
                    }
                    (PointerButton::Secondary, false) => {}
                }
            }
            PointerEvent::Drag { button, x, dx } => {
                let sample = self.set_highlighted(channel, placement.x_to_sample(x), sink);
                match (button, self.tool.is_measure()) {
                    (PointerButton::Primary, true) => {
                        self.set_measure_marker(channel, sample, MarkerType::Start, sink)
                    }
                    (PointerButton::Secondary, true) => {
                        self.set_measure_marker(channel, sample, MarkerType::Stop, sink)
                    }
                    (_, false) => self.shift_markers(drag_delta_samples(dx, placement), sink),
                    (PointerButton::Middle, true) => {}
                }
            }
        }
    }

    /// Marks `channel` active and drops markers other tools left on it.
    fn touch(&mut self, channel: usize) -> Option<&mut ChannelTrack> {
        let tool = self.tool;
        let track = self.tracks.get_mut(channel)?;
        self.active_channel = Some(channel);
        track.markers.retain(|m| m.tool == tool);
        Some(track)
    }

    fn publish(&self, channel: &MeasuredChannel<'_>, sink: &mut dyn AnnotationSink) {
        let name = channel.name();
        sink.remove_measures(None, name);
        let reading = self.reading(channel);

        let mut set = |measure: &str, value: Option<f64>, unit: &str, important: bool| {
            if let Some(value) = value {
                sink.set_measure(measure, name, AnnotationValue::Number(value), unit, important);
            }
        };
        match self.tool {
            Tool::VerticalMeasure => {
                set(START_TIME, reading.start_time, "s", false);
                set(START_VALUE, reading.start_value_mv, "mV", false);
                set(STOP_TIME, reading.stop_time, "s", false);
                set(STOP_VALUE, reading.stop_value_mv, "mV", false);
                set(DURATION, reading.duration_seconds.map(|s| s * 1000.0), "ms", true);
                set(AMPLITUDE_DIFFERENCE, reading.amplitude_difference_mv, "mV", true);
                set(AMPLITUDE_RANGE, reading.amplitude_range_mv, "mV", true);
            }
            Tool::HorizontalMeasure => {
                set(START_VALUE, reading.start_value_mv, "mV", false);
                set(STOP_VALUE, reading.stop_value_mv, "mV", false);
                set(AMPLITUDE_DIFFERENCE, reading.amplitude_difference_mv, "mV", true);
            }
            Tool::MultipleMarkers => {
                if let Some(track) = self.tracks.get(channel.index) {
                    publish_count(self.tool, name, track, sink);
                }
            }
        }
    }
}

fn publish_count(tool: Tool, name: &str, track: &ChannelTrack, sink: &mut dyn AnnotationSink) {
    let count = track.markers.iter().filter(|m| m.tool == tool).count();
    if count == 0 {
        sink.remove_measures(Some(MARKER_COUNT), name);
    } else {
        sink.set_measure(MARKER_COUNT, name, (count as f64).into(), "", false);
    }
}
