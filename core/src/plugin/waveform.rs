use crate::config::ViewerConfig;
use crate::filters::{FilterBank, FilterPreset};
use crate::layout::{ChannelPlacement, LeadLayoutEngine};
use crate::measure::{
    AnnotationBoard, CommittedInterval, IntervalCommitter, IntervalKind, MeasurementEngine,
    PointerEvent, Tool,
};
use crate::plugin::{PluginFactory, ViewerPlugin};
use crate::prelude::{WaveformError, WaveformResult};
use crate::record::WaveformRecord;
use crate::waveform::Waveform;

/// Supports ECG records that carry sample data.
pub struct WaveformPluginFactory;

impl PluginFactory for WaveformPluginFactory {
    fn name(&self) -> &'static str {
        "waveform"
    }

    fn supports(&self, record: &WaveformRecord) -> bool {
        record.modality.eq_ignore_ascii_case("ECG") && record.has_samples()
    }

    fn create(&self, config: &ViewerConfig) -> Box<dyn ViewerPlugin> {
        Box::new(WaveformPlugin::new(config.clone()))
    }
}

struct Session {
    waveform: Waveform,
    layout: LeadLayoutEngine,
    filters: FilterBank,
    measure: MeasurementEngine,
    board: AnnotationBoard,
    intervals: IntervalCommitter,
}

impl Session {
    /// Recomputes published measures from the active filter's samples.
    fn republish(&mut self) {
        let Session {
            waveform,
            filters,
            measure,
            board,
            ..
        } = self;
        for index in 0..waveform.channel_count() {
            if let Some(channel) = waveform.measured_channel(index, filters.view(index)) {
                measure.refresh(&channel, &mut *board);
            }
        }
    }
}

/// One opened waveform with its layout, filter and measurement state.
pub struct WaveformPlugin {
    config: ViewerConfig,
    session: Option<Session>,
}

impl WaveformPlugin {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> WaveformResult<&Session> {
        self.session
            .as_ref()
            .ok_or(WaveformError::NotOpen)
    }

    fn session_mut(&mut self) -> WaveformResult<&mut Session> {
        self.session
            .as_mut()
            .ok_or(WaveformError::NotOpen)
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.session.as_ref().map(|s| &s.waveform)
    }

    pub fn layout(&self) -> Option<&LeadLayoutEngine> {
        self.session.as_ref().map(|s| &s.layout)
    }

    pub fn layout_mut(&mut self) -> Option<&mut LeadLayoutEngine> {
        self.session.as_mut().map(|s| &mut s.layout)
    }

    pub fn annotations(&self) -> Option<&AnnotationBoard> {
        self.session.as_ref().map(|s| &s.board)
    }

    pub fn measurements(&self) -> Option<&MeasurementEngine> {
        self.session.as_ref().map(|s| &s.measure)
    }

    pub fn filter_preset(&self) -> Option<FilterPreset> {
        self.session.as_ref().map(|s| s.filters.preset())
    }

    pub fn set_filter(&mut self, preset: FilterPreset) -> WaveformResult<bool> {
        let session = self.session_mut()?;
        let changed = session.filters.set_preset(session.waveform.matrix(), preset);
        if changed {
            session.republish();
        }
        Ok(changed)
    }

    pub fn set_tool(&mut self, tool: Tool) -> WaveformResult<()> {
        let session = self.session_mut()?;
        session.measure.set_tool(tool, &mut session.board);
        session.republish();
        Ok(())
    }

    /// Routes a pointer event over `placement` to the measurement engine,
    /// measuring on the active filter's output.
    pub fn pointer(&mut self, placement: &ChannelPlacement, event: PointerEvent) -> WaveformResult<()> {
        let session = self.session_mut()?;
        let view = session.filters.view(placement.channel);
        let channel = session
            .waveform
            .measured_channel(placement.channel, view)
            .ok_or_else(|| {
                WaveformError::InvalidDimensions(format!("no channel {}", placement.channel))
            })?;
        session
            .measure
            .handle(&channel, placement, event, &mut session.board);
        Ok(())
    }

    /// Drops every marker and the measures derived from them.
    pub fn clear_markers(&mut self) -> WaveformResult<()> {
        let session = self.session_mut()?;
        session.measure.clear_all(&mut session.board);
        Ok(())
    }

    pub fn commit_interval(&mut self, kind: IntervalKind) -> WaveformResult<CommittedInterval> {
        let session = self.session_mut()?;
        if session.measure.tool() != Tool::VerticalMeasure {
            return Err(WaveformError::NoMeasurementFound);
        }
        session.intervals.commit(kind, &mut session.board)
    }

    /// Placement of `channel` in `placements`, if laid out.
    pub fn placement_of<'a>(
        &self,
        placements: &'a [ChannelPlacement],
        channel: usize,
    ) -> WaveformResult<&'a ChannelPlacement> {
        self.session()?;
        placements
            .iter()
            .find(|p| p.channel == channel)
            .ok_or_else(|| WaveformError::InvalidDimensions(format!("channel {} not laid out", channel)))
    }
}

impl ViewerPlugin for WaveformPlugin {
    fn name(&self) -> &str {
        "waveform"
    }

    fn open(&mut self, record: &WaveformRecord) -> WaveformResult<()> {
        let waveform = Waveform::open(record, &self.config)?;
        let layout = LeadLayoutEngine::for_waveform(&waveform, &self.config);
        let filters = waveform.filter_bank(&self.config.filters);
        let measure = MeasurementEngine::new(
            waveform.channel_names(),
            waveform.samples_per_channel(),
            self.config.marker_clear,
        );
        let board = AnnotationBoard::from_stored(&record.annotations);
        self.session = Some(Session {
            waveform,
            layout,
            filters,
            measure,
            board,
            intervals: IntervalCommitter::new(),
        });
        Ok(())
    }

    fn as_waveform(&self) -> Option<&WaveformPlugin> {
        Some(self)
    }

    fn as_waveform_mut(&mut self) -> Option<&mut WaveformPlugin> {
        Some(self)
    }
}
