use crate::gui_bridge::model::{AnnotationModel, LayoutModel, ViewerModel};
use crate::workflow::config::{DisplayOptions, MeasureRequest};
use anyhow::Context;
use ecgcore::config::ViewerConfig;
use ecgcore::layout::ChannelPlacement;
use ecgcore::measure::{AnnotationSink, PointerButton, PointerEvent};
use ecgcore::plugin::{PluginRegistry, TabContent, WaveformPlugin};
use ecgcore::record::WaveformRecord;
use log::{info, warn};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub modality: String,
    pub channels: usize,
    pub samples_per_channel: usize,
    pub sample_rate: f64,
    pub seconds: usize,
    pub millivolt_cells: f64,
    pub standard_leads: bool,
}

pub struct ViewerReport {
    pub summary: RecordSummary,
    pub model: ViewerModel,
    pub commit_errors: Vec<String>,
}

#[derive(Clone)]
pub struct Runner {
    config: ViewerConfig,
}

impl Runner {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn execute(
        &self,
        record: &WaveformRecord,
        display: &DisplayOptions,
        measures: &[MeasureRequest],
    ) -> anyhow::Result<ViewerReport> {
        let mut registry = PluginRegistry::with_defaults(self.config.clone());
        let (mut plugin, tab) = registry
            .open(record)
            .context("no plugin supports this record")?;
        if let TabContent::Error(message) = tab {
            anyhow::bail!("opening waveform: {}", message);
        }
        let session = plugin
            .as_waveform_mut()
            .context("record did not open as a waveform")?;

        session
            .set_filter(display.filter)
            .context("applying display filter")?;
        let layout = session.layout_mut().context("layout unavailable")?;
        layout.set_format(display.format);
        layout.set_speed(display.speed);
        layout.set_amplitude(display.amplitude);
        layout.set_zoom(display.zoom);
        let standard_leads = layout.ordering().is_standard();
        let (preferred, placements) = layout.layout_for_viewport(display.viewport);

        let mut committed = Vec::new();
        let mut commit_errors = Vec::new();
        for request in measures {
            measure(session, &placements, request)
                .with_context(|| format!("measuring {}", request.lead))?;
            let Some(kind) = request.commit else {
                continue;
            };
            match session.commit_interval(kind) {
                Ok(interval) => {
                    info!("committed {} interval of {} ms", kind, interval.milliseconds);
                    committed.push(interval);
                }
                Err(err) if err.is_recoverable() => {
                    warn!("{} commit rejected: {}", kind, err);
                    commit_errors.push(err.to_string());
                }
                Err(err) => return Err(err).context("committing interval"),
            }
        }

        let waveform = session.waveform().context("waveform unavailable")?;
        let summary = RecordSummary {
            modality: waveform.modality().to_string(),
            channels: waveform.channel_count(),
            samples_per_channel: waveform.samples_per_channel(),
            sample_rate: waveform.sample_rate(),
            seconds: waveform.seconds(),
            millivolt_cells: waveform.millivolt_cells(),
            standard_leads,
        };
        let board = session.annotations().context("annotations unavailable")?;
        let model = ViewerModel {
            layout: LayoutModel {
                format: display.format,
                filter: display.filter,
                preferred: Some(preferred),
                placements,
            },
            annotations: AnnotationModel {
                annotations: board.filtered().into_iter().cloned().collect(),
                measures: board.measures().to_vec(),
                committed,
            },
        };

        Ok(ViewerReport {
            summary,
            model,
            commit_errors,
        })
    }
}

/// Replays a vertical measurement as pointer presses on the cell that shows
/// both samples.
fn measure(
    session: &mut WaveformPlugin,
    placements: &[ChannelPlacement],
    request: &MeasureRequest,
) -> anyhow::Result<()> {
    let waveform = session.waveform().context("waveform unavailable")?;
    let channel = waveform
        .channel_index(&request.lead)
        .or_else(|| waveform.channel_index(&format!("Lead {}", request.lead)))
        .with_context(|| format!("unknown lead {}", request.lead))?;

    let (lo, hi) = (request.start.min(request.stop), request.start.max(request.stop));
    let placement = placements
        .iter()
        .find(|p| p.channel == channel && p.first_sample <= lo && hi < p.end_sample)
        .cloned()
        .with_context(|| {
            format!(
                "samples {}..={} are not shown in a single cell of {}",
                lo, hi, request.lead
            )
        })?;

    session.clear_markers()?;
    for (button, sample) in [
        (PointerButton::Primary, request.start),
        (PointerButton::Secondary, request.stop),
    ] {
        let x = placement.sample_to_x(sample);
        session.pointer(&placement, PointerEvent::Press { button, x })?;
    }
    Ok(())
}
