//! Lead arrangement and pixel geometry.
//!
//! [`LeadLayoutEngine`] picks an ordering strategy once per dataset, then
//! recomputes geometry from the current [`LayoutState`] on every request.

pub mod format;
pub mod geometry;
pub mod ordering;

pub use format::{DisplayFormat, LayoutState, Scale, Zoom};
pub use geometry::{ChannelPlacement, PageMetrics, PreferredSize, Rect, Size, TraceExtent};
pub use ordering::{ChannelOrder, LeadOrdering};

use crate::config::ViewerConfig;
use crate::telemetry::log::LogManager;
use crate::waveform::Waveform;

pub struct LeadLayoutEngine {
    names: Vec<String>,
    ordering: LeadOrdering,
    order: ChannelOrder,
    state: LayoutState,
    metrics: PageMetrics,
    trace: TraceExtent,
    logger: LogManager,
}

impl LeadLayoutEngine {
    pub fn new(
        names: Vec<String>,
        rhythm: Option<usize>,
        trace: TraceExtent,
        config: &ViewerConfig,
    ) -> Self {
        let ordering = LeadOrdering::select(&names, rhythm);
        let state = LayoutState {
            speed: Scale::Fixed(config.default_speed),
            amplitude: Scale::Fixed(config.default_amplitude),
            ..LayoutState::default()
        };
        let logger = LogManager::new("layout");
        logger.trace(&format!(
            "{} ordering for {} channels",
            if ordering.is_standard() { "standard" } else { "fallback" },
            names.len()
        ));
        Self {
            order: ordering.order(state.format),
            names,
            ordering,
            state,
            metrics: PageMetrics {
                pixels_per_mm: config.pixels_per_mm(),
                default_speed: config.default_speed,
                default_amplitude: config.default_amplitude,
            },
            trace,
            logger,
        }
    }

    pub fn for_waveform(waveform: &Waveform, config: &ViewerConfig) -> Self {
        let trace = TraceExtent {
            sample_rate: waveform.sample_rate(),
            total_samples: waveform.samples_per_channel(),
            duration: waveform.duration_seconds(),
            millivolt_cells: waveform.millivolt_cells(),
        };
        Self::new(waveform.channel_names(), waveform.rhythm_channel(), trace, config)
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn ordering(&self) -> &LeadOrdering {
        &self.ordering
    }

    pub fn order(&self) -> &ChannelOrder {
        &self.order
    }

    pub fn trace(&self) -> &TraceExtent {
        &self.trace
    }

    pub fn set_format(&mut self, format: DisplayFormat) {
        if format == self.state.format {
            return;
        }
        self.state.format = format;
        self.order = self.ordering.order(format);
        self.logger.record(&format!("display format {}", format));
    }

    pub fn set_speed(&mut self, speed: Scale) {
        self.state.speed = speed;
    }

    pub fn set_amplitude(&mut self, amplitude: Scale) {
        self.state.amplitude = amplitude;
    }

    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.state.zoom = zoom;
    }

    pub fn zoom_in(&mut self) {
        self.state.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.state.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.state.reset_zoom();
    }

    pub fn preferred_size(&self, viewport: Size) -> PreferredSize {
        geometry::compute_preferred_size(
            viewport,
            &self.state,
            &self.order,
            &self.metrics,
            &self.trace,
        )
    }

    pub fn layout(&self, container: Size) -> Vec<ChannelPlacement> {
        geometry::layout_channels(
            container,
            self.state.format,
            &self.order,
            &self.names,
            &self.trace,
        )
    }

    /// Lays out into the preferred size for `viewport`.
    pub fn layout_for_viewport(&self, viewport: Size) -> (PreferredSize, Vec<ChannelPlacement>) {
        let preferred = self.preferred_size(viewport);
        let placements = self.layout(Size::new(preferred.width, preferred.height));
        (preferred, placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine(names: &[&str]) -> LeadLayoutEngine {
        let trace = TraceExtent {
            sample_rate: 250.0,
            total_samples: 2500,
            duration: 10.0,
            millivolt_cells: 2.0,
        };
        LeadLayoutEngine::new(
            names.iter().map(|n| n.to_string()).collect(),
            None,
            trace,
            &ViewerConfig::default(),
        )
    }

    #[test]
    fn format_change_reorders_channels() {
        let mut engine = engine(&[
            "Lead I", "Lead II", "Lead III", "Lead aVR", "Lead aVL", "Lead aVF", "Lead V1",
            "Lead V2", "Lead V3", "Lead V4", "Lead V5", "Lead V6",
        ]);
        assert!(engine.ordering().is_standard());
        assert_eq!(engine.order().rows(), 12);

        engine.set_format(DisplayFormat::FourColumnWithRhythm);
        assert_eq!(engine.order().rows(), 4);
        let placements = engine.layout(Size::new(800.0, 400.0));
        assert_eq!(placements.len(), 13);
        assert_eq!(placements[1].name, "Lead aVR");
        assert_eq!(placements[12].name, "Lead II");
    }

    #[test]
    fn preferred_size_tracks_zoom() {
        let mut engine = engine(&["A", "B", "C"]);
        let base = engine.preferred_size(Size::new(800.0, 600.0));
        engine.zoom_in();
        let zoomed = engine.preferred_size(Size::new(800.0, 600.0));
        assert_relative_eq!(zoomed.width, base.width * 1.5, epsilon = 1e-9);
        assert_relative_eq!(zoomed.height, base.height * 1.5, epsilon = 1e-9);
        engine.reset_zoom();
        assert_eq!(engine.state().zoom, Zoom::Factor(1.0));
    }

    #[test]
    fn viewport_layout_fills_preferred_size() {
        let mut engine = engine(&["A", "B", "C", "D", "E"]);
        engine.set_format(DisplayFormat::TwoColumn);
        let (preferred, placements) = engine.layout_for_viewport(Size::new(1024.0, 768.0));
        assert_eq!(preferred.rows, 3);
        let right_edge = placements
            .iter()
            .map(|p| p.rect.x + p.rect.width)
            .fold(0.0, f64::max);
        assert_relative_eq!(right_edge, preferred.width, epsilon = 1e-9);
    }
}
