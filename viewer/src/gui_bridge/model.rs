use ecgcore::filters::FilterPreset;
use ecgcore::layout::{ChannelPlacement, DisplayFormat, PreferredSize};
use ecgcore::measure::CommittedInterval;
use ecgcore::record::Annotation;
use serde::Serialize;

/// Geometry handed to an external painter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutModel {
    pub format: DisplayFormat,
    pub filter: FilterPreset,
    pub preferred: Option<PreferredSize>,
    pub placements: Vec<ChannelPlacement>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnotationModel {
    pub annotations: Vec<Annotation>,
    pub measures: Vec<Annotation>,
    pub committed: Vec<CommittedInterval>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewerModel {
    pub layout: LayoutModel,
    pub annotations: AnnotationModel,
}
