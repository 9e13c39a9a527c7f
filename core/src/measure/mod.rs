//! Pointer-driven measurement.
//!
//! The [`MeasurementEngine`] keeps markers per tool and channel and pushes
//! derived values into an [`AnnotationSink`]. [`IntervalCommitter`] reads the
//! sink back to turn a single measured duration into a named interval.

pub mod engine;
pub mod interval;
pub mod marker;
pub mod sink;

pub use engine::{
    drag_delta_samples, MeasureReading, MeasureState, MeasuredChannel, MeasurementEngine,
    PointerButton, PointerEvent,
};
pub use interval::{CommittedInterval, IntervalCommitter, IntervalKind};
pub use marker::{MarkerType, SampleMarker, Tool};
pub use sink::{AnnotationBoard, AnnotationSink};
