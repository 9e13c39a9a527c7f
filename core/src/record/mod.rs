pub mod annotation;
pub mod waveform;

pub use annotation::{Annotation, AnnotationGroup, AnnotationValue, StoredAnnotation};
pub use waveform::{ChannelRecord, WaveformRecord};
