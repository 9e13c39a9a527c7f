//! Waveform core for the ECG viewer.
//!
//! Turns a pre-parsed waveform record into calibrated channels, arranges them
//! into the standard multi-column lead layouts, applies display filters and
//! tracks pointer-driven measurements. Painting is left to the host.

pub mod calibration;
pub mod config;
pub mod decode;
pub mod filters;
pub mod layout;
pub mod math;
pub mod measure;
pub mod plugin;
pub mod prelude;
pub mod record;
pub mod telemetry;
pub mod waveform;

pub use prelude::{SignalFilter, WaveformError, WaveformResult};
pub use waveform::Waveform;
