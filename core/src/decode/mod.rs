pub mod decoder;
pub mod matrix;

pub use decoder::{BitDepth, ByteOrder, DecodeRequest, WaveformDecoder};
pub use matrix::RawSampleMatrix;
