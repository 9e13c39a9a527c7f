pub mod channel;

pub use channel::{ChannelDefinition, Extent, SensitivityUnit};
