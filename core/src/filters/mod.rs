//! Display filters.
//!
//! Every filter is a pure function of a whole channel. The active preset's
//! output for each channel is cached in a [`FilterBank`].

pub mod combined;
pub mod high_pass;
pub mod identity;
pub mod low_pass;
pub mod moving_average;
pub mod preset;
pub mod view;

pub use combined::CombinedFilter;
pub use high_pass::HighPassFilter;
pub use identity::IdentityFilter;
pub use low_pass::LowPassFilter;
pub use moving_average::MovingAverageFilter;
pub use preset::FilterPreset;
pub use view::{FilterBank, FilteredView};
