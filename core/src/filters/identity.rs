use crate::prelude::SignalFilter;

/// Pass-through filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl SignalFilter for IdentityFilter {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn init(&self, raw: &[i32]) -> Vec<i32> {
        raw.to_vec()
    }
}
