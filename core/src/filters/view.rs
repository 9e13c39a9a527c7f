use crate::config::FilterSettings;
use crate::decode::RawSampleMatrix;
use crate::filters::FilterPreset;
use crate::prelude::SignalFilter;
use crate::telemetry::log::LogManager;

/// Filtered copy of one channel, same length as the source.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    samples: Vec<i32>,
}

impl FilteredView {
    pub fn build(raw: &[i32], filter: &dyn SignalFilter) -> Self {
        Self {
            samples: filter.init(raw),
        }
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.samples.get(index).copied()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Cache of the active filter's views for every channel. Rebuilt in full
/// whenever the preset changes.
pub struct FilterBank {
    preset: FilterPreset,
    sample_rate: f64,
    settings: FilterSettings,
    views: Vec<FilteredView>,
    logger: LogManager,
}

impl FilterBank {
    pub fn new(matrix: &RawSampleMatrix, sample_rate: f64, settings: FilterSettings) -> Self {
        let mut bank = Self {
            preset: FilterPreset::Noop,
            sample_rate,
            settings,
            views: Vec::new(),
            logger: LogManager::new("filters"),
        };
        bank.rebuild(matrix);
        bank
    }

    pub fn preset(&self) -> FilterPreset {
        self.preset
    }

    /// Switches the active preset. Returns `false` when nothing changed.
    pub fn set_preset(&mut self, matrix: &RawSampleMatrix, preset: FilterPreset) -> bool {
        if preset == self.preset && self.views.len() == matrix.channels() {
            return false;
        }
        self.preset = preset;
        self.rebuild(matrix);
        true
    }

    pub fn view(&self, channel: usize) -> Option<&FilteredView> {
        self.views.get(channel)
    }

    fn rebuild(&mut self, matrix: &RawSampleMatrix) {
        let filter = self.preset.build(self.sample_rate, &self.settings);
        self.views = (0..matrix.channels())
            .map(|c| FilteredView::build(matrix.channel(c).unwrap_or_default(), filter.as_ref()))
            .collect();
        self.logger.trace(&format!(
            "rebuilt {} views with {} filter",
            self.views.len(),
            self.preset
        ));
    }
}
