//! Plugin selection and tab content.
//!
//! A record is matched against registered factories once, in registration
//! order; the first factory that supports it creates the plugin.

pub mod waveform;

pub use waveform::{WaveformPlugin, WaveformPluginFactory};

use serde::Serialize;

use crate::config::ViewerConfig;
use crate::prelude::WaveformResult;
use crate::record::WaveformRecord;
use crate::telemetry::log::LogManager;

/// Content view created for an opened record.
pub trait ViewerPlugin {
    fn name(&self) -> &str;
    fn open(&mut self, record: &WaveformRecord) -> WaveformResult<()>;

    /// Waveform capability, for plugins that display traces.
    fn as_waveform(&self) -> Option<&WaveformPlugin> {
        None
    }

    fn as_waveform_mut(&mut self) -> Option<&mut WaveformPlugin> {
        None
    }
}

pub trait PluginFactory {
    fn name(&self) -> &'static str;
    fn supports(&self, record: &WaveformRecord) -> bool;
    fn create(&self, config: &ViewerConfig) -> Box<dyn ViewerPlugin>;
}

/// Identifies the plugin shown in a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginHandle {
    pub id: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TabContent {
    Welcome,
    Settings,
    Query,
    FileOpen,
    DirOpen,
    Error(String),
    About,
    PluginActive(PluginHandle),
}

impl TabContent {
    pub fn title(&self) -> String {
        match self {
            TabContent::Welcome => "Welcome".into(),
            TabContent::Settings => "Settings".into(),
            TabContent::Query => "Query".into(),
            TabContent::FileOpen => "Open file".into(),
            TabContent::DirOpen => "Open directory".into(),
            TabContent::Error(_) => "Error".into(),
            TabContent::About => "About".into(),
            TabContent::PluginActive(handle) => handle.name.clone(),
        }
    }
}

pub struct PluginRegistry {
    factories: Vec<Box<dyn PluginFactory>>,
    config: ViewerConfig,
    opened: usize,
    logger: LogManager,
}

impl PluginRegistry {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            factories: Vec::new(),
            config,
            opened: 0,
            logger: LogManager::new("plugins"),
        }
    }

    /// Registry with the built-in waveform plugin.
    pub fn with_defaults(config: ViewerConfig) -> Self {
        let mut registry = Self::new(config);
        registry.register(Box::new(WaveformPluginFactory));
        registry
    }

    pub fn register(&mut self, factory: Box<dyn PluginFactory>) {
        self.factories.push(factory);
    }

    pub fn resolve(&self, record: &WaveformRecord) -> Option<&dyn PluginFactory> {
        self.factories
            .iter()
            .find(|f| f.supports(record))
            .map(|f| f.as_ref())
    }

    /// Opens `record` with the first supporting plugin. Failures become an
    /// error tab; unsupported records yield `None`.
    pub fn open(&mut self, record: &WaveformRecord) -> Option<(Box<dyn ViewerPlugin>, TabContent)> {
        let factory = self.resolve(record)?;
        let mut plugin = factory.create(&self.config);
        let name = factory.name();

        match plugin.open(record) {
            Ok(()) => {
                self.opened += 1;
                self.logger.record(&format!("opened record with {} plugin", name));
                let handle = PluginHandle {
                    id: self.opened,
                    name: plugin.name().to_string(),
                };
                Some((plugin, TabContent::PluginActive(handle)))
            }
            Err(err) => {
                self.logger.warn(&format!("{} plugin failed: {}", name, err));
                Some((plugin, TabContent::Error(err.to_string())))
            }
        }
    }
}
