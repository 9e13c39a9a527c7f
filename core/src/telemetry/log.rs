use log::{debug, info, warn};

/// Component-tagged wrapper over the `log` facade.
#[derive(Debug, Clone)]
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn trace(&self, message: &str) {
        debug!("[{}] {}", self.component, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.component, message);
    }

    pub fn component(&self) -> &'static str {
        self.component
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("ecgcore")
    }
}
