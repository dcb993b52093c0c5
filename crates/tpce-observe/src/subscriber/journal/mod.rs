use tpce_core::MonitorSubscriber;
use tpce_model::MonitorEvent;

use crate::subscriber::view::log_event;

/// Writes every monitor event to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorSubscriber for Journal {
    fn on_event(&self, event: &MonitorEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
