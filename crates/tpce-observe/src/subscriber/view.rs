use tracing::{debug, error, info};

use tpce_model::{EventKind, MonitorEvent};

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TaskStarting => "task is starting",
        EventKind::TaskSucceeded => "task finished successfully",
        EventKind::TaskFailed => "task failed",
        EventKind::TaskCanceled => "task stopped after cancellation",
        EventKind::TaskPanicked => "task panicked",
        EventKind::MonitorFinished => "all monitor tasks joined",
    }
}

#[inline]
pub fn log_event(e: &MonitorEvent) {
    let msg = message_for(e.kind);
    let task = e.task.as_deref().unwrap_or("unknown");
    let reason = e.reason.as_deref().unwrap_or("unknown");
    let monitor = e.monitor.as_str();

    match e.kind {
        EventKind::TaskStarting => info!(target: "tpce.monitor", monitor, task, "{msg}"),
        EventKind::TaskSucceeded => debug!(target: "tpce.monitor", monitor, task, "{msg}"),
        EventKind::TaskCanceled => debug!(target: "tpce.monitor", monitor, task, "{msg}"),
        EventKind::TaskFailed | EventKind::TaskPanicked => {
            error!(target: "tpce.monitor", monitor, task, reason, "{msg}")
        }
        EventKind::MonitorFinished => debug!(target: "tpce.monitor", monitor, "{msg}"),
    }
}
