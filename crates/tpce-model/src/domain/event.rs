use serde::{Deserialize, Serialize};

/// Lifecycle notifications emitted by a monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    TaskStarting,
    TaskSucceeded,
    /// The task returned an error.
    TaskFailed,
    /// The task observed cancellation after another task failed.
    TaskCanceled,
    TaskPanicked,
    /// Every task has been joined.
    MonitorFinished,
}

/// One event from a monitor, delivered to its subscribers in emission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorEvent {
    pub kind: EventKind,
    /// Name of the monitor (usually the cluster it watches).
    pub monitor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MonitorEvent {
    pub fn new(kind: EventKind, monitor: impl Into<String>) -> Self {
        Self {
            kind,
            monitor: monitor.into(),
            task: None,
            reason: None,
        }
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
