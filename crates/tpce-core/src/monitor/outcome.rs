use taskvisor::TaskError;

use crate::error::BenchError;

/// First failure observed by a monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub reason: String,
    /// `true` when the task raised a fatal condition rather than returning an error.
    pub fatal: bool,
}

impl TaskFailure {
    pub fn from_task_error(task: &str, err: &TaskError) -> Self {
        let (reason, fatal) = match err {
            TaskError::Fatal { reason, .. } => (reason.clone(), true),
            TaskError::Fail { reason, .. } => (reason.clone(), false),
            TaskError::Canceled => ("canceled".to_string(), false),
            #[allow(unreachable_patterns)]
            other => (format!("{other:?}"), false),
        };
        Self {
            task: task.to_string(),
            reason,
            fatal,
        }
    }
}

/// Aggregate result of every task under one monitor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SupervisionOutcome {
    AllSucceeded,
    Failed(TaskFailure),
}

impl SupervisionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SupervisionOutcome::AllSucceeded)
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            SupervisionOutcome::AllSucceeded => None,
            SupervisionOutcome::Failed(f) => Some(f),
        }
    }

    /// Convert into a pipeline result for the monitor named `monitor`.
    pub fn into_result(self, monitor: &str) -> Result<(), BenchError> {
        match self {
            SupervisionOutcome::AllSucceeded => Ok(()),
            SupervisionOutcome::Failed(f) => Err(BenchError::Task {
                monitor: monitor.to_string(),
                task: f.task,
                reason: f.reason,
                fatal: f.fatal,
            }),
        }
    }
}
