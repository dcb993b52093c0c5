//! Supervised execution of long-running tasks bound to a node set.
//!
//! A [`Monitor`] is a task group: tasks are spawned with [`Monitor::go`] and joined
//! with [`Monitor::wait`]. The first error wins and cancels the shared token. Tasks
//! still running are joined, and their outcomes are logged and published to
//! subscribers but never surfaced. Nothing outlives `wait`: dropping a monitor aborts
//! every task it spawned.

mod outcome;
pub use outcome::{SupervisionOutcome, TaskFailure};

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use taskvisor::TaskError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use tpce_model::{EventKind, MonitorEvent, NodeList};

/// Receives monitor events in emission order.
pub trait MonitorSubscriber: Send + Sync {
    fn on_event(&self, event: &MonitorEvent);

    fn name(&self) -> &'static str;
}

/// `Idle` until the first task is spawned. The terminal state is the
/// [`SupervisionOutcome`] returned by [`Monitor::wait`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
}

enum Exit {
    Done(Result<(), TaskError>),
    Panicked(String),
}

pub struct Monitor {
    name: String,
    nodes: NodeList,
    token: CancellationToken,
    tasks: JoinSet<(String, Exit)>,
    subscribers: Vec<Arc<dyn MonitorSubscriber>>,
    state: MonitorState,
}

impl Monitor {
    pub fn new(name: impl Into<String>, nodes: NodeList) -> Self {
        Self {
            name: name.into(),
            nodes,
            token: CancellationToken::new(),
            tasks: JoinSet::new(),
            subscribers: Vec::new(),
            state: MonitorState::Idle,
        }
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn MonitorSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nodes whose workload this monitor supervises.
    pub fn nodes(&self) -> &NodeList {
        &self.nodes
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Number of spawned tasks that have not been joined yet.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    /// Spawn a supervised task.
    ///
    /// The task receives a child of the monitor's token, cancelled once any task fails.
    pub fn go<F, Fut>(&mut self, task: impl Into<String>, f: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let task = task.into();
        self.state = MonitorState::Running;
        self.emit(MonitorEvent::new(EventKind::TaskStarting, &self.name).with_task(&task));

        let fut = f(self.token.child_token());
        self.tasks.spawn(async move {
            let exit = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => Exit::Done(res),
                Err(payload) => Exit::Panicked(panic_message(payload.as_ref())),
            };
            (task, exit)
        });
    }

    /// Block until every task has completed and return the first failure, if any.
    pub async fn wait(mut self) -> SupervisionOutcome {
        let mut first: Option<TaskFailure> = None;

        while let Some(joined) = self.tasks.join_next().await {
            let (task, exit) = match joined {
                Ok(v) => v,
                Err(e) => {
                    warn!(target: "tpce.monitor", monitor = %self.name, error = %e, "task join failed");
                    (String::from("unknown"), Exit::Done(Err(TaskError::Canceled)))
                }
            };

            let failure = match exit {
                Exit::Done(Ok(())) => {
                    self.emit(MonitorEvent::new(EventKind::TaskSucceeded, &self.name).with_task(&task));
                    continue;
                }
                Exit::Done(Err(TaskError::Canceled)) if first.is_some() => {
                    self.emit(MonitorEvent::new(EventKind::TaskCanceled, &self.name).with_task(&task));
                    continue;
                }
                Exit::Done(Err(err)) => {
                    let failure = TaskFailure::from_task_error(&task, &err);
                    self.emit(
                        MonitorEvent::new(EventKind::TaskFailed, &self.name)
                            .with_task(&task)
                            .with_reason(&failure.reason),
                    );
                    failure
                }
                Exit::Panicked(msg) => {
                    self.emit(
                        MonitorEvent::new(EventKind::TaskPanicked, &self.name)
                            .with_task(&task)
                            .with_reason(&msg),
                    );
                    TaskFailure {
                        task,
                        reason: format!("panicked: {msg}"),
                        fatal: true,
                    }
                }
            };

            if first.is_none() {
                debug!(target: "tpce.monitor", monitor = %self.name, task = %failure.task, "first failure; cancelling remaining tasks");
                self.token.cancel();
                first = Some(failure);
            } else {
                trace!(target: "tpce.monitor", monitor = %self.name, task = %failure.task, reason = %failure.reason, "additional failure observed");
            }
        }

        self.emit(MonitorEvent::new(EventKind::MonitorFinished, &self.name));
        match first {
            None => SupervisionOutcome::AllSucceeded,
            Some(failure) => SupervisionOutcome::Failed(failure),
        }
    }

    fn emit(&self, event: MonitorEvent) {
        for sub in &self.subscribers {
            sub.on_event(&event);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
