use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::info;

use tpce_model::NodeList;

use crate::monitor::{Monitor, MonitorSubscriber};

/// Per-run handle passed to a test body.
///
/// Cheap to clone; every clone shares the same status log.
#[derive(Clone)]
pub struct TestContext {
    name: Arc<str>,
    cockroach: Arc<PathBuf>,
    statuses: Arc<Mutex<Vec<String>>>,
    subscribers: Arc<Vec<Arc<dyn MonitorSubscriber>>>,
}

impl TestContext {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            cockroach: Arc::new(PathBuf::from("./cockroach")),
            statuses: Arc::new(Mutex::new(Vec::new())),
            subscribers: Arc::new(Vec::new()),
        }
    }

    pub fn with_cockroach(mut self, path: impl Into<PathBuf>) -> Self {
        self.cockroach = Arc::new(path.into());
        self
    }

    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn MonitorSubscriber>>) -> Self {
        self.subscribers = Arc::new(subscribers);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local path of the database binary to install on compute nodes.
    pub fn cockroach(&self) -> &Path {
        &self.cockroach
    }

    /// Record a human-readable progress line.
    pub fn status(&self, msg: impl Into<String>) {
        let msg = msg.into();
        info!(target: "tpce.status", test = %self.name, "{msg}");
        self.statuses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(msg);
    }

    pub fn statuses(&self) -> Vec<String> {
        self.statuses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// New monitor over `nodes` wired to this run's subscribers.
    pub fn monitor(&self, name: impl Into<String>, nodes: NodeList) -> Monitor {
        self.subscribers
            .iter()
            .cloned()
            .fold(Monitor::new(name, nodes), Monitor::with_subscriber)
    }
}
