//! Executes registry entries with a wall-clock budget.

mod context;
pub use context::TestContext;

use std::{path::PathBuf, sync::Arc, time::Duration};

use futures::{FutureExt, future};
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use tpce_model::{TestName, TestOutcome};

use crate::{
    cluster::Cluster,
    error::BenchError,
    monitor::MonitorSubscriber,
    registry::{RunFuture, TestBody, TestEntry},
};

/// Budget applied to entries that do not carry their own timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60 * 60);

/// Summary of one executed entry.
#[derive(Clone, Debug)]
pub struct TestReport {
    pub run_id: Uuid,
    pub name: TestName,
    pub outcome: TestOutcome,
    pub elapsed: Duration,
    pub statuses: Vec<String>,
}

pub struct TestRunner {
    default_timeout: Duration,
    cockroach: PathBuf,
    subscribers: Vec<Arc<dyn MonitorSubscriber>>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            cockroach: PathBuf::from("./cockroach"),
            subscribers: Vec::new(),
        }
    }
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_cockroach(mut self, path: impl Into<PathBuf>) -> Self {
        self.cockroach = path.into();
        self
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn MonitorSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Run `entry` against `clusters` (one per requirement, in order).
    ///
    /// Exceeding the timeout drops the running body, which aborts every monitor task
    /// and the processes they own.
    #[instrument(level = "info", skip_all, fields(test = %entry.name))]
    pub async fn run(&self, entry: &TestEntry, clusters: Vec<Arc<dyn Cluster>>) -> TestReport {
        let run_id = Uuid::new_v4();
        let ctx = TestContext::new(&entry.name)
            .with_cockroach(self.cockroach.clone())
            .with_subscribers(self.subscribers.clone());
        let timeout = entry.timeout.unwrap_or(self.default_timeout);

        info!(target: "tpce.harness", %run_id, owner = %entry.owner, ?timeout, "test starting");
        let started = Instant::now();
        let body = dispatch(entry, ctx.clone(), clusters);

        let outcome = match tokio::time::timeout(timeout, body).await {
            Ok(Ok(())) => TestOutcome::Passed,
            Ok(Err(e)) => {
                let fatal = e.is_fatal();
                error!(target: "tpce.harness", %run_id, fatal, error = %e, "test failed");
                TestOutcome::Failed {
                    reason: e.to_string(),
                    fatal,
                }
            }
            Err(_) => {
                warn!(target: "tpce.harness", %run_id, ?timeout, "test timed out");
                TestOutcome::TimedOut { after: timeout }
            }
        };
        let elapsed = started.elapsed();
        info!(target: "tpce.harness", %run_id, ?outcome, ?elapsed, "test finished");

        TestReport {
            run_id,
            name: entry.name.clone(),
            outcome,
            elapsed,
            statuses: ctx.statuses(),
        }
    }
}

fn dispatch(entry: &TestEntry, ctx: TestContext, clusters: Vec<Arc<dyn Cluster>>) -> RunFuture {
    if let Err(e) = check_clusters(entry, &clusters) {
        return future::ready(Err(e)).boxed();
    }

    match (&entry.body, clusters.as_slice()) {
        (TestBody::Single { run, .. }, [c]) => run(ctx, Arc::clone(c)),
        (TestBody::Multi { run, .. }, [c1, c2]) => run(ctx, Arc::clone(c1), Arc::clone(c2)),
        _ => future::ready(Err(BenchError::ClusterCount {
            expected: entry.cluster_requirements().len(),
            got: clusters.len(),
        }))
        .boxed(),
    }
}

/// One cluster per requirement, each at least as large as required.
fn check_clusters(entry: &TestEntry, clusters: &[Arc<dyn Cluster>]) -> Result<(), BenchError> {
    let requirements = entry.cluster_requirements();
    if requirements.len() != clusters.len() {
        return Err(BenchError::ClusterCount {
            expected: requirements.len(),
            got: clusters.len(),
        });
    }
    for (cluster, required) in clusters.iter().zip(requirements) {
        let got = cluster.spec();
        if !got.satisfies(&required) {
            return Err(BenchError::ClusterShape {
                cluster: cluster.name().to_string(),
                required,
                got,
            });
        }
    }
    Ok(())
}
