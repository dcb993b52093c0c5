//! One provision, tune, load, run and validate sequence per cluster.
//!
//! [`run_tpce`] drives a single pipeline. [`run_multi_tpce`] prepares two
//! independent pipelines and then runs them in the configured order.

use std::sync::Arc;

use taskvisor::TaskError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use tpce_core::{BenchError, Cluster, Monitor, Provisioner, TestContext};
use tpce_model::{BenchOptions, ClusterTopology, NodeId};

use crate::{
    config::{BenchConfig, MultiClusterOrder},
    tuning::bulk_load_tuner,
    validator::TPCE_VALIDATOR,
    workload::WorkloadDriver,
};

/// Dependency installed on the load node to host the generator container.
pub const WORKLOAD_DEPENDENCY: &str = "docker";

/// Name of the supervised task that loads and runs the workload.
pub const WORKLOAD_TASK: &str = "tpce-workload";

/// Admin statements go through the first compute node.
const TUNING_NODE: NodeId = NodeId(1);

#[derive(Clone)]
pub struct Pipeline {
    cluster: Arc<dyn Cluster>,
    ctx: TestContext,
    opts: BenchOptions,
    driver: WorkloadDriver,
}

impl Pipeline {
    pub fn new(cluster: Arc<dyn Cluster>, ctx: TestContext, opts: BenchOptions, cfg: &BenchConfig) -> Self {
        Self {
            cluster,
            ctx,
            opts,
            driver: WorkloadDriver::new(cfg.workload.clone()),
        }
    }

    pub fn cluster_name(&self) -> &str {
        self.cluster.name()
    }

    /// Bring the cluster up, install the container runtime on the load node and
    /// apply the bulk-load settings. Every failure here is fatal.
    #[instrument(level = "debug", skip(self), fields(cluster = %self.cluster.name()))]
    pub async fn prepare(&self) -> Result<ClusterTopology, BenchError> {
        let provisioner = Provisioner::new(self.cluster.as_ref(), &self.ctx);
        let topology = provisioner
            .setup(&self.opts, self.ctx.cockroach())
            .await?;
        provisioner
            .install_dependency(topology.load_node().node, WORKLOAD_DEPENDENCY)
            .await?;

        bulk_load_tuner(self.opts.ssds)
            .apply(self.cluster.as_ref(), TUNING_NODE)
            .await?;
        debug!(target: "tpce.bench", cluster = %self.cluster.name(), "cluster tuned");
        Ok(topology)
    }

    /// Spawn the workload task on a monitor bound to the compute nodes.
    pub fn launch(&self, topology: ClusterTopology) -> Monitor {
        let mut monitor = self
            .ctx
            .monitor(self.cluster.name(), topology.compute_list());
        let this = self.clone();
        let topology = Arc::new(topology);
        monitor.go(WORKLOAD_TASK, move |token: CancellationToken| async move {
            tokio::select! {
                res = this.workload(&topology) => res.map_err(TaskError::from),
                _ = token.cancelled() => Err(TaskError::Canceled),
            }
        });
        monitor
    }

    /// Launch the workload and wait for its monitor.
    pub async fn execute(&self, topology: ClusterTopology) -> Result<(), BenchError> {
        self.launch(topology)
            .wait()
            .await
            .into_result(self.cluster.name())
    }

    /// Import the dataset, run the measured window and validate the output.
    async fn workload(&self, topology: &ClusterTopology) -> Result<(), BenchError> {
        let load = topology.load_node().node;
        let racks = self.opts.racks();

        let init = self
            .driver
            .build_init_command(topology, self.opts.customers, racks)?;
        self.ctx.status("preparing workload");
        self.cluster
            .run(load, &init)
            .await
            .map_err(|e| BenchError::Init {
                command: init.to_shell(),
                reason: e.to_string(),
            })?;

        let run = self.driver.build_run_command(
            topology,
            self.opts.customers,
            racks,
            self.driver.config().duration,
            self.opts.threads(),
        )?;
        self.ctx.status("running workload");
        let result = self
            .cluster
            .run_with_details(load, &run)
            .await
            .map_err(|e| BenchError::Run {
                command: run.to_shell(),
                reason: e.to_string(),
            })?;

        info!(target: "tpce.bench", cluster = %self.cluster.name(), "workload output:\n{}", result.stdout);
        TPCE_VALIDATOR.check(&result.stdout)?;
        Ok(())
    }
}

/// Single-cluster benchmark.
pub async fn run_tpce(
    ctx: TestContext,
    cluster: Arc<dyn Cluster>,
    opts: BenchOptions,
    cfg: &BenchConfig,
) -> Result<(), BenchError> {
    let pipeline = Pipeline::new(cluster, ctx, opts, cfg);
    let topology = pipeline.prepare().await?;
    pipeline.execute(topology).await
}

/// Dual-cluster benchmark.
///
/// Both clusters are prepared before any workload starts. A fatal failure in either
/// pipeline ends the test at once. When both pipelines fail the fatal error wins,
/// then the first cluster's; the other error is logged.
pub async fn run_multi_tpce(
    ctx: TestContext,
    c1: Arc<dyn Cluster>,
    c2: Arc<dyn Cluster>,
    opts: BenchOptions,
    cfg: &BenchConfig,
) -> Result<(), BenchError> {
    let p1 = Pipeline::new(c1, ctx.clone(), opts.clone(), cfg);
    let p2 = Pipeline::new(c2, ctx, opts, cfg);

    let t1 = p1.prepare().await?;
    let t2 = p2.prepare().await?;

    let (r1, r2) = match cfg.multi_cluster_order {
        MultiClusterOrder::Sequential => {
            let r1 = p1.execute(t1).await;
            if r1.as_ref().is_err_and(BenchError::is_fatal) {
                return r1;
            }
            (r1, p2.execute(t2).await)
        }
        MultiClusterOrder::Concurrent => {
            let f1 = p1.execute(t1);
            let f2 = p2.execute(t2);
            tokio::pin!(f1, f2);

            // Dropping the unfinished future aborts its monitor.
            tokio::select! {
                r1 = &mut f1 => {
                    if r1.as_ref().is_err_and(BenchError::is_fatal) {
                        return r1;
                    }
                    (r1, f2.await)
                }
                r2 = &mut f2 => {
                    if r2.as_ref().is_err_and(BenchError::is_fatal) {
                        return r2;
                    }
                    (f1.await, r2)
                }
            }
        }
    };

    match (r1, r2) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e1), Err(e2)) => {
            let (surfaced, other, other_cluster) = if e2.is_fatal() && !e1.is_fatal() {
                (e2, e1, p1.cluster_name())
            } else {
                (e1, e2, p2.cluster_name())
            };
            warn!(target: "tpce.bench", cluster = %other_cluster, error = %other, "other cluster also failed");
            Err(surfaced)
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
    }
}
