//! [`Cluster`] backed by the `roachprod` command-line tool.
//!
//! Every operation shells out to `roachprod <verb> <cluster>:<nodes> ...` and waits for
//! it to exit. Cancelling the shutdown token kills any command still in flight.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use tpce_core::{AdminConn, Cluster, ClusterError};
use tpce_model::{ClusterSpec, ExecutionResult, NodeId, NodeList, StartOpts, WorkloadCommand};

use crate::{
    error::{ExecError, cluster_error},
    proc::{ProcConfig, ProcRunner},
};

#[derive(Clone, Debug)]
pub struct RoachprodConfig {
    /// Path of the `roachprod` binary.
    pub binary: PathBuf,
    /// Name of an already created cluster.
    pub cluster: String,
    pub spec: ClusterSpec,
}

impl RoachprodConfig {
    pub fn new(cluster: impl Into<String>, spec: ClusterSpec) -> Self {
        Self {
            binary: PathBuf::from("roachprod"),
            cluster: cluster.into(),
            spec,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    fn target(&self, nodes: &NodeList) -> String {
        format!("{}:{nodes}", self.cluster)
    }

    fn node_target(&self, node: NodeId) -> String {
        format!("{}:{node}", self.cluster)
    }

    pub(crate) fn put_args(&self, src: &Path, dest: &str, nodes: &NodeList) -> Vec<String> {
        vec![
            "put".into(),
            self.target(nodes),
            src.display().to_string(),
            dest.to_string(),
        ]
    }

    pub(crate) fn start_args(&self, opts: &StartOpts, nodes: &NodeList) -> Vec<String> {
        vec![
            "start".into(),
            self.target(nodes),
            format!("--store-count={}", opts.store_count),
            format!("--racks={}", opts.racks),
        ]
    }

    pub(crate) fn install_args(&self, node: NodeId, dependency: &str) -> Vec<String> {
        vec!["install".into(), self.node_target(node), dependency.to_string()]
    }

    pub(crate) fn sql_args(&self, node: NodeId, statement: &str) -> Vec<String> {
        vec![
            "sql".into(),
            self.node_target(node),
            "--".into(),
            "-e".into(),
            statement.to_string(),
        ]
    }

    pub(crate) fn ip_args(&self, nodes: &NodeList) -> Vec<String> {
        vec!["ip".into(), self.target(nodes)]
    }

    pub(crate) fn run_args(&self, node: NodeId, cmd: &WorkloadCommand) -> Vec<String> {
        vec![
            "run".into(),
            self.node_target(node),
            "--".into(),
            cmd.to_shell(),
        ]
    }
}

pub struct RoachprodCluster {
    cfg: RoachprodConfig,
    runner: ProcRunner,
    shutdown: CancellationToken,
}

impl RoachprodCluster {
    pub fn new(cfg: RoachprodConfig) -> Self {
        Self {
            cfg,
            runner: ProcRunner::new().with_name("roachprod"),
            shutdown: CancellationToken::new(),
        }
    }

    /// Share a shutdown token, e.g. one cancelled on Ctrl-C.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn config(&self) -> &RoachprodConfig {
        &self.cfg
    }

    async fn invoke(&self, selector: &str, args: Vec<String>) -> Result<ExecutionResult, ClusterError> {
        debug!(target: "tpce.roachprod", cluster = %self.cfg.cluster, args = ?args, "invoke");
        let proc = ProcConfig::new(self.cfg.binary.display().to_string()).args(args);
        match self.runner.output(&proc, &self.shutdown).await {
            Ok(res) => Ok(res),
            Err(ExecError::Cancelled) => Err(ClusterError::Unavailable(self.cfg.cluster.clone())),
            Err(e) => Err(cluster_error(selector, e)),
        }
    }
}

#[async_trait]
impl Cluster for RoachprodCluster {
    fn name(&self) -> &str {
        &self.cfg.cluster
    }

    fn spec(&self) -> ClusterSpec {
        self.cfg.spec
    }

    #[instrument(level = "debug", skip(self, src), fields(cluster = %self.cfg.cluster))]
    async fn put(&self, src: &Path, dest: &str, nodes: &NodeList) -> Result<(), ClusterError> {
        self.invoke(&nodes.to_string(), self.cfg.put_args(src, dest, nodes))
            .await
            .map(|_| ())
    }

    async fn start(&self, opts: &StartOpts, nodes: &NodeList) -> Result<(), ClusterError> {
        self.invoke(&nodes.to_string(), self.cfg.start_args(opts, nodes))
            .await
            .map(|_| ())
    }

    async fn install(&self, node: NodeId, dependency: &str) -> Result<(), ClusterError> {
        self.invoke(&node.to_string(), self.cfg.install_args(node, dependency))
            .await
            .map(|_| ())
    }

    async fn conn(&self, node: NodeId) -> Result<Box<dyn AdminConn>, ClusterError> {
        if self.shutdown.is_cancelled() {
            return Err(ClusterError::Unavailable(self.cfg.cluster.clone()));
        }
        Ok(Box::new(RoachprodConn {
            cfg: self.cfg.clone(),
            runner: self.runner.clone(),
            shutdown: self.shutdown.clone(),
            node,
        }))
    }

    async fn internal_ips(&self, nodes: &NodeList) -> Result<Vec<String>, ClusterError> {
        let res = self.invoke(&nodes.to_string(), self.cfg.ip_args(nodes)).await?;
        let ips = parse_ips(&res.stdout);
        if ips.len() != nodes.len() {
            return Err(ClusterError::Output(format!(
                "roachprod ip returned {} addresses for nodes {nodes}",
                ips.len()
            )));
        }
        Ok(ips)
    }

    async fn run(&self, node: NodeId, cmd: &WorkloadCommand) -> Result<(), ClusterError> {
        self.invoke(&node.to_string(), self.cfg.run_args(node, cmd))
            .await
            .map(|_| ())
    }

    async fn run_with_details(
        &self,
        node: NodeId,
        cmd: &WorkloadCommand,
    ) -> Result<ExecutionResult, ClusterError> {
        self.invoke(&node.to_string(), self.cfg.run_args(node, cmd)).await
    }
}

/// Statements are sent one `roachprod sql` call at a time; nothing is held open.
struct RoachprodConn {
    cfg: RoachprodConfig,
    runner: ProcRunner,
    shutdown: CancellationToken,
    node: NodeId,
}

#[async_trait]
impl AdminConn for RoachprodConn {
    async fn exec(&mut self, statement: &str) -> Result<(), ClusterError> {
        let proc = ProcConfig::new(self.cfg.binary.display().to_string())
            .args(self.cfg.sql_args(self.node, statement));
        match self.runner.output(&proc, &self.shutdown).await {
            Ok(_) => Ok(()),
            Err(ExecError::Cancelled) => Err(ClusterError::Unavailable(self.cfg.cluster.clone())),
            Err(e) => Err(ClusterError::Sql {
                node: self.node,
                reason: e.to_string(),
            }),
        }
    }
}

fn parse_ips(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
