//! Capability boundary to the provisioning backend.
//!
//! The orchestration code only ever talks to a cluster through [`Cluster`]; placing
//! processes, distributing binaries and configuring stores is the backend's business.
//! Every call blocks (asynchronously) until the backend reports success or failure,
//! there is no partial-success state.

use std::path::Path;

use async_trait::async_trait;
use tpce_model::{ClusterSpec, ExecutionResult, NodeId, NodeList, StartOpts, WorkloadCommand};

use crate::error::ClusterError;

/// One provisioned cluster.
#[async_trait]
pub trait Cluster: Send + Sync + 'static {
    /// Backend name of the cluster, used in logs and errors.
    fn name(&self) -> &str;

    /// Shape the cluster was created with.
    fn spec(&self) -> ClusterSpec;

    /// Copy a local file to `dest` on every node in `nodes`.
    async fn put(&self, src: &Path, dest: &str, nodes: &NodeList) -> Result<(), ClusterError>;

    /// Start the database on `nodes`.
    async fn start(&self, opts: &StartOpts, nodes: &NodeList) -> Result<(), ClusterError>;

    /// Install a system package (e.g. `docker`) on one node.
    async fn install(&self, node: NodeId, dependency: &str) -> Result<(), ClusterError>;

    /// Open an administrative SQL connection to `node`.
    ///
    /// The connection is released when the returned value is dropped.
    async fn conn(&self, node: NodeId) -> Result<Box<dyn AdminConn>, ClusterError>;

    /// Internal network addresses of `nodes`, in the same order.
    async fn internal_ips(&self, nodes: &NodeList) -> Result<Vec<String>, ClusterError>;

    /// Run a command on one node, discarding its output.
    async fn run(&self, node: NodeId, cmd: &WorkloadCommand) -> Result<(), ClusterError>;

    /// Run a command on one node and capture its output.
    ///
    /// A non-zero exit status is reported as an error.
    async fn run_with_details(
        &self,
        node: NodeId,
        cmd: &WorkloadCommand,
    ) -> Result<ExecutionResult, ClusterError>;
}

/// Administrative connection scoped to one tuning pass.
#[async_trait]
pub trait AdminConn: Send {
    async fn exec(&mut self, statement: &str) -> Result<(), ClusterError>;
}
