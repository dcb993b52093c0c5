use std::path::Path;

use tracing::{debug, instrument};

use tpce_model::{BenchOptions, ClusterTopology, NodeAddr, NodeId, NodeList, StartOpts};

use crate::{
    cluster::Cluster,
    error::{BenchError, ClusterError},
    harness::TestContext,
};

/// Destination of the database binary on every compute node.
pub const BINARY_DEST: &str = "./cockroach";

/// Brings one cluster up for a benchmark configuration.
///
/// Compute nodes are `1..=nodes`, the load node is `nodes + 1`. All failures are fatal.
pub struct Provisioner<'a> {
    cluster: &'a dyn Cluster,
    ctx: &'a TestContext,
}

impl<'a> Provisioner<'a> {
    pub fn new(cluster: &'a dyn Cluster, ctx: &'a TestContext) -> Self {
        Self { cluster, ctx }
    }

    /// Install and start the database with one store per SSD and one rack per node,
    /// then resolve the addresses of every machine.
    #[instrument(level = "debug", skip(self, opts, binary), fields(cluster = %self.cluster.name()))]
    pub async fn setup(
        &self,
        opts: &BenchOptions,
        binary: &Path,
    ) -> Result<ClusterTopology, BenchError> {
        opts.validate()?;
        let compute = NodeList::range(1, opts.nodes);
        let load = NodeList::single(opts.load_node());

        self.ctx
            .status(format!("installing cockroach on {}", self.cluster.name()));
        self.cluster
            .put(binary, BINARY_DEST, &compute)
            .await
            .map_err(|e| self.provision_error(e))?;

        let start = StartOpts {
            store_count: opts.ssds,
            racks: opts.racks(),
        };
        self.cluster
            .start(&start, &compute)
            .await
            .map_err(|e| self.provision_error(e))?;
        debug!(target: "tpce.provision", nodes = %compute, ?start, "cluster started");

        let compute_ips = self.ips(&compute).await?;
        let load_ip = self
            .ips(&load)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| self.provision_error(ClusterError::Output("no load node address".into())))?;

        let compute_nodes = compute
            .iter()
            .zip(compute_ips)
            .map(|(node, ip)| NodeAddr::new(node, ip))
            .collect();
        let load_node = NodeAddr::new(NodeId(opts.load_node()), load_ip);

        ClusterTopology::new(compute_nodes, load_node)
            .map_err(|e| self.provision_error(ClusterError::Output(e.to_string())))
    }

    /// Install a system dependency on one node.
    pub async fn install_dependency(&self, node: NodeId, dependency: &str) -> Result<(), BenchError> {
        self.ctx
            .status(format!("installing {dependency} on {}", self.cluster.name()));
        self.cluster
            .install(node, dependency)
            .await
            .map_err(|source| BenchError::Install {
                dependency: dependency.to_string(),
                node,
                source,
            })
    }

    async fn ips(&self, nodes: &NodeList) -> Result<Vec<String>, BenchError> {
        let ips = self
            .cluster
            .internal_ips(nodes)
            .await
            .map_err(|e| self.provision_error(e))?;
        if ips.len() != nodes.len() {
            return Err(self.provision_error(ClusterError::Output(format!(
                "expected {} addresses for nodes {nodes}, got {}",
                nodes.len(),
                ips.len()
            ))));
        }
        Ok(ips)
    }

    fn provision_error(&self, source: ClusterError) -> BenchError {
        BenchError::Provision {
            cluster: self.cluster.name().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeCluster, Step};

    fn ctx() -> TestContext {
        TestContext::new("provision-test")
    }

    #[tokio::test]
    async fn setup_builds_topology_from_backend_addresses() {
        let cluster = FakeCluster::new("c1", 4);
        let ctx = ctx();
        let opts = BenchOptions::new(5_000, 3, 4, 2);

        let topo = Provisioner::new(&cluster, &ctx)
            .setup(&opts, Path::new("./cockroach"))
            .await
            .unwrap();

        assert_eq!(topo.node_count(), 3);
        assert_eq!(topo.load_node().node, NodeId(4));
        assert_eq!(topo.compute_ips().collect::<Vec<_>>(), vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);

        let calls = cluster.calls();
        assert!(matches!(&calls[0], Call::Put { nodes, .. } if nodes == "1-3"));
        assert!(matches!(
            &calls[1],
            Call::Start { opts: StartOpts { store_count: 2, racks: 3 }, nodes } if nodes == "1-3"
        ));
    }

    #[tokio::test]
    async fn start_failure_is_fatal_provision_error() {
        let cluster = FakeCluster::new("c1", 4).fail_at(Step::Start);
        let ctx = ctx();

        let err = Provisioner::new(&cluster, &ctx)
            .setup(&BenchOptions::new(5_000, 3, 4, 1), Path::new("./cockroach"))
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Provision { ref cluster, .. } if cluster == "c1"));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn install_failure_names_dependency() {
        let cluster = FakeCluster::new("c1", 4).fail_at(Step::Install);
        let ctx = ctx();

        let err = Provisioner::new(&cluster, &ctx)
            .install_dependency(NodeId(4), "docker")
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Install { ref dependency, node: NodeId(4), .. } if dependency == "docker"));
        assert!(err.is_fatal());
    }
}
