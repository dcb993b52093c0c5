use serde::{Deserialize, Serialize};

use crate::{ModelError, NodeAddr, NodeList};

/// Whether a provisioned cluster may be shared with other tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReusePolicy {
    /// The harness may hand the cluster to later tests.
    #[default]
    Any,
    /// The cluster is wiped and never reused.
    None,
}

/// Machine shape requested from the provisioning backend for one cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Total machines, load node included.
    pub nodes: u32,
    pub cpus: u32,
    pub ssds: u32,
    #[serde(default)]
    pub reuse: ReusePolicy,
}

impl ClusterSpec {
    /// At least as many machines, CPUs and SSDs as `required`. Reuse policy is
    /// the harness's concern and is not compared.
    pub fn satisfies(&self, required: &ClusterSpec) -> bool {
        self.nodes >= required.nodes && self.cpus >= required.cpus && self.ssds >= required.ssds
    }
}

/// Options used when starting the database on the compute nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOpts {
    /// Stores per node (one per SSD).
    pub store_count: u32,
    /// Rack count handed to the locality configuration.
    pub racks: u32,
}

/// Addresses of a provisioned cluster.
///
/// Built once after provisioning and shared read-only by every pipeline stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTopology {
    compute_nodes: Vec<NodeAddr>,
    load_node: NodeAddr,
}

impl ClusterTopology {
    /// Requires at least one compute node and a load node outside the compute set.
    pub fn new(compute_nodes: Vec<NodeAddr>, load_node: NodeAddr) -> Result<Self, ModelError> {
        if compute_nodes.is_empty() {
            return Err(ModelError::InvalidTopology("no compute nodes".into()));
        }
        if compute_nodes.iter().any(|n| n.node == load_node.node) {
            return Err(ModelError::InvalidTopology(format!(
                "load node {} is also a compute node",
                load_node.node
            )));
        }
        Ok(Self {
            compute_nodes,
            load_node,
        })
    }

    pub fn compute_nodes(&self) -> &[NodeAddr] {
        &self.compute_nodes
    }

    pub fn load_node(&self) -> &NodeAddr {
        &self.load_node
    }

    pub fn node_count(&self) -> usize {
        self.compute_nodes.len()
    }

    /// Compute node selector in topology order.
    pub fn compute_list(&self) -> NodeList {
        NodeList::from(self.compute_nodes.iter().map(|n| n.node).collect::<Vec<_>>())
    }

    pub fn compute_ips(&self) -> impl Iterator<Item = &str> {
        self.compute_nodes.iter().map(|n| n.ip.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;

    fn addr(n: u32) -> NodeAddr {
        NodeAddr::new(NodeId(n), format!("10.0.0.{n}"))
    }

    #[test]
    fn topology_keeps_compute_order() {
        let topo = ClusterTopology::new(vec![addr(1), addr(2), addr(3)], addr(4)).unwrap();
        assert_eq!(topo.node_count(), 3);
        assert_eq!(
            topo.compute_ips().collect::<Vec<_>>(),
            vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]
        );
        assert_eq!(topo.compute_list().to_string(), "1-3");
        assert_eq!(topo.load_node().node, NodeId(4));
    }

    #[test]
    fn larger_cluster_satisfies_smaller_requirement() {
        let required = ClusterSpec {
            nodes: 4,
            cpus: 4,
            ssds: 1,
            reuse: ReusePolicy::None,
        };
        let bigger = ClusterSpec {
            cpus: 8,
            reuse: ReusePolicy::Any,
            ..required
        };
        assert!(bigger.satisfies(&required));
        assert!(!ClusterSpec { nodes: 3, ..required }.satisfies(&required));
        assert!(!ClusterSpec { ssds: 0, ..required }.satisfies(&required));
    }

    #[test]
    fn topology_rejects_overlap_and_empty() {
        assert!(ClusterTopology::new(vec![], addr(4)).is_err());
        assert!(ClusterTopology::new(vec![addr(1), addr(2)], addr(2)).is_err());
    }
}
