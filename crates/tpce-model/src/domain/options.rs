use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ClusterSpec, ModelError, ReusePolicy};

/// Selection tags attached to a test (e.g. `weekly`).
///
/// Ordered so that rendering and comparison are deterministic.
pub type Tags = BTreeSet<String>;

/// One parameterised TPC-E benchmark configuration.
///
/// The cluster always has one rack per database node and one extra machine that hosts
/// the workload generator, so `racks()` and `threads()` are derived rather than stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchOptions {
    /// Number of TPC-E customers to load.
    pub customers: u32,
    /// Number of database nodes (the load node is not counted).
    pub nodes: u32,
    /// CPUs per machine.
    pub cpus: u32,
    /// SSDs (and therefore stores) per database node.
    pub ssds: u32,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: Tags,
    /// Overall wall-clock budget.
    ///
    /// `None` means the harness default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl BenchOptions {
    pub const fn new(customers: u32, nodes: u32, cpus: u32, ssds: u32) -> Self {
        Self {
            customers,
            nodes,
            cpus,
            ssds,
            tags: BTreeSet::new(),
            timeout: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// One rack per database node.
    #[inline]
    pub fn racks(&self) -> u32 {
        self.nodes
    }

    /// Workload generator concurrency: one thread per CPU across the database nodes.
    ///
    /// Saturates on overflow; [`BenchOptions::validate`] rejects such options.
    #[inline]
    pub fn threads(&self) -> u32 {
        self.nodes.saturating_mul(self.cpus)
    }

    /// 1-based node number of the workload generator machine.
    #[inline]
    pub fn load_node(&self) -> u32 {
        self.nodes.saturating_add(1)
    }

    /// Machines required for one cluster of this configuration.
    pub fn cluster_spec(&self, reuse: ReusePolicy) -> ClusterSpec {
        ClusterSpec {
            nodes: self.load_node(),
            cpus: self.cpus,
            ssds: self.ssds,
            reuse,
        }
    }

    /// Rejects zero-valued counts and node or thread counts that do not fit `u32`.
    pub fn validate(&self) -> Result<(), ModelError> {
        let fields = [
            ("customers", self.customers),
            ("nodes", self.nodes),
            ("cpus", self.cpus),
            ("ssds", self.ssds),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ModelError::NonPositive { field });
            }
        }
        if self.nodes.checked_add(1).is_none() {
            return Err(ModelError::TooLarge { field: "nodes" });
        }
        if self.nodes.checked_mul(self.cpus).is_none() {
            return Err(ModelError::TooLarge { field: "threads" });
        }
        Ok(())
    }
}
