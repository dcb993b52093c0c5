use std::{path::PathBuf, time::Duration};

/// How the two pipelines of a dual-cluster test are driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MultiClusterOrder {
    /// Pipeline 2 starts only after pipeline 1 has been waited on.
    #[default]
    Sequential,
    /// Both monitors run and are joined together.
    Concurrent,
}

/// Container invocation of the workload generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkloadConfig {
    pub image: String,
    /// Container runtime (`docker`).
    pub runtime: String,
    /// Prefix the runtime with `sudo`.
    pub sudo: bool,
    /// Length of the measured benchmark window.
    pub duration: Duration,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            image: "cockroachdb/tpc-e:latest".to_string(),
            runtime: "docker".to_string(),
            sudo: true,
            duration: Duration::from_secs(2 * 60 * 60),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    /// Local database binary copied to every compute node.
    pub cockroach_binary: PathBuf,
    pub workload: WorkloadConfig,
    pub multi_cluster_order: MultiClusterOrder,
    /// Budget for entries without their own timeout.
    pub default_timeout: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            cockroach_binary: PathBuf::from("./cockroach"),
            workload: WorkloadConfig::default(),
            multi_cluster_order: MultiClusterOrder::default(),
            default_timeout: Duration::from_secs(10 * 60 * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_nightly_setup() {
        let cfg = BenchConfig::default();
        assert_eq!(cfg.cockroach_binary, PathBuf::from("./cockroach"));
        assert_eq!(cfg.workload.image, "cockroachdb/tpc-e:latest");
        assert!(cfg.workload.sudo);
        assert_eq!(cfg.workload.duration, Duration::from_secs(7_200));
        assert_eq!(cfg.multi_cluster_order, MultiClusterOrder::Sequential);
    }
}
