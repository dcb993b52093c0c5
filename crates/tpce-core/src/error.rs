use taskvisor::TaskError;
use thiserror::Error;
use tpce_model::{ClusterSpec, ModelError, NodeId};

/// Failures reported by a cluster backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("cluster {0} is unavailable")]
    Unavailable(String),
    #[error("command on nodes {nodes} failed: {reason}")]
    Command { nodes: String, reason: String },
    #[error("statement on node {node} failed: {reason}")]
    Sql { node: NodeId, reason: String },
    #[error("unexpected backend output: {0}")]
    Output(String),
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ClusterError {
    fn from(e: std::io::Error) -> Self {
        ClusterError::Io(e.to_string())
    }
}

/// Raised when captured workload output carries the failure marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("test {0} is already registered")]
    Duplicate(String),
}

/// Pipeline-level error.
///
/// Every variant is either fatal (a setup defect that aborts the test immediately) or
/// reported (a benchmark-result defect; the test ends failed after a clean wind-down).
/// See [`BenchError::is_fatal`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchError {
    #[error(transparent)]
    Options(#[from] ModelError),
    #[error("provision cluster {cluster}: {source}")]
    Provision {
        cluster: String,
        #[source]
        source: ClusterError,
    },
    #[error("install {dependency} on node {node}: {source}")]
    Install {
        dependency: String,
        node: NodeId,
        #[source]
        source: ClusterError,
    },
    #[error("open admin connection to node {node}: {source}")]
    Connect {
        node: NodeId,
        #[source]
        source: ClusterError,
    },
    #[error("tuning `{statement}`: {source}")]
    Tuning {
        statement: String,
        #[source]
        source: ClusterError,
    },
    #[error("workload init `{command}`: {reason}")]
    Init { command: String, reason: String },
    #[error("workload run `{command}`: {reason}")]
    Run { command: String, reason: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// First failure surfaced by a monitor.
    #[error("{reason}")]
    Task {
        monitor: String,
        task: String,
        reason: String,
        fatal: bool,
    },
    #[error("test requires {expected} cluster(s), {got} supplied")]
    ClusterCount { expected: usize, got: usize },
    #[error("cluster {cluster} is smaller than required: need {required:?}, have {got:?}")]
    ClusterShape {
        cluster: String,
        required: ClusterSpec,
        got: ClusterSpec,
    },
}

impl BenchError {
    pub fn is_fatal(&self) -> bool {
        match self {
            BenchError::Options(_)
            | BenchError::Provision { .. }
            | BenchError::Install { .. }
            | BenchError::Connect { .. }
            | BenchError::Tuning { .. }
            | BenchError::Init { .. }
            | BenchError::ClusterCount { .. }
            | BenchError::ClusterShape { .. } => true,
            BenchError::Task { fatal, .. } => *fatal,
            BenchError::Run { .. } | BenchError::Validation(_) => false,
        }
    }
}

impl From<BenchError> for TaskError {
    fn from(e: BenchError) -> Self {
        let reason = e.to_string();
        if e.is_fatal() {
            TaskError::Fatal { reason }
        } else {
            TaskError::Fail { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_errors_are_fatal() {
        let e = BenchError::Tuning {
            statement: "SET CLUSTER SETTING x = 1".into(),
            source: ClusterError::Sql {
                node: NodeId(1),
                reason: "boom".into(),
            },
        };
        assert!(e.is_fatal());
        assert_eq!(
            e.to_string(),
            "tuning `SET CLUSTER SETTING x = 1`: statement on node 1 failed: boom"
        );
        assert!(matches!(TaskError::from(e), TaskError::Fatal { .. }));
    }

    #[test]
    fn option_errors_are_not_prefixed_twice() {
        let e = BenchError::from(ModelError::NonPositive { field: "nodes" });
        assert_eq!(e.to_string(), "invalid bench options: nodes must be positive");
        assert!(e.is_fatal());
    }

    #[test]
    fn result_errors_are_reported() {
        let e = BenchError::from(ValidationError {
            reason: "invalid tpsE fraction".into(),
        });
        assert!(!e.is_fatal());
        assert_eq!(e.to_string(), "invalid tpsE fraction");
        match TaskError::from(e) {
            TaskError::Fail { reason } => assert_eq!(reason, "invalid tpsE fraction"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
