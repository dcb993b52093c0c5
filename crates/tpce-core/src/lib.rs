pub mod error;
pub use error::{BenchError, ClusterError, RegistryError, ValidationError};

pub mod cluster;
pub use cluster::{AdminConn, Cluster};

mod provision;
pub use provision::Provisioner;

mod tuner;
pub use tuner::Tuner;

pub mod monitor;
pub use monitor::{Monitor, MonitorState, MonitorSubscriber, SupervisionOutcome, TaskFailure};

mod validate;
pub use validate::ResultValidator;

pub mod registry;
pub use registry::{Registry, TestBody, TestEntry};

pub mod harness;
pub use harness::{TestContext, TestReport, TestRunner};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
