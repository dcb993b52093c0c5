mod options;
pub use options::{BenchOptions, Tags};

mod node;
pub use node::{NodeAddr, NodeId, NodeList};

mod cluster;
pub use cluster::{ClusterSpec, ClusterTopology, ReusePolicy, StartOpts};

mod tuning;
pub use tuning::{SettingValue, TuningDirective};

mod command;
pub use command::{ExecutionResult, WorkloadCommand};

mod event;
pub use event::{EventKind, MonitorEvent};

mod outcome;
pub use outcome::{Owner, TestOutcome};

/// Name of a registered test, e.g. `tpce/c=5000/nodes=3`.
pub type TestName = String;
