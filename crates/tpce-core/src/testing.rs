//! In-memory [`Cluster`] for tests.
//!
//! `FakeCluster` records every call in order, answers `internal_ips` with
//! `10.<subnet>.0.<node>`, returns scripted stdout from `run_with_details` and can be
//! told to fail one kind of step. Clones share state, so a test can keep a handle
//! after giving an `Arc` of a clone to the code under test.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;

use tpce_model::{
    ClusterSpec, ExecutionResult, NodeId, NodeList, ReusePolicy, StartOpts, WorkloadCommand,
};

use crate::{
    cluster::{AdminConn, Cluster},
    error::ClusterError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    Put,
    Start,
    Install,
    Connect,
    Exec,
    InternalIps,
    Run,
    RunWithDetails,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Put { src: PathBuf, dest: String, nodes: String },
    Start { opts: StartOpts, nodes: String },
    Install { node: NodeId, dependency: String },
    Connect { node: NodeId },
    Exec { node: NodeId, statement: String },
    Release { node: NodeId },
    InternalIps { nodes: String },
    Run { node: NodeId, command: WorkloadCommand },
    RunWithDetails { node: NodeId, command: WorkloadCommand },
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    fail: HashSet<Step>,
    stdout: String,
    run_delay: Option<Duration>,
}

#[derive(Clone)]
pub struct FakeCluster {
    name: String,
    spec: ClusterSpec,
    subnet: u8,
    state: Arc<Mutex<FakeState>>,
}

impl FakeCluster {
    /// A cluster of `machines` machines (load node included).
    pub fn new(name: &str, machines: u32) -> Self {
        Self {
            name: name.to_string(),
            spec: ClusterSpec {
                nodes: machines,
                cpus: 4,
                ssds: 1,
                reuse: ReusePolicy::Any,
            },
            subnet: 0,
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn with_subnet(mut self, subnet: u8) -> Self {
        self.subnet = subnet;
        self
    }

    pub fn with_stdout(self, stdout: impl Into<String>) -> Self {
        self.lock().stdout = stdout.into();
        self
    }

    pub fn with_run_delay(self, delay: Duration) -> Self {
        self.lock().run_delay = Some(delay);
        self
    }

    pub fn fail_at(self, step: Step) -> Self {
        self.lock().fail.insert(step);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Statements received over admin connections, in order.
    pub fn statements(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Exec { statement, .. } => Some(statement.clone()),
                _ => None,
            })
            .collect()
    }

    /// Commands handed to `run` and `run_with_details`, in order.
    pub fn commands(&self) -> Vec<WorkloadCommand> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Run { command, .. } | Call::RunWithDetails { command, .. } => {
                    Some(command.clone())
                }
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, call: Call, step: Step) -> Result<(), ClusterError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.fail.contains(&step) {
            return Err(ClusterError::Command {
                nodes: self.name.clone(),
                reason: format!("injected {step:?} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Cluster for FakeCluster {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ClusterSpec {
        self.spec
    }

    async fn put(&self, src: &Path, dest: &str, nodes: &NodeList) -> Result<(), ClusterError> {
        let call = Call::Put {
            src: src.to_path_buf(),
            dest: dest.to_string(),
            nodes: nodes.to_string(),
        };
        self.record(call, Step::Put)
    }

    async fn start(&self, opts: &StartOpts, nodes: &NodeList) -> Result<(), ClusterError> {
        let call = Call::Start {
            opts: *opts,
            nodes: nodes.to_string(),
        };
        self.record(call, Step::Start)
    }

    async fn install(&self, node: NodeId, dependency: &str) -> Result<(), ClusterError> {
        let call = Call::Install {
            node,
            dependency: dependency.to_string(),
        };
        self.record(call, Step::Install)
    }

    async fn conn(&self, node: NodeId) -> Result<Box<dyn AdminConn>, ClusterError> {
        self.record(Call::Connect { node }, Step::Connect)?;
        Ok(Box::new(FakeConn {
            node,
            cluster: self.clone(),
        }))
    }

    async fn internal_ips(&self, nodes: &NodeList) -> Result<Vec<String>, ClusterError> {
        let call = Call::InternalIps {
            nodes: nodes.to_string(),
        };
        self.record(call, Step::InternalIps)?;
        Ok(nodes
            .iter()
            .map(|n| format!("10.{}.0.{n}", self.subnet))
            .collect())
    }

    async fn run(&self, node: NodeId, cmd: &WorkloadCommand) -> Result<(), ClusterError> {
        let call = Call::Run {
            node,
            command: cmd.clone(),
        };
        self.record(call, Step::Run)
    }

    async fn run_with_details(
        &self,
        node: NodeId,
        cmd: &WorkloadCommand,
    ) -> Result<ExecutionResult, ClusterError> {
        let call = Call::RunWithDetails {
            node,
            command: cmd.clone(),
        };
        self.record(call, Step::RunWithDetails)?;

        let (delay, stdout) = {
            let state = self.lock();
            (state.run_delay, state.stdout.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(ExecutionResult {
            stdout,
            stderr: String::new(),
            exit_status: 0,
        })
    }
}

struct FakeConn {
    node: NodeId,
    cluster: FakeCluster,
}

#[async_trait]
impl AdminConn for FakeConn {
    async fn exec(&mut self, statement: &str) -> Result<(), ClusterError> {
        let call = Call::Exec {
            node: self.node,
            statement: statement.to_string(),
        };
        self.cluster.record(call, Step::Exec)
    }
}

impl Drop for FakeConn {
    fn drop(&mut self) {
        self.cluster.lock().calls.push(Call::Release { node: self.node });
    }
}
