use std::{path::PathBuf, process::Stdio};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use tpce_model::ExecutionResult;

use crate::{
    error::{ExecError, ExecResult},
    util::{cmd_program, kill_graceful},
};

/// Process configuration.
#[derive(Clone, Debug)]
pub struct ProcConfig {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Return an error if the exit code is non-zero.
    pub fail_on_non_zero: bool,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
            fail_on_non_zero: true,
        }
    }
}

impl ProcConfig {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Runs local subprocesses with captured output.
///
/// Children are killed when cancelled or when the running future is dropped.
#[derive(Clone, Debug, Default)]
pub struct ProcRunner {
    name: &'static str,
}

impl ProcRunner {
    pub fn new() -> Self {
        Self { name: "proc" }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run to completion and capture stdout and stderr.
    pub async fn output(
        &self,
        cfg: &ProcConfig,
        cancel: &CancellationToken,
    ) -> ExecResult<ExecutionResult> {
        if cfg.program.is_empty() {
            return Err(ExecError::MissingProgram);
        }
        if cancel.is_cancelled() {
            return Err(ExecError::Cancelled);
        }

        trace!(target: "tpce.exec.proc", runner = self.name, program = %cfg.program, args = ?cfg.args, "spawn");
        let mut cmd = cmd_program(cfg);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| ExecError::Spawn(e.to_string()))?;
        let stdout = child.stdout.take().ok_or_else(|| ExecError::Io("stdout not piped".into()))?;
        let mut stderr = child.stderr.take().ok_or_else(|| ExecError::Io("stderr not piped".into()))?;

        let runner = self.name;
        let read_stdout = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut out = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                trace!(target: "tpce.exec.proc.out", runner, %line);
                out.push_str(&line);
                out.push('\n');
            }
            out
        });
        let read_stderr = tokio::spawn(async move {
            let mut err = String::new();
            let _ = stderr.read_to_string(&mut err).await;
            err
        });

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                let stdout = read_stdout.await.unwrap_or_default();
                let stderr = read_stderr.await.unwrap_or_default();

                let Some(code) = status.code() else {
                    return Err(ExecError::KilledBySignal);
                };
                if code != 0 && cfg.fail_on_non_zero {
                    debug!(target: "tpce.exec.proc", runner, code, "exit non-zero");
                    return Err(ExecError::NonZeroExit { code, stderr });
                }

                debug!(target: "tpce.exec.proc", runner, code, "exit");
                Ok(ExecutionResult { stdout, stderr, exit_status: code })
            }
            _ = cancel.cancelled() => {
                debug!(target: "tpce.exec.proc", runner, "cancelled; killing child");
                let _ = kill_graceful(&mut child).await;
                read_stdout.abort();
                read_stderr.abort();
                Err(ExecError::Cancelled)
            }
        }
    }
}
