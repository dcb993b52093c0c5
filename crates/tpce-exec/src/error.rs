use taskvisor::TaskError;
use thiserror::Error;
use tpce_core::ClusterError;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("non-zero exit code: {code}")]
    NonZeroExit { code: i32, stderr: String },
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("killed by signal")]
    KilledBySignal,
    #[error("missing program")]
    MissingProgram,
    #[error("io error: {0}")]
    Io(String),
    #[error("cancelled")]
    Cancelled,
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}

impl From<ExecError> for TaskError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Cancelled => TaskError::Canceled,
            ExecError::Spawn(_) | ExecError::MissingProgram => TaskError::Fatal {
                reason: e.to_string(),
            },
            _ => TaskError::Fail {
                reason: e.to_string(),
            },
        }
    }
}

/// `nodes` names the target selector the command ran against.
pub(crate) fn cluster_error(nodes: &str, e: ExecError) -> ClusterError {
    let reason = match &e {
        ExecError::NonZeroExit { code, stderr } if !stderr.trim().is_empty() => {
            format!("exit code {code}: {}", stderr.trim())
        }
        _ => e.to_string(),
    };
    ClusterError::Command {
        nodes: nodes.to_string(),
        reason,
    }
}
