use std::fmt;

use serde::{Deserialize, Serialize};

/// A command line for the containerized workload generator.
///
/// Pure data: building one never executes anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadCommand {
    pub executable: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl WorkloadCommand {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments whose text starts with `prefix`, in order.
    pub fn flags<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.arguments
            .iter()
            .map(String::as_str)
            .filter(move |a| a.starts_with(prefix))
    }

    /// Single-line shell form for backends that take a command string.
    pub fn to_shell(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WorkloadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.executable)?;
        for arg in &self.arguments {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured output of a finished command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_form_joins_with_spaces() {
        let cmd = WorkloadCommand::new("sudo")
            .args(["docker", "run", "img"])
            .arg("--init");
        assert_eq!(cmd.to_shell(), "sudo docker run img --init");
    }

    #[test]
    fn flags_filters_by_prefix_in_order() {
        let cmd = WorkloadCommand::new("x").args(["--hosts=a", "--init", "--hosts=b"]);
        assert_eq!(cmd.flags("--hosts=").collect::<Vec<_>>(), vec!["--hosts=a", "--hosts=b"]);
    }
}
