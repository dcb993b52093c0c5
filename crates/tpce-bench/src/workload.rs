//! Command lines for the containerized TPC-E generator.
//!
//! The driver only builds [`WorkloadCommand`] values; running them is up to the
//! cluster backend.

use std::time::Duration;

use tpce_core::BenchError;
use tpce_model::{ClusterTopology, WorkloadCommand};

use crate::config::WorkloadConfig;

#[derive(Clone, Debug, Default)]
pub struct WorkloadDriver {
    cfg: WorkloadConfig,
}

impl WorkloadDriver {
    pub fn new(cfg: WorkloadConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.cfg
    }

    /// Dataset import seeded through the first compute node.
    pub fn build_init_command(
        &self,
        topology: &ClusterTopology,
        customers: u32,
        racks: u32,
    ) -> Result<WorkloadCommand, BenchError> {
        let seed = topology
            .compute_ips()
            .next()
            .ok_or_else(|| BenchError::Init {
                command: self.base().to_shell(),
                reason: "topology has no compute nodes".into(),
            })?;

        Ok(self
            .base()
            .arg(format!("--customers={customers}"))
            .arg(format!("--racks={racks}"))
            .arg("--init")
            .arg(host_flag(seed)))
    }

    /// Measured run against every compute node, in topology order.
    pub fn build_run_command(
        &self,
        topology: &ClusterTopology,
        customers: u32,
        racks: u32,
        duration: Duration,
        threads: u32,
    ) -> Result<WorkloadCommand, BenchError> {
        if topology.node_count() == 0 {
            return Err(BenchError::Init {
                command: self.base().to_shell(),
                reason: "topology has no compute nodes".into(),
            });
        }

        Ok(self
            .base()
            .arg(format!("--customers={customers}"))
            .arg(format!("--racks={racks}"))
            .arg(format!("--duration={}", go_duration(duration)))
            .arg(format!("--threads={threads}"))
            .args(topology.compute_ips().map(host_flag)))
    }

    fn base(&self) -> WorkloadCommand {
        let cmd = if self.cfg.sudo {
            WorkloadCommand::new("sudo").arg(&self.cfg.runtime)
        } else {
            WorkloadCommand::new(&self.cfg.runtime)
        };
        cmd.arg("run").arg(&self.cfg.image)
    }
}

fn host_flag(ip: &str) -> String {
    format!("--hosts={ip}")
}

/// Render a duration the way Go's `time.Duration` prints it (`2h0m0s`, `1m30s`, `250ms`).
pub fn go_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let nanos = d.as_nanos();
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", fraction(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", fraction(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let (hours, minutes) = (secs / 3600, (secs % 3600) / 60);
    let seconds = fraction(u128::from(secs % 60) * 1_000_000_000 + u128::from(d.subsec_nanos()), 1_000_000_000);

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

/// `value / unit` with the remainder as trimmed decimal digits.
fn fraction(value: u128, unit: u128) -> String {
    let (whole, rem) = (value / unit, value % unit);
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{rem:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpce_model::{NodeAddr, NodeId};

    fn topology(n: u32) -> ClusterTopology {
        let compute = (1..=n)
            .map(|i| NodeAddr::new(NodeId(i), format!("10.0.0.{i}")))
            .collect();
        ClusterTopology::new(compute, NodeAddr::new(NodeId(n + 1), "10.0.0.99")).unwrap()
    }

    #[test]
    fn init_command_seeds_first_host_only() {
        let cmd = WorkloadDriver::default()
            .build_init_command(&topology(3), 5_000, 3)
            .unwrap();
        assert_eq!(
            cmd.to_shell(),
            "sudo docker run cockroachdb/tpc-e:latest --customers=5000 --racks=3 --init --hosts=10.0.0.1"
        );
    }

    #[test]
    fn run_command_lists_every_host_in_order() {
        let cmd = WorkloadDriver::default()
            .build_run_command(&topology(5), 100_000, 5, Duration::from_secs(7_200), 160)
            .unwrap();
        assert_eq!(
            cmd.flags("--hosts=").collect::<Vec<_>>(),
            vec![
                "--hosts=10.0.0.1",
                "--hosts=10.0.0.2",
                "--hosts=10.0.0.3",
                "--hosts=10.0.0.4",
                "--hosts=10.0.0.5",
            ]
        );
        assert_eq!(cmd.flags("--duration=").collect::<Vec<_>>(), vec!["--duration=2h0m0s"]);
        assert_eq!(cmd.flags("--threads=").collect::<Vec<_>>(), vec!["--threads=160"]);
    }

    #[test]
    fn runtime_without_sudo() {
        let driver = WorkloadDriver::new(WorkloadConfig {
            sudo: false,
            runtime: "podman".into(),
            ..WorkloadConfig::default()
        });
        let cmd = driver.build_init_command(&topology(1), 10, 1).unwrap();
        assert_eq!(cmd.executable, "podman");
        assert_eq!(cmd.arguments[..2], ["run", "cockroachdb/tpc-e:latest"]);
    }

    #[test]
    fn go_duration_notation() {
        assert_eq!(go_duration(Duration::from_secs(2 * 3600)), "2h0m0s");
        assert_eq!(go_duration(Duration::from_secs(36 * 3600 + 61)), "36h1m1s");
        assert_eq!(go_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(go_duration(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(go_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(go_duration(Duration::from_micros(3)), "3µs");
        assert_eq!(go_duration(Duration::ZERO), "0s");
    }
}
