mod cli;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, bail};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tpce_bench::{BenchConfig, MultiClusterOrder, register_tpce};
use tpce_core::{Cluster, Registry, TestRunner};
use tpce_exec::{RoachprodCluster, RoachprodConfig};
use tpce_observe::{Journal, LoggerConfig, LoggerFormat, logger_init};

use crate::cli::{Cli, Command, RunArgs};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_cfg = LoggerConfig {
        format: cli.log_format.parse::<LoggerFormat>()?,
        level: cli.log_level.clone(),
        ..LoggerConfig::default()
    };
    logger_init(&log_cfg)?;

    match cli.command {
        Command::List { tag } => {
            let registry = registry(&BenchConfig::default())?;
            match tag.as_deref() {
                Some(tag) => registry.filter_tags(tag).for_each(|e| println!("{}", e.name)),
                None => registry.iter().for_each(|e| println!("{}", e.name)),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(args) => run(args).await,
    }
}

fn registry(cfg: &BenchConfig) -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    register_tpce(&mut registry, cfg).context("register tpce tests")?;
    Ok(registry)
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let cfg = BenchConfig {
        cockroach_binary: args.cockroach.clone(),
        multi_cluster_order: if args.concurrent {
            MultiClusterOrder::Concurrent
        } else {
            MultiClusterOrder::Sequential
        },
        ..BenchConfig::default()
    };
    let registry = registry(&cfg)?;
    let Some(entry) = registry.get(&args.name) else {
        bail!("unknown test {}", args.name);
    };

    let requirements = entry.cluster_requirements();
    if requirements.len() != args.clusters.len() {
        bail!(
            "test {} needs {} cluster(s), {} given",
            entry.name,
            requirements.len(),
            args.clusters.len()
        );
    }

    let shutdown = CancellationToken::new();
    let clusters: Vec<Arc<dyn Cluster>> = args
        .clusters
        .iter()
        .zip(requirements)
        .map(|(name, spec)| {
            let cfg = RoachprodConfig::new(name.clone(), spec).with_binary(args.roachprod.clone());
            Arc::new(RoachprodCluster::new(cfg).with_shutdown(shutdown.clone())) as Arc<dyn Cluster>
        })
        .collect();

    let runner = TestRunner::new()
        .with_default_timeout(cfg.default_timeout)
        .with_cockroach(cfg.cockroach_binary.clone())
        .with_subscriber(Arc::new(Journal::new()));

    let report = tokio::select! {
        report = runner.run(entry, clusters) => report,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted; stopping roachprod commands");
            shutdown.cancel();
            return Ok(ExitCode::from(130));
        }
    };

    let outcome = serde_json::to_string(&report.outcome).context("encode outcome")?;
    println!("{} {outcome}", report.name);
    if report.outcome.is_passed() {
        info!(run_id = %report.run_id, elapsed = ?report.elapsed, "test passed");
        Ok(ExitCode::SUCCESS)
    } else {
        error!(run_id = %report.run_id, elapsed = ?report.elapsed, "test did not pass");
        Ok(ExitCode::FAILURE)
    }
}
