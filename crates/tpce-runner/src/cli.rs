use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run TPC-E benchmarks against roachprod clusters", long_about = None)]
pub struct Cli {
    /// Log format: text, json or journald.
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,
    /// Log filter directive, e.g. `info` or `tpce.monitor=debug,info`.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print registered test names.
    List {
        /// Only tests carrying this tag.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Run one registered test.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Test name, e.g. `tpce/c=5000/nodes=3`.
    pub name: String,
    /// Existing roachprod cluster; repeat once for dual-cluster tests.
    #[arg(long = "cluster", required = true)]
    pub clusters: Vec<String>,
    /// Path of the roachprod binary.
    #[arg(long, default_value = "roachprod")]
    pub roachprod: PathBuf,
    /// Local cockroach binary copied to the compute nodes.
    #[arg(long, default_value = "./cockroach")]
    pub cockroach: PathBuf,
    /// Run both pipelines of a dual-cluster test at the same time.
    #[arg(long)]
    pub concurrent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_two_clusters() {
        let cli = Cli::parse_from([
            "tpce-runner",
            "run",
            "tpce/c=5000/nodes=3/multicluster",
            "--cluster",
            "a",
            "--cluster",
            "b",
            "--concurrent",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.clusters, vec!["a", "b"]);
                assert!(args.concurrent);
                assert_eq!(args.cockroach, PathBuf::from("./cockroach"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn run_requires_a_cluster() {
        assert!(Cli::try_parse_from(["tpce-runner", "run", "tpce/c=5000/nodes=3"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
