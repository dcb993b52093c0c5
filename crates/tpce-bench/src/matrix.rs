//! Benchmark configurations and the registry entries built from them.
//!
//! Builders are pure: they return entries and leave registration to the caller.
//! Every entry owns its own copy of the options it runs with.

use std::{sync::Arc, time::Duration};

use futures::FutureExt;

use tpce_core::{
    Cluster, Registry, RegistryError, TestBody, TestContext, TestEntry,
    registry::{MultiRun, SingleRun},
};
use tpce_model::{BenchOptions, Owner, ReusePolicy};

use crate::{
    config::BenchConfig,
    pipeline::{run_multi_tpce, run_tpce},
};

/// Nightly small-scale and weekly large-scale single-cluster configurations.
pub fn single_cluster_options() -> Vec<BenchOptions> {
    vec![
        BenchOptions::new(5_000, 3, 4, 1),
        BenchOptions::new(100_000, 5, 32, 2)
            .with_tag("weekly")
            .with_timeout(Duration::from_secs(36 * 60 * 60)),
    ]
}

/// Dual-cluster configurations. The large configuration is not run in this form.
pub fn multi_cluster_options() -> Vec<BenchOptions> {
    vec![BenchOptions::new(5_000, 3, 4, 1)]
}

pub fn test_name(opts: &BenchOptions) -> String {
    format!("tpce/c={}/nodes={}", opts.customers, opts.nodes)
}

pub fn multi_test_name(opts: &BenchOptions) -> String {
    format!("{}/multicluster", test_name(opts))
}

/// One single-cluster entry per configuration.
pub fn tpce_tests(options: &[BenchOptions], cfg: &BenchConfig) -> Vec<TestEntry> {
    options
        .iter()
        .map(|opts| {
            let captured = opts.clone();
            let cfg = Arc::new(cfg.clone());
            let run: SingleRun = Arc::new(move |ctx: TestContext, cluster: Arc<dyn Cluster>| {
                let opts = captured.clone();
                let cfg = Arc::clone(&cfg);
                async move { run_tpce(ctx, cluster, opts, &cfg).await }.boxed()
            });

            TestEntry {
                name: test_name(opts),
                owner: Owner::Kv,
                tags: opts.tags.clone(),
                timeout: opts.timeout,
                body: TestBody::Single {
                    cluster: opts.cluster_spec(ReusePolicy::Any),
                    run,
                },
            }
        })
        .collect()
}

/// One dual-cluster entry per configuration; neither cluster is reused.
pub fn multi_tpce_tests(options: &[BenchOptions], cfg: &BenchConfig) -> Vec<TestEntry> {
    options
        .iter()
        .map(|opts| {
            let captured = opts.clone();
            let cfg = Arc::new(cfg.clone());
            let run: MultiRun = Arc::new(
                move |ctx: TestContext, c1: Arc<dyn Cluster>, c2: Arc<dyn Cluster>| {
                    let opts = captured.clone();
                    let cfg = Arc::clone(&cfg);
                    async move { run_multi_tpce(ctx, c1, c2, opts, &cfg).await }.boxed()
                },
            );

            let spec = opts.cluster_spec(ReusePolicy::None);
            TestEntry {
                name: multi_test_name(opts),
                owner: Owner::TestEng,
                tags: opts.tags.clone(),
                timeout: opts.timeout,
                body: TestBody::Multi {
                    clusters: [spec, spec],
                    run,
                },
            }
        })
        .collect()
}

/// Register the default single- and dual-cluster matrices.
pub fn register_tpce(registry: &mut Registry, cfg: &BenchConfig) -> Result<(), RegistryError> {
    registry.extend(tpce_tests(&single_cluster_options(), cfg))?;
    registry.extend(multi_tpce_tests(&multi_cluster_options(), cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpce_model::ClusterSpec;

    #[test]
    fn default_matrix_names_and_requirements() {
        let mut registry = Registry::new();
        register_tpce(&mut registry, &BenchConfig::default()).unwrap();

        let names: Vec<_> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "tpce/c=100000/nodes=5",
                "tpce/c=5000/nodes=3",
                "tpce/c=5000/nodes=3/multicluster",
            ]
        );

        let large = registry.get("tpce/c=100000/nodes=5").unwrap();
        assert!(large.has_tag("weekly"));
        assert_eq!(large.timeout, Some(Duration::from_secs(36 * 3600)));
        assert_eq!(
            large.cluster_requirements(),
            vec![ClusterSpec {
                nodes: 6,
                cpus: 32,
                ssds: 2,
                reuse: ReusePolicy::Any
            }]
        );

        let multi = registry.get("tpce/c=5000/nodes=3/multicluster").unwrap();
        assert_eq!(multi.owner, Owner::TestEng);
        assert_eq!(multi.timeout, None);
        assert!(multi
            .cluster_requirements()
            .iter()
            .all(|c| c.nodes == 4 && c.reuse == ReusePolicy::None));
    }

    #[test]
    fn each_entry_keeps_its_own_options() {
        let options = vec![
            BenchOptions::new(10, 1, 2, 1),
            BenchOptions::new(20, 2, 2, 1),
            BenchOptions::new(30, 3, 2, 1),
        ];
        let entries = tpce_tests(&options, &BenchConfig::default());
        let nodes: Vec<_> = entries
            .iter()
            .map(|e| e.cluster_requirements()[0].nodes)
            .collect();
        assert_eq!(nodes, vec![2, 3, 4]);
        assert_eq!(entries[2].name, "tpce/c=30/nodes=3");
    }

    #[test]
    fn registering_twice_is_rejected() {
        let mut registry = Registry::new();
        let cfg = BenchConfig::default();
        register_tpce(&mut registry, &cfg).unwrap();
        assert!(matches!(
            register_tpce(&mut registry, &cfg),
            Err(RegistryError::Duplicate(_))
        ));
    }
}
