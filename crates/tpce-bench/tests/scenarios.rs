use std::{sync::Arc, time::Duration};

use tpce_bench::{BenchConfig, MultiClusterOrder, TPCE_MARKER, multi_tpce_tests, tpce_tests};
use tpce_core::{
    Cluster, TestRunner,
    testing::{FakeCluster, Step},
};
use tpce_model::{BenchOptions, TestOutcome};

fn small() -> BenchOptions {
    BenchOptions::new(5_000, 3, 4, 1)
}

fn clusters(cs: &[&FakeCluster]) -> Vec<Arc<dyn Cluster>> {
    cs.iter()
        .map(|c| Arc::new((*c).clone()) as Arc<dyn Cluster>)
        .collect()
}

#[tokio::test]
async fn small_configuration_passes_with_expected_commands() {
    let entry = tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).with_stdout("Reported tpsE :  98.2%\n");

    let report = TestRunner::new().run(&entry, clusters(&[&c1])).await;
    assert_eq!(report.outcome, TestOutcome::Passed);

    let commands = c1.commands();
    assert_eq!(commands.len(), 2);

    let init = &commands[0];
    assert_eq!(init.flags("--init").count(), 1);
    assert_eq!(init.flags("--hosts=").collect::<Vec<_>>(), vec!["--hosts=10.0.0.1"]);
    assert_eq!(init.flags("--racks=").collect::<Vec<_>>(), vec!["--racks=3"]);

    let run = &commands[1];
    assert_eq!(
        run.to_shell(),
        "sudo docker run cockroachdb/tpc-e:latest --customers=5000 --racks=3 --duration=2h0m0s \
         --threads=12 --hosts=10.0.0.1 --hosts=10.0.0.2 --hosts=10.0.0.3"
    );
    assert_eq!(
        c1.statements(),
        vec![
            "SET CLUSTER SETTING kv.bulk_io_write.concurrent_addsstable_requests = 4",
            "SET CLUSTER SETTING sql.stats.automatic_collection.enabled = false",
        ]
    );
}

#[tokio::test]
async fn marker_in_output_is_a_reported_failure() {
    let entry = tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).with_stdout(TPCE_MARKER);

    let report = TestRunner::new().run(&entry, clusters(&[&c1])).await;
    assert_eq!(
        report.outcome,
        TestOutcome::Failed {
            reason: "invalid tpsE fraction".into(),
            fatal: false
        }
    );
}

#[tokio::test]
async fn provisioning_failure_builds_no_command() {
    let entry = tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).fail_at(Step::Start);

    let report = TestRunner::new().run(&entry, clusters(&[&c1])).await;
    assert!(matches!(report.outcome, TestOutcome::Failed { fatal: true, .. }));
    assert!(c1.commands().is_empty());
    assert!(c1.statements().is_empty());
}

#[tokio::test]
async fn dual_cluster_passes_only_when_both_pass() {
    let entry = multi_tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4);
    let c2 = FakeCluster::new("c2", 4).with_subnet(1);

    let report = TestRunner::new().run(&entry, clusters(&[&c1, &c2])).await;
    assert_eq!(report.outcome, TestOutcome::Passed);

    for c in [&c1, &c2] {
        assert_eq!(c.statements().len(), 2);
        assert_eq!(c.commands().len(), 2);
    }
    let run2 = &c2.commands()[1];
    assert!(run2.flags("--hosts=").all(|h| h.starts_with("--hosts=10.1.0.")));
}

#[tokio::test]
async fn dual_cluster_reported_failure_still_runs_second_pipeline() {
    let entry = multi_tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).with_stdout(TPCE_MARKER);
    let c2 = FakeCluster::new("c2", 4).with_subnet(1);

    let report = TestRunner::new().run(&entry, clusters(&[&c1, &c2])).await;
    assert_eq!(
        report.outcome,
        TestOutcome::Failed {
            reason: "invalid tpsE fraction".into(),
            fatal: false
        }
    );
    assert_eq!(c2.commands().len(), 2);
}

#[tokio::test]
async fn dual_cluster_fatal_failure_skips_second_pipeline() {
    let entry = multi_tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).fail_at(Step::Run);
    let c2 = FakeCluster::new("c2", 4).with_subnet(1);

    let report = TestRunner::new().run(&entry, clusters(&[&c1, &c2])).await;
    assert!(matches!(report.outcome, TestOutcome::Failed { fatal: true, .. }));
    assert_eq!(c2.statements().len(), 2);
    assert!(c2.commands().is_empty());
}

#[tokio::test]
async fn concurrent_dual_cluster_surfaces_first_cluster_failure() {
    let cfg = BenchConfig {
        multi_cluster_order: MultiClusterOrder::Concurrent,
        ..BenchConfig::default()
    };
    let entry = multi_tpce_tests(&[small()], &cfg).remove(0);
    let c1 = FakeCluster::new("c1", 4).with_stdout(TPCE_MARKER);
    let c2 = FakeCluster::new("c2", 4).fail_at(Step::RunWithDetails);

    let report = TestRunner::new().run(&entry, clusters(&[&c1, &c2])).await;
    assert_eq!(
        report.outcome,
        TestOutcome::Failed {
            reason: "invalid tpsE fraction".into(),
            fatal: false
        }
    );
    assert_eq!(c2.commands().len(), 2);
}

#[tokio::test]
async fn dual_cluster_entry_needs_two_clusters() {
    let entry = multi_tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4);

    let report = TestRunner::new().run(&entry, clusters(&[&c1])).await;
    assert!(matches!(report.outcome, TestOutcome::Failed { fatal: true, .. }));
    assert!(c1.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hung_workload_times_out() {
    let opts = small().with_timeout(Duration::from_secs(60 * 60));
    let entry = tpce_tests(&[opts], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).with_run_delay(Duration::from_secs(3 * 60 * 60));

    let report = TestRunner::new().run(&entry, clusters(&[&c1])).await;
    assert_eq!(
        report.outcome,
        TestOutcome::TimedOut {
            after: Duration::from_secs(3_600)
        }
    );
    assert_eq!(report.statuses.last().map(String::as_str), Some("running workload"));
}

#[tokio::test(start_paused = true)]
async fn concurrent_fatal_failure_stops_the_other_pipeline() {
    let cfg = BenchConfig {
        multi_cluster_order: MultiClusterOrder::Concurrent,
        ..BenchConfig::default()
    };
    let opts = small().with_timeout(Duration::from_secs(60 * 60));
    let entry = multi_tpce_tests(&[opts], &cfg).remove(0);
    let c1 = FakeCluster::new("c1", 4).fail_at(Step::Run);
    let c2 = FakeCluster::new("c2", 4)
        .with_subnet(1)
        .with_run_delay(Duration::from_secs(3 * 60 * 60));

    let report = TestRunner::new().run(&entry, clusters(&[&c1, &c2])).await;
    match &report.outcome {
        TestOutcome::Failed { reason, fatal } => {
            assert!(*fatal);
            assert!(reason.starts_with("workload init"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(report.elapsed < Duration::from_secs(60 * 60));
}

#[tokio::test]
async fn fatal_second_failure_outranks_reported_first_failure() {
    let entry = multi_tpce_tests(&[small()], &BenchConfig::default()).remove(0);
    let c1 = FakeCluster::new("c1", 4).with_stdout(TPCE_MARKER);
    let c2 = FakeCluster::new("c2", 4).with_subnet(1).fail_at(Step::Run);

    let report = TestRunner::new().run(&entry, clusters(&[&c1, &c2])).await;
    match &report.outcome {
        TestOutcome::Failed { reason, fatal } => {
            assert!(*fatal);
            assert!(reason.starts_with("workload init"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
