use tracing::{debug, instrument};

use tpce_model::{NodeId, TuningDirective};

use crate::{
    cluster::{AdminConn, Cluster},
    error::BenchError,
};

/// Applies an ordered list of cluster settings right after start-up.
///
/// Directives run once, in order, and the first failure aborts the pass. Every
/// failure is fatal: a benchmark on an untuned cluster is meaningless.
#[derive(Clone, Debug, Default)]
pub struct Tuner {
    directives: Vec<TuningDirective>,
}

impl Tuner {
    pub fn new(directives: Vec<TuningDirective>) -> Self {
        Self { directives }
    }

    pub fn directives(&self) -> &[TuningDirective] {
        &self.directives
    }

    /// Open a connection to `node`, apply every directive and release the connection
    /// whether or not the pass succeeded.
    #[instrument(level = "debug", skip(self, cluster), fields(cluster = %cluster.name()))]
    pub async fn apply(&self, cluster: &dyn Cluster, node: NodeId) -> Result<(), BenchError> {
        let mut conn = cluster
            .conn(node)
            .await
            .map_err(|source| BenchError::Connect { node, source })?;
        let res = self.apply_on(conn.as_mut()).await;
        drop(conn);
        res
    }

    /// Apply every directive over an already open connection.
    pub async fn apply_on(&self, conn: &mut dyn AdminConn) -> Result<(), BenchError> {
        for directive in &self.directives {
            let statement = directive.statement();
            debug!(target: "tpce.tuner", %statement, "applying");
            conn.exec(&statement)
                .await
                .map_err(|source| BenchError::Tuning { statement, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeCluster, Step};

    fn tuner() -> Tuner {
        Tuner::new(vec![
            TuningDirective::new("a.b", 1_i64),
            TuningDirective::new("c.d", false),
        ])
    }

    #[tokio::test]
    async fn applies_in_order_and_releases() {
        let cluster = FakeCluster::new("c1", 4);
        tuner().apply(&cluster, NodeId(1)).await.unwrap();

        assert_eq!(
            cluster.statements(),
            vec!["SET CLUSTER SETTING a.b = 1", "SET CLUSTER SETTING c.d = false"]
        );
        assert!(matches!(cluster.calls().last(), Some(Call::Release { node: NodeId(1) })));
    }

    #[tokio::test]
    async fn failure_stops_pass_and_still_releases() {
        let cluster = FakeCluster::new("c1", 4).fail_at(Step::Exec);
        let err = tuner().apply(&cluster, NodeId(1)).await.unwrap_err();

        assert!(matches!(err, BenchError::Tuning { ref statement, .. } if statement == "SET CLUSTER SETTING a.b = 1"));
        assert!(err.is_fatal());
        assert_eq!(cluster.statements().len(), 1);
        assert!(matches!(cluster.calls().last(), Some(Call::Release { .. })));
    }

    #[tokio::test]
    async fn connect_failure_sends_nothing() {
        let cluster = FakeCluster::new("c1", 4).fail_at(Step::Connect);
        let err = tuner().apply(&cluster, NodeId(1)).await.unwrap_err();

        assert!(matches!(err, BenchError::Connect { node: NodeId(1), .. }));
        assert!(cluster.statements().is_empty());
    }
}
