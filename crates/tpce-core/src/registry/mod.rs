//! Test registry entries and an explicit registry the caller fills.

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tracing::debug;

use tpce_model::{ClusterSpec, Owner, Tags, TestName};

use crate::{cluster::Cluster, error::{BenchError, RegistryError}, harness::TestContext};

pub type RunFuture = BoxFuture<'static, Result<(), BenchError>>;

/// Body of a test that needs one cluster.
pub type SingleRun = Arc<dyn Fn(TestContext, Arc<dyn Cluster>) -> RunFuture + Send + Sync>;

/// Body of a test that needs two independent clusters.
pub type MultiRun =
    Arc<dyn Fn(TestContext, Arc<dyn Cluster>, Arc<dyn Cluster>) -> RunFuture + Send + Sync>;

/// Cluster requirements paired with the run function that consumes them.
#[derive(Clone)]
pub enum TestBody {
    Single { cluster: ClusterSpec, run: SingleRun },
    Multi { clusters: [ClusterSpec; 2], run: MultiRun },
}

/// One runnable entry for the test-selection harness.
#[derive(Clone)]
pub struct TestEntry {
    pub name: TestName,
    pub owner: Owner,
    pub tags: Tags,
    /// `None` falls back to the harness default.
    pub timeout: Option<Duration>,
    pub body: TestBody,
}

impl TestEntry {
    pub fn cluster_requirements(&self) -> Vec<ClusterSpec> {
        match &self.body {
            TestBody::Single { cluster, .. } => vec![*cluster],
            TestBody::Multi { clusters, .. } => clusters.to_vec(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl std::fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestEntry")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("tags", &self.tags)
            .field("timeout", &self.timeout)
            .field("clusters", &self.cluster_requirements())
            .finish()
    }
}

/// Name-indexed set of test entries.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<TestName, TestEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: TestEntry) -> Result<(), RegistryError> {
        if self.entries.contains_key(&entry.name) {
            return Err(RegistryError::Duplicate(entry.name));
        }
        debug!(target: "tpce.registry", name = %entry.name, owner = %entry.owner, "test registered");
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = TestEntry>) -> Result<(), RegistryError> {
        entries.into_iter().try_for_each(|e| self.add(e))
    }

    pub fn get(&self, name: &str) -> Option<&TestEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &TestEntry> {
        self.entries.values()
    }

    pub fn filter_tags<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TestEntry> + 'a {
        self.entries.values().filter(move |e| e.has_tag(tag))
    }
}
