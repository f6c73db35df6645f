//! The refresh seam: fetch a fresh snapshot of a resource by identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use converge_core::Snapshot;
use itertools::Itertools;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;

/// Re-fetches the current snapshot of a resource.
///
/// One round trip to the source of truth per call. `Ok(None)` means the
/// identity no longer resolves. `Err` is reserved for failures that leave
/// the resource's state unknown (timeouts, auth, malformed responses).
#[async_trait]
pub trait SnapshotRefresher<S: Snapshot>: Send + Sync {
    /// Fetch the current snapshot for `id`.
    async fn refresh(&self, id: &str) -> Result<Option<S>>;
}

#[async_trait]
impl<S, R> SnapshotRefresher<S> for Arc<R>
where
    S: Snapshot,
    R: SnapshotRefresher<S> + ?Sized,
{
    async fn refresh(&self, id: &str) -> Result<Option<S>> {
        (**self).refresh(id).await
    }
}

/// In-memory snapshot source for testing and local tooling.
pub struct InMemoryRefresher<S: Snapshot> {
    snapshots: RwLock<HashMap<String, S>>,
    calls: AtomicUsize,
}

impl<S: Snapshot> Default for InMemoryRefresher<S> {
    fn default() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<S: Snapshot> InMemoryRefresher<S> {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty source wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace a snapshot. Snapshots without identity are not
    /// stored; returns whether the snapshot was stored.
    pub async fn upsert(&self, snapshot: S) -> bool {
        let Some(id) = snapshot.id().map(str::to_owned) else {
            return false;
        };
        self.snapshots.write().await.insert(id, snapshot);
        true
    }

    /// Forget a resource, as if it had been deleted.
    pub async fn remove(&self, id: &str) -> Option<S> {
        self.snapshots.write().await.remove(id)
    }

    /// Identities currently held, sorted.
    pub async fn ids(&self) -> Vec<String> {
        self.snapshots.read().await.keys().cloned().sorted().collect_vec()
    }

    /// Number of `refresh` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: Snapshot> SnapshotRefresher<S> for InMemoryRefresher<S> {
    async fn refresh(&self, id: &str) -> Result<Option<S>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshots.read().await.get(id).cloned())
    }
}

/// A wrapper that adds tracing to a refresher.
pub struct TracingRefresher<R> {
    inner: R,
}

impl<R> TracingRefresher<R> {
    /// Create a new tracing refresher.
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Get the wrapped refresher.
    pub const fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<S, R> SnapshotRefresher<S> for TracingRefresher<R>
where
    S: Snapshot,
    R: SnapshotRefresher<S>,
{
    async fn refresh(&self, id: &str) -> Result<Option<S>> {
        debug!(id = %id, "Refreshing snapshot");
        let result = self.inner.refresh(id).await;
        match &result {
            Ok(Some(fresh)) => debug!(id = %id, status = %fresh.status(), "Refreshed snapshot"),
            Ok(None) => debug!(id = %id, "Resource not found"),
            Err(e) => warn!(id = %id, error = %e, "Refresh failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converge_core::{NodeMetadata, NodeStatus};

    #[tokio::test]
    async fn test_in_memory_refresh() {
        let source = InMemoryRefresher::new();
        assert!(
            source
                .upsert(NodeMetadata::new("n1", NodeStatus::Pending))
                .await
        );

        let found = source.refresh("n1").await;
        assert_eq!(
            found.ok().flatten().map(|n| n.status()),
            Some(NodeStatus::Pending)
        );

        let missing = source.refresh("n2").await;
        assert!(matches!(missing, Ok(None)));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_skips_unidentified() {
        let source = InMemoryRefresher::new();
        let stored = source
            .upsert(NodeMetadata::unidentified(NodeStatus::Pending))
            .await;
        assert!(!stored);
        assert!(source.ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_makes_resource_gone() {
        let source = InMemoryRefresher::new();
        source
            .upsert(NodeMetadata::new("b", NodeStatus::Running))
            .await;
        source
            .upsert(NodeMetadata::new("a", NodeStatus::Running))
            .await;
        assert_eq!(source.ids().await, vec!["a".to_string(), "b".to_string()]);

        assert!(source.remove("a").await.is_some());
        let gone: Result<Option<NodeMetadata>> = source.refresh("a").await;
        assert!(matches!(gone, Ok(None)));
    }

    #[tokio::test]
    async fn test_tracing_and_arc_delegate() {
        let source = InMemoryRefresher::new_arc();
        source
            .upsert(NodeMetadata::new("n1", NodeStatus::Running))
            .await;
        let traced = TracingRefresher::new(Arc::clone(&source));

        let result: Result<Option<NodeMetadata>> = traced.refresh("n1").await;
        assert!(matches!(result, Ok(Some(_))));
        assert_eq!(traced.inner().calls(), 1);
    }
}
