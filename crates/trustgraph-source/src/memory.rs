//! In-memory implementation of the GraphSource trait.
//!
//! Serves whatever bundle was last published to it. Failure injection and
//! an artificial delay make it the upstream of choice for tests, and it is
//! also the natural source for embedders that receive bundles by other
//! means and just need to hand them to a store.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use trustgraph_grants::{GrantBundle, Snapshot};

use crate::error::{Result, SourceError};
use crate::traits::GraphSource;

/// In-memory source. Thread-safe via RwLock.
pub struct MemorySource {
    inner: RwLock<MemorySourceInner>,
}

#[derive(Default)]
struct MemorySourceInner {
    /// The bundle served on fetch.
    bundle: Option<GrantBundle>,

    /// Number of upcoming fetches that fail.
    fail_next: usize,

    /// Fail every fetch until cleared.
    failing: bool,

    /// Sleep before answering.
    delay: Option<Duration>,

    /// Fetches attempted so far.
    fetches: u64,
}

impl MemorySource {
    /// Create a source with nothing published.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemorySourceInner::default()),
        }
    }

    /// Create a source already serving `bundle`.
    pub fn with_bundle(bundle: GrantBundle) -> Self {
        let source = Self::new();
        source.publish(bundle);
        source
    }

    /// Replace the served bundle.
    pub fn publish(&self, bundle: GrantBundle) {
        self.write(|inner| inner.bundle = Some(bundle));
    }

    /// Stop serving anything.
    pub fn withdraw(&self) {
        self.write(|inner| inner.bundle = None);
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next(&self, count: usize) {
        self.write(|inner| inner.fail_next = count);
    }

    /// Make every fetch fail until called again with `false`.
    pub fn set_failing(&self, failing: bool) {
        self.write(|inner| inner.failing = failing);
    }

    /// Delay every fetch, e.g. to exercise fetch timeouts.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write(|inner| inner.delay = delay);
    }

    /// Number of fetches attempted.
    pub fn fetch_count(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fetches
    }

    fn write<F: FnOnce(&mut MemorySourceInner)>(&self, f: F) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner);
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphSource for MemorySource {
    async fn fetch(&self) -> Result<Snapshot> {
        // Decide under the lock, sleep without it.
        let (delay, outcome) = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.fetches += 1;

            let outcome = if inner.failing {
                Err(SourceError::Unavailable("upstream failing".into()))
            } else if inner.fail_next > 0 {
                inner.fail_next -= 1;
                Err(SourceError::Unavailable("injected failure".into()))
            } else {
                inner
                    .bundle
                    .clone()
                    .ok_or_else(|| SourceError::Unavailable("nothing published".into()))
            };

            (inner.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(outcome?.into_snapshot()?)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgraph_core::{Keypair, PermissionMask};
    use trustgraph_grants::GrantStatement;

    fn bundle(watermark: i64) -> GrantBundle {
        let key = Keypair::from_seed(&[1; 32]).key_id();
        GrantBundle::new(
            watermark,
            vec![GrantStatement::new(key, "teamA", PermissionMask::READ, 0, 10_000)],
        )
    }

    #[tokio::test]
    async fn test_serves_published_bundle() {
        let source = MemorySource::new();
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Unavailable(_))
        ));

        source.publish(bundle(500));
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.watermark, 500);
        assert_eq!(snapshot.graph.len(), 1);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_next_then_recover() {
        let source = MemorySource::with_bundle(bundle(500));
        source.fail_next(2);

        assert!(source.fetch().await.is_err());
        assert!(source.fetch().await.is_err());
        assert!(source.fetch().await.is_ok());
    }

    #[tokio::test]
    async fn test_set_failing() {
        let source = MemorySource::with_bundle(bundle(500));
        source.set_failing(true);
        assert!(source.fetch().await.is_err());
        source.set_failing(false);
        assert!(source.fetch().await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_bundle_is_an_error() {
        let source = MemorySource::with_bundle(bundle(0));
        assert!(matches!(source.fetch().await, Err(SourceError::Invalid(_))));
    }
}
