//! GraphSource trait: the outbound fetch contract of the trust store.
//!
//! A source knows where its upstream lives and how to turn what it finds
//! there into a validated [`Snapshot`]. The store never sees locators or
//! transports.

use async_trait::async_trait;
use std::sync::Arc;

use trustgraph_grants::Snapshot;

use crate::error::Result;

/// Fetches the current grant graph and watermark from upstream.
///
/// Implementations must be thread-safe (Send + Sync). `fetch` may be slow;
/// callers bound it with their own timeout and may drop the future to
/// cancel it.
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Fetch and validate a fresh snapshot.
    async fn fetch(&self) -> Result<Snapshot>;

    /// Short human-readable locator for logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl<S: GraphSource + ?Sized> GraphSource for Arc<S> {
    async fn fetch(&self) -> Result<Snapshot> {
        (**self).fetch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
