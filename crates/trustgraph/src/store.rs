//! The trust store: a cached grant graph with a hard staleness deadline.
//!
//! The store owns the current [`GrantGraph`] snapshot and a watermark. Reads
//! go through [`TrustStore::check_key`]; refreshes through
//! [`TrustStore::update_base`], which never fails from the caller's point of
//! view and keeps the last good graph when upstream is unavailable.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use trustgraph_core::{Clock, Namespace, PermissionMask, PublicKey, SystemClock};
use trustgraph_grants::{GrantGraph, Snapshot};
use trustgraph_source::GraphSource;

use crate::error::{Result, TrustError};

/// Configuration for the trust store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Mask checked when the caller requests `0`.
    pub default_mask: PermissionMask,
    /// Upper bound on a single upstream fetch.
    pub fetch_timeout: Duration,
    /// Period of the background refresher.
    pub refresh_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_mask: PermissionMask::DEFAULT_REQUEST,
            fetch_timeout: Duration::from_secs(30),
            refresh_interval: Duration::from_secs(300),
        }
    }
}

impl StoreConfig {
    /// Set the mask used for zero requests. An empty mask is ignored.
    pub fn with_default_mask(mut self, mask: PermissionMask) -> Self {
        if !mask.is_empty() {
            self.default_mask = mask;
        }
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The key holds the requested permissions.
    Granted,
    /// Not verified: no graph has ever been loaded.
    NoGraph,
    /// Not verified: the graph does not grant the request.
    Denied,
    /// Not verified: the graph grants it, but the cache watermark has passed.
    Expired,
}

impl Decision {
    /// Whether access is allowed.
    pub fn is_granted(self) -> bool {
        matches!(self, Decision::Granted)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Decision::Granted => "granted",
            Decision::NoGraph => "not verified: no graph",
            Decision::Denied => "not verified: denied",
            Decision::Expired => "not verified: expired",
        })
    }
}

/// Where the store is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No graph has been loaded yet.
    Uninitialized,
    /// A graph is loaded and the watermark is in the future.
    Fresh,
    /// A graph is loaded but the watermark has passed; every check is denied.
    Stale,
}

/// Shared mutable state. Replaced as a unit under the write lock.
#[derive(Default)]
struct StoreState {
    graph: Option<Arc<GrantGraph>>,
    watermark: i64,
}

/// The trust store.
///
/// Construct one per trust domain and share it by `Arc`. Safe for any number
/// of concurrent readers alongside refreshes.
pub struct TrustStore<S: GraphSource> {
    /// Upstream the graph is refreshed from.
    source: S,
    /// Configuration.
    config: StoreConfig,
    /// Evaluation time.
    clock: Arc<dyn Clock>,
    /// Current graph and watermark.
    state: RwLock<StoreState>,
    /// Serializes refreshes so that installs happen in fetch order.
    refresh: tokio::sync::Mutex<()>,
}

impl<S: GraphSource> TrustStore<S> {
    /// Create an empty store. Nothing is fetched until `update_base` runs.
    pub fn new(source: S, config: StoreConfig) -> Self {
        Self {
            source,
            config,
            clock: Arc::new(SystemClock),
            state: RwLock::new(StoreState::default()),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Evaluate times with `clock` instead of the wall clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the source reference.
    pub fn source(&self) -> &S {
        &self.source
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Check whether the serialized key may perform `mask` within `namespace`.
    ///
    /// `key_bytes` is a JWK. A `mask` of zero checks the configured default
    /// (`READ | WRITE` unless changed). Errors are reserved for caller
    /// mistakes; every authorization answer, positive or not, is a
    /// [`Decision`].
    pub fn check_key(&self, namespace: &str, key_bytes: &[u8], mask: u32) -> Result<Decision> {
        if key_bytes.is_empty() {
            return Err(TrustError::MissingKey);
        }
        let key =
            PublicKey::from_jwk(key_bytes).map_err(|e| TrustError::MalformedKey(e.to_string()))?;

        self.check_public_key(namespace, &key, mask)
    }

    /// Same as [`check_key`](Self::check_key) for an already parsed key.
    pub fn check_public_key(&self, namespace: &str, key: &PublicKey, mask: u32) -> Result<Decision> {
        let mask = PermissionMask::requested(mask, self.config.default_mask)
            .map_err(|_| TrustError::InvalidMask(mask))?;
        let namespace =
            Namespace::new(namespace).map_err(|e| TrustError::InvalidNamespace(e.to_string()))?;

        // Hold the lock only long enough to take the snapshot; the graph
        // itself is immutable.
        let (graph, watermark) = {
            let state = self.read_state();
            (state.graph.clone(), state.watermark)
        };

        let decision = match graph {
            None => Decision::NoGraph,
            Some(graph) => {
                let now = self.clock.now_millis();
                if !graph.verify_at(&key.key_id(), &namespace, mask, now) {
                    Decision::Denied
                } else if now >= watermark {
                    Decision::Expired
                } else {
                    Decision::Granted
                }
            }
        };

        if !decision.is_granted() {
            tracing::debug!(
                key = %key.key_id(),
                namespace = %namespace,
                mask = mask.bits(),
                %decision,
                "key not verified"
            );
        }

        Ok(decision)
    }

    /// Lifecycle state at the current time.
    pub fn status(&self) -> StoreStatus {
        let state = self.read_state();
        match state.graph {
            None => StoreStatus::Uninitialized,
            Some(_) if self.clock.now_millis() >= state.watermark => StoreStatus::Stale,
            Some(_) => StoreStatus::Fresh,
        }
    }

    /// The watermark of the loaded graph, if any.
    pub fn watermark(&self) -> Option<i64> {
        let state = self.read_state();
        state.graph.as_ref().map(|_| state.watermark)
    }

    /// The loaded graph, if any.
    pub fn snapshot(&self) -> Option<Arc<GrantGraph>> {
        self.read_state().graph.clone()
    }

    /// The loaded graph together with its watermark, read atomically.
    pub fn snapshot_with_watermark(&self) -> Option<(Arc<GrantGraph>, i64)> {
        let state = self.read_state();
        state.graph.clone().map(|graph| (graph, state.watermark))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Refresh Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch a new graph from the source and install it.
    ///
    /// Never reports failure to the caller: on fetch error, validation error
    /// or timeout the previous graph and watermark stay in place and the
    /// failure is logged. Dropping the future before it completes leaves the
    /// store untouched.
    ///
    /// Overlapping calls run one after another, so a slow fetch can never
    /// install its graph over one fetched after it.
    pub async fn update_base(&self) {
        let _refresh = self.refresh.lock().await;
        let source = self.source.describe();

        let fetched = tokio::time::timeout(self.config.fetch_timeout, self.source.fetch()).await;
        let snapshot = match fetched {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                tracing::warn!(%source, error = %e, "trust graph refresh failed, keeping previous graph");
                return;
            }
            Err(_) => {
                tracing::warn!(
                    %source,
                    timeout_ms = self.config.fetch_timeout.as_millis() as u64,
                    "trust graph refresh timed out, keeping previous graph"
                );
                return;
            }
        };

        let statements = snapshot.graph.len();
        let watermark = snapshot.watermark;
        self.install(snapshot);

        if watermark <= self.clock.now_millis() {
            tracing::warn!(%source, watermark, "installed trust graph is already past its watermark");
        }
        tracing::info!(%source, statements, watermark, "trust graph refreshed");
    }

    /// Replace graph and watermark with an already validated snapshot.
    pub fn install(&self, snapshot: Snapshot) {
        let graph = Arc::new(snapshot.graph);
        let mut state = self.write_state();
        state.graph = Some(graph);
        state.watermark = snapshot.watermark;
    }

    // The state is only ever replaced whole, so a poisoned lock still holds a
    // consistent value.
    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
