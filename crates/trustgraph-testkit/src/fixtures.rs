//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests: deterministic keys and
//! a builder for grant graphs pinned to a fixed point in time.

use trustgraph_core::{KeyId, Keypair, ManualClock, PermissionMask, PublicKey};
use trustgraph_grants::{GrantBundle, GrantGraph, GrantStatement};
use trustgraph_source::MemorySource;

/// Fixed reference time used across tests (Unix ms).
pub const T0: i64 = 1_700_000_000_000;

/// One minute in milliseconds.
pub const MINUTE: i64 = 60_000;

/// One hour in milliseconds.
pub const HOUR: i64 = 60 * MINUTE;

/// A key together with its serialized JWK form.
#[derive(Clone)]
pub struct TestKey {
    pub keypair: Keypair,
    pub public: PublicKey,
    pub jwk: Vec<u8>,
}

impl TestKey {
    /// Create a key with a random keypair.
    pub fn random() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Create a deterministic key from a one-byte seed.
    pub fn from_seed(seed: u8) -> Self {
        Self::from_keypair(Keypair::from_seed(&[seed; 32]))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        let public = keypair.public_key();
        let jwk = public.to_jwk();
        Self {
            keypair,
            public,
            jwk,
        }
    }

    /// The key's identifier.
    pub fn key_id(&self) -> KeyId {
        self.public.key_id()
    }
}

/// Create `count` distinct deterministic keys.
pub fn test_keys(count: usize) -> Vec<TestKey> {
    (0..count).map(|i| TestKey::from_seed(i as u8 + 1)).collect()
}

/// Builds grant bundles relative to a fixed "now".
///
/// Lifetimes passed to the builder methods are offsets from `now`.
#[derive(Debug, Clone)]
pub struct GraphFixture {
    pub now: i64,
    pub watermark: i64,
    pub statements: Vec<GrantStatement>,
}

impl GraphFixture {
    /// Start an empty graph at `now` with a watermark one hour later.
    pub fn new(now: i64) -> Self {
        Self {
            now,
            watermark: now + HOUR,
            statements: Vec::new(),
        }
    }

    /// Set the watermark as an offset from `now`.
    pub fn watermark_in(mut self, millis: i64) -> Self {
        self.watermark = self.now + millis;
        self
    }

    /// Add an anchor statement issued at `now`, live for `ttl` ms.
    pub fn anchor(mut self, key: &TestKey, scope: &str, mask: PermissionMask, ttl: i64) -> Self {
        self.statements.push(GrantStatement::new(
            key.key_id(),
            scope,
            mask,
            self.now,
            self.now + ttl,
        ));
        self
    }

    /// Add a statement delegated by `issuer`, issued at `now`, live for `ttl` ms.
    pub fn delegate(
        mut self,
        issuer: &TestKey,
        key: &TestKey,
        scope: &str,
        mask: PermissionMask,
        ttl: i64,
    ) -> Self {
        self.statements.push(
            GrantStatement::new(key.key_id(), scope, mask, self.now, self.now + ttl)
                .issued_by(issuer.key_id()),
        );
        self
    }

    /// Add an arbitrary statement.
    pub fn statement(mut self, statement: GrantStatement) -> Self {
        self.statements.push(statement);
        self
    }

    /// The bundle a collector would publish.
    pub fn bundle(&self) -> GrantBundle {
        GrantBundle::new(self.watermark, self.statements.clone())
    }

    /// The validated graph.
    ///
    /// # Panics
    ///
    /// Panics if a statement is invalid.
    pub fn graph(&self) -> GrantGraph {
        GrantGraph::new(self.statements.clone()).expect("fixture statements are valid")
    }

    /// A memory source serving this bundle.
    pub fn source(&self) -> MemorySource {
        MemorySource::with_bundle(self.bundle())
    }

    /// A manual clock reading `now`.
    pub fn clock(&self) -> ManualClock {
        ManualClock::new(self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgraph_core::{Clock, Namespace};
    use trustgraph_source::GraphSource;

    #[test]
    fn test_keys_are_distinct() {
        let keys = test_keys(3);
        assert_ne!(keys[0].key_id(), keys[1].key_id());
        assert_ne!(keys[1].key_id(), keys[2].key_id());
        assert_ne!(keys[0].key_id(), keys[2].key_id());
    }

    #[test]
    fn test_jwk_parses_back() {
        let key = TestKey::from_seed(7);
        let parsed = PublicKey::from_jwk(&key.jwk).unwrap();
        assert_eq!(parsed, key.public);
    }

    #[test]
    fn test_fixture_graph() {
        let keys = test_keys(2);
        let (root, dev) = (&keys[0], &keys[1]);
        let fixture = GraphFixture::new(T0)
            .anchor(root, "*", PermissionMask::all(), HOUR)
            .delegate(root, dev, "teamA", PermissionMask::READ, HOUR);

        let graph = fixture.graph();
        assert_eq!(graph.len(), 2);
        assert!(graph.verify_at(
            &dev.key_id(),
            &Namespace::new("teamA/app").unwrap(),
            PermissionMask::READ,
            fixture.clock().now_millis(),
        ));
    }

    #[tokio::test]
    async fn test_fixture_source() {
        let fixture = GraphFixture::new(T0).watermark_in(30 * MINUTE);
        let snapshot = fixture.source().fetch().await.unwrap();
        assert_eq!(snapshot.watermark, T0 + 30 * MINUTE);
        assert!(snapshot.graph.is_empty());
    }
}
