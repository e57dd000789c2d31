//! The grant graph.
//!
//! A [`GrantGraph`] is an immutable, indexed set of validated grants. It is
//! built wholesale from upstream statements and answers one question:
//! does a key hold a permission mask over a namespace at a given time?
//!
//! ## Resolution
//!
//! To resolve a key over a target scope:
//!
//! 1. Take the key's grants whose scope covers the target and that are live.
//! 2. Keep anchors, and delegated grants whose issuer resolves (recursively,
//!    over the grant's own scope) to at least `permissions | DELEGATE`.
//! 3. The most specific scope wins; ties go to the latest `issued_at`; grants
//!    still tied contribute the union of their masks.
//!
//! A more specific grant therefore narrows a broader one: a key holding
//! `READ | WRITE` over `teamA` and only `READ` over `teamA/app` cannot write
//! to `teamA/app`.

use std::collections::HashMap;

use trustgraph_core::{Clock, KeyId, Namespace, PermissionMask, PublicKey, SystemClock};

use crate::error::{GraphError, Result};
use crate::grant::{Grant, GrantStatement, Scope};

/// Longest delegation chain followed from a grantee to an anchor.
pub const MAX_DELEGATION_DEPTH: usize = 16;

/// Immutable authorization snapshot.
#[derive(Debug, Default)]
pub struct GrantGraph {
    /// All grants, in upstream order.
    grants: Vec<Grant>,

    /// Index: grantee -> positions in `grants`.
    by_grantee: HashMap<KeyId, Vec<usize>>,
}

/// Rank of a candidate grant; compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    specificity: usize,
    issued_at: i64,
}

impl GrantGraph {
    /// An empty graph. Every query against it is denied.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and index a set of statements.
    ///
    /// Any invalid statement rejects the whole set, so a loaded graph never
    /// has to deal with malformed data at query time.
    pub fn new(statements: impl IntoIterator<Item = GrantStatement>) -> Result<Self> {
        let mut grants = Vec::new();
        let mut by_grantee: HashMap<KeyId, Vec<usize>> = HashMap::new();

        for (index, statement) in statements.into_iter().enumerate() {
            let grant = statement
                .validate()
                .map_err(|reason| GraphError::InvalidStatement { index, reason })?;

            by_grantee.entry(grant.grantee).or_default().push(grants.len());
            grants.push(grant);
        }

        Ok(Self { grants, by_grantee })
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether the graph holds no statements.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// All grants, in upstream order.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Grants naming `key` as grantee.
    pub fn grants_for(&self, key: &KeyId) -> Vec<&Grant> {
        self.by_grantee
            .get(key)
            .map(|ids| ids.iter().map(|&i| &self.grants[i]).collect())
            .unwrap_or_default()
    }

    /// Verify a key against raw caller input at the current wall-clock time.
    ///
    /// Errors only for caller misuse: an invalid namespace, or a mask that is
    /// zero or has undefined bits. "Not granted" is `Ok(false)`.
    pub fn verify(&self, key: &PublicKey, namespace: &str, mask: u32) -> Result<bool> {
        let namespace = Namespace::new(namespace)?;
        let mask = PermissionMask::granted(mask)?;
        Ok(self.verify_at(&key.key_id(), &namespace, mask, SystemClock.now_millis()))
    }

    /// Verify at an explicit time.
    ///
    /// An empty `mask` is never granted.
    pub fn verify_at(
        &self,
        key: &KeyId,
        namespace: &Namespace,
        mask: PermissionMask,
        now: i64,
    ) -> bool {
        if mask.is_empty() {
            return false;
        }
        self.effective_permissions_at(key, namespace, now)
            .contains(mask)
    }

    /// The mask resolution picks for `key` over `namespace` at `now`.
    ///
    /// Empty when nothing applies.
    pub fn effective_permissions_at(
        &self,
        key: &KeyId,
        namespace: &Namespace,
        now: i64,
    ) -> PermissionMask {
        let target = Scope::Subtree(namespace.clone());
        let mut walk = Walk {
            graph: self,
            now,
            chain: Vec::new(),
            memo: HashMap::new(),
        };
        walk.resolve(key, &target).mask
    }
}

/// What resolving one key produced, and what the answer depended on.
#[derive(Debug, Clone)]
struct Resolution {
    mask: PermissionMask,
    /// Keys expanded at or below this call.
    visited: Vec<KeyId>,
    /// Keys above this call that cut a cycle below it.
    cut_by: Vec<KeyId>,
}

impl Resolution {
    fn denied() -> Self {
        Self {
            mask: PermissionMask::empty(),
            visited: Vec::new(),
            cut_by: Vec::new(),
        }
    }

    /// Whether this answer holds for a walk whose chain is `chain`: every key
    /// that cut a cycle must still be on it, and no expanded key may be.
    fn holds_under(&self, chain: &[KeyId]) -> bool {
        self.cut_by.iter().all(|k| chain.contains(k))
            && !self.visited.iter().any(|k| chain.contains(k))
    }
}

/// State of one resolution walk.
///
/// Answers are memoized per `(key, scope, depth)` so that every issuer is
/// expanded once per context instead of once per statement naming it.
struct Walk<'g> {
    graph: &'g GrantGraph,
    now: i64,
    /// Keys currently being resolved, outermost first.
    chain: Vec<KeyId>,
    memo: HashMap<(KeyId, Scope, usize), Resolution>,
}

impl Walk<'_> {
    fn resolve(&mut self, key: &KeyId, target: &Scope) -> Resolution {
        if self.chain.contains(key) {
            return Resolution {
                cut_by: vec![*key],
                ..Resolution::denied()
            };
        }
        if self.chain.len() >= MAX_DELEGATION_DEPTH {
            return Resolution::denied();
        }

        let graph = self.graph;
        let Some(ids) = graph.by_grantee.get(key) else {
            return Resolution::denied();
        };

        let memo_key = (*key, target.clone(), self.chain.len());
        if let Some(known) = self.memo.get(&memo_key) {
            if known.holds_under(&self.chain) {
                return known.clone();
            }
        }

        self.chain.push(*key);

        let mut visited = vec![*key];
        let mut cut_by = Vec::new();
        let mut best: Option<(Rank, PermissionMask)> = None;
        for &id in ids {
            let grant = &graph.grants[id];

            if !grant.scope.covers_scope(target) || !grant.is_live(self.now) {
                continue;
            }

            if let Some(issuer) = &grant.issuer {
                let needed = grant.permissions | PermissionMask::DELEGATE;
                let held = self.resolve(issuer, &grant.scope);
                visited.extend_from_slice(&held.visited);
                cut_by.extend_from_slice(&held.cut_by);
                if !held.mask.contains(needed) {
                    continue;
                }
            }

            let rank = Rank {
                specificity: grant.scope.specificity(),
                issued_at: grant.issued_at,
            };

            best = match best {
                None => Some((rank, grant.permissions)),
                Some((current, _)) if rank > current => Some((rank, grant.permissions)),
                Some((current, mask)) if rank == current => {
                    Some((current, mask | grant.permissions))
                }
                keep => keep,
            };
        }

        self.chain.pop();

        visited.sort_unstable();
        visited.dedup();
        // A cycle closed on this key is part of its own answer.
        cut_by.retain(|k| k != key);
        cut_by.sort_unstable();
        cut_by.dedup();

        let resolution = Resolution {
            mask: best.map(|(_, mask)| mask).unwrap_or(PermissionMask::empty()),
            visited,
            cut_by,
        };
        self.memo.insert(memo_key, resolution.clone());
        resolution
    }
}
