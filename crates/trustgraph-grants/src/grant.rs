//! Grant statements.
//!
//! A statement grants a key a permission mask over a scope until an
//! expiration time. Statements arrive from upstream in wire form
//! ([`GrantStatement`]) and are validated into [`Grant`] when a graph is
//! built. A graph never holds an unvalidated statement.

use serde::{Deserialize, Serialize};
use std::fmt;

use trustgraph_core::{KeyId, Namespace, PermissionMask};

/// Text form of the wildcard scope.
pub const WILDCARD: &str = "*";

/// The set of namespaces a statement applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Every namespace.
    Wildcard,

    /// A namespace and everything below it.
    Subtree(Namespace),
}

impl Scope {
    /// Parse a scope pattern: `*`, `a/b`, or `a/b/*` (same as `a/b`).
    pub fn parse(raw: &str) -> trustgraph_core::Result<Self> {
        let trimmed = raw.trim_matches('/');
        if trimmed == WILDCARD {
            return Ok(Scope::Wildcard);
        }
        let base = trimmed.strip_suffix("/*").unwrap_or(trimmed);
        Ok(Scope::Subtree(Namespace::new(base)?))
    }

    /// Whether this scope applies to `namespace`.
    pub fn covers(&self, namespace: &Namespace) -> bool {
        match self {
            Scope::Wildcard => true,
            Scope::Subtree(root) => namespace.is_within(root),
        }
    }

    /// Whether every namespace in `other` is also in `self`.
    pub fn covers_scope(&self, other: &Scope) -> bool {
        match (self, other) {
            (Scope::Wildcard, _) => true,
            (Scope::Subtree(_), Scope::Wildcard) => false,
            (Scope::Subtree(root), Scope::Subtree(inner)) => inner.is_within(root),
        }
    }

    /// Higher is more specific. The wildcard is the least specific scope.
    pub fn specificity(&self) -> usize {
        match self {
            Scope::Wildcard => 0,
            Scope::Subtree(root) => root.depth(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Wildcard => f.write_str(WILDCARD),
            Scope::Subtree(root) => write!(f, "{}", root),
        }
    }
}

impl From<Namespace> for Scope {
    fn from(namespace: Namespace) -> Self {
        Scope::Subtree(namespace)
    }
}

/// Wire form of a grant statement.
///
/// Fields are kept raw so that a malformed upstream statement is reported
/// with its index instead of failing the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantStatement {
    /// The key receiving the permissions.
    pub grantee: KeyId,

    /// Scope pattern (`*`, `a/b`, `a/b/*`).
    pub scope: String,

    /// Raw permission bits.
    pub permissions: u32,

    /// When the statement was issued (Unix milliseconds).
    pub issued_at: i64,

    /// When the statement stops applying (Unix milliseconds, exclusive).
    pub expires_at: i64,

    /// Delegating key. `None` marks an anchor trusted by the graph directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<KeyId>,
}

impl GrantStatement {
    /// Create an anchor statement.
    pub fn new(
        grantee: KeyId,
        scope: impl Into<String>,
        permissions: PermissionMask,
        issued_at: i64,
        expires_at: i64,
    ) -> Self {
        Self {
            grantee,
            scope: scope.into(),
            permissions: permissions.bits(),
            issued_at,
            expires_at,
            issuer: None,
        }
    }

    /// Mark this statement as delegated by `issuer`.
    pub fn issued_by(mut self, issuer: KeyId) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Validate into a [`Grant`], describing the first problem found.
    pub fn validate(&self) -> Result<Grant, String> {
        if self.expires_at <= 0 {
            return Err(format!("expiration {} is not positive", self.expires_at));
        }
        if self.issued_at < 0 {
            return Err(format!("issue time {} is negative", self.issued_at));
        }
        if self.issued_at > self.expires_at {
            return Err(format!(
                "issued at {} after expiring at {}",
                self.issued_at, self.expires_at
            ));
        }
        if self.issuer == Some(self.grantee) {
            return Err("statement is issued by its own grantee".to_string());
        }

        let permissions = PermissionMask::granted(self.permissions).map_err(|e| e.to_string())?;
        let scope = Scope::parse(&self.scope).map_err(|e| e.to_string())?;

        Ok(Grant {
            grantee: self.grantee,
            scope,
            permissions,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            issuer: self.issuer,
        })
    }
}

/// A validated grant statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub grantee: KeyId,
    pub scope: Scope,
    pub permissions: PermissionMask,
    pub issued_at: i64,
    pub expires_at: i64,
    pub issuer: Option<KeyId>,
}

impl Grant {
    /// Whether the statement applies at `now`. The expiration is exclusive.
    pub fn is_live(&self, now: i64) -> bool {
        self.issued_at <= now && now < self.expires_at
    }

    /// Whether the statement is trusted without a delegation chain.
    pub fn is_anchor(&self) -> bool {
        self.issuer.is_none()
    }

    /// Convert back to wire form.
    pub fn to_statement(&self) -> GrantStatement {
        GrantStatement {
            grantee: self.grantee,
            scope: self.scope.to_string(),
            permissions: self.permissions.bits(),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            issuer: self.issuer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgraph_core::Keypair;

    fn ns(s: &str) -> Namespace {
        Namespace::new(s).unwrap()
    }

    #[test]
    fn test_scope_parse() {
        assert_eq!(Scope::parse("*").unwrap(), Scope::Wildcard);
        assert_eq!(Scope::parse("teamA/*").unwrap(), Scope::Subtree(ns("teamA")));
        assert_eq!(Scope::parse("/teamA/app").unwrap(), Scope::Subtree(ns("teamA/app")));
        assert!(Scope::parse("").is_err());
        assert!(Scope::parse("a/*/b").is_err());
    }

    #[test]
    fn test_scope_covers() {
        let team = Scope::parse("teamA").unwrap();
        assert!(team.covers(&ns("teamA/app")));
        assert!(!team.covers(&ns("teamB")));
        assert!(Scope::Wildcard.covers(&ns("anything/at/all")));

        assert!(team.covers_scope(&Scope::parse("teamA/app").unwrap()));
        assert!(!team.covers_scope(&Scope::Wildcard));
        assert!(Scope::Wildcard.covers_scope(&team));
    }

    #[test]
    fn test_scope_specificity_order() {
        let wildcard = Scope::Wildcard.specificity();
        let team = Scope::parse("teamA").unwrap().specificity();
        let app = Scope::parse("teamA/app").unwrap().specificity();
        assert!(wildcard < team && team < app);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let key = Keypair::generate().key_id();
        let stmt = GrantStatement::new(key, "teamA/app", PermissionMask::READ, 10, 20);
        let grant = stmt.validate().unwrap();

        assert!(grant.is_anchor());
        assert_eq!(grant.to_statement(), stmt);
    }

    #[test]
    fn test_validate_rejects_contradictions() {
        let key = Keypair::generate().key_id();
        let base = GrantStatement::new(key, "teamA", PermissionMask::READ, 10, 20);

        let mut zero_expiry = base.clone();
        zero_expiry.expires_at = 0;
        assert!(zero_expiry.validate().is_err());

        let mut backwards = base.clone();
        backwards.issued_at = 30;
        assert!(backwards.validate().is_err());

        let mut undefined_bits = base.clone();
        undefined_bits.permissions = 0x10;
        assert!(undefined_bits.validate().is_err());

        let mut empty_mask = base.clone();
        empty_mask.permissions = 0;
        assert!(empty_mask.validate().is_err());

        let mut bad_scope = base.clone();
        bad_scope.scope = "a//b".to_string();
        assert!(bad_scope.validate().is_err());

        assert!(base.clone().issued_by(key).validate().is_err());
    }

    #[test]
    fn test_liveness_window() {
        let key = Keypair::generate().key_id();
        let grant = GrantStatement::new(key, "teamA", PermissionMask::READ, 10, 20)
            .validate()
            .unwrap();

        assert!(!grant.is_live(9)); // Not yet issued
        assert!(grant.is_live(10));
        assert!(grant.is_live(19));
        assert!(!grant.is_live(20)); // Expiration is exclusive
    }
}
