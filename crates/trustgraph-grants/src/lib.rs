//! # Trustgraph Grants
//!
//! Grant statements and the immutable grant graph.
//!
//! ## Overview
//!
//! Authorization is expressed as statements: "key K holds mask M over scope
//! S until time T, issued by key I". A [`GrantGraph`] is the validated,
//! indexed set of statements from one upstream fetch. It is never edited;
//! a refresh builds a new graph and the old one is dropped.
//!
//! ## Key Concepts
//!
//! - **GrantStatement**: wire form of one statement, validated on load
//! - **Anchor**: a statement without an issuer, trusted directly
//! - **Delegation**: a statement whose issuer must itself hold
//!   `DELEGATE` plus the granted mask over the statement's scope
//! - **GrantBundle**: statements plus the cache watermark, as delivered
//!
//! ## Usage
//!
//! ```rust
//! use trustgraph_core::{Keypair, Namespace, PermissionMask};
//! use trustgraph_grants::{GrantGraph, GrantStatement};
//!
//! let key = Keypair::generate().key_id();
//! let graph = GrantGraph::new([GrantStatement::new(
//!     key,
//!     "teamA",
//!     PermissionMask::READ | PermissionMask::WRITE,
//!     0,
//!     i64::MAX,
//! )])
//! .unwrap();
//!
//! let app = Namespace::new("teamA/app").unwrap();
//! assert!(graph.verify_at(&key, &app, PermissionMask::READ, 1_000));
//! ```

pub mod bundle;
pub mod error;
pub mod grant;
pub mod graph;

pub use bundle::{GrantBundle, Snapshot, BUNDLE_VERSION};
pub use error::{GraphError, Result};
pub use grant::{Grant, GrantStatement, Scope};
pub use graph::{GrantGraph, MAX_DELEGATION_DEPTH};
