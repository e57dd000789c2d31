//! # Trustgraph
//!
//! A local authorization cache over a trust graph. A collector publishes
//! grant statements saying which keys may act within which namespaces; the
//! [`TrustStore`] keeps the latest graph in memory and answers
//! "may this key do this here?" without touching the network.
//!
//! ## Overview
//!
//! - **Checks** ([`TrustStore::check_key`]) are synchronous and read-only
//! - **Refreshes** ([`TrustStore::update_base`]) fetch from a
//!   [`GraphSource`] and never fail; the last good graph stays in place
//! - **Watermark**: every graph carries a deadline after which all checks
//!   answer [`Decision::Expired`] until a fresher graph arrives
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trustgraph::{Refresher, StoreConfig, TrustStore};
//! use trustgraph::source::SqliteSource;
//!
//! async fn example(jwk: &[u8]) {
//!     let source = SqliteSource::open("trust.db").unwrap();
//!     let store = Arc::new(TrustStore::new(source, StoreConfig::default()));
//!
//!     // Load once, then keep refreshing in the background.
//!     let refresher = Refresher::spawn_with_config(store.clone());
//!
//!     let decision = store.check_key("teamA/app", jwk, 0).unwrap();
//!     println!("{}", decision);
//!
//!     refresher.shutdown().await;
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `trustgraph::core` - Keys, namespaces, permission masks, clocks
//! - `trustgraph::grants` - Grant statements, the grant graph, bundles
//! - `trustgraph::source` - Upstream sources (memory, file, SQLite)

pub mod error;
pub mod refresh;
pub mod store;

// Re-export component crates
pub use trustgraph_core as core;
pub use trustgraph_grants as grants;
pub use trustgraph_source as source;

// Re-export main types for convenience
pub use error::{Result, TrustError};
pub use refresh::{RefreshHandle, Refresher};
pub use store::{Decision, StoreConfig, StoreStatus, TrustStore};

// Re-export commonly used types
pub use trustgraph_core::{Keypair, Namespace, PermissionMask, PublicKey};
pub use trustgraph_grants::{GrantBundle, GrantGraph, GrantStatement, Snapshot};
pub use trustgraph_source::GraphSource;
