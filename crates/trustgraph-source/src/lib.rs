//! # Trustgraph Source
//!
//! Upstream trust sources. A source fetches the current grant bundle from
//! wherever a trust collector put it and turns it into a validated
//! [`Snapshot`](trustgraph_grants::Snapshot) for the trust store.
//!
//! ## Key Types
//!
//! - [`GraphSource`] - The async fetch contract
//! - [`MemorySource`] - Serves a bundle held in memory; supports failure injection
//! - [`FileSource`] - Reads a CBOR or JSON bundle file
//! - [`SqliteSource`] - Reads the bundle a collector published to SQLite
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trustgraph_source::{GraphSource, SqliteSource};
//!
//! async fn example() {
//!     let source = SqliteSource::open("trust.db").unwrap();
//!     let snapshot = source.fetch().await.unwrap();
//!     println!("{} statements", snapshot.graph.len());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Validation at the edge**: `fetch` only returns graphs that passed
//!   statement validation; anything malformed is a [`SourceError`]
//! - **No retries**: a failed fetch is reported once; the store decides
//!   what a failure means

pub mod error;
pub mod file;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, SourceError};
pub use file::{write_bundle, BundleFormat, FileSource};
pub use memory::MemorySource;
pub use sqlite::SqliteSource;
pub use traits::GraphSource;
