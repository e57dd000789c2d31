//! # Trustgraph Core
//!
//! Pure primitives for the trust-graph authorization cache: key identities,
//! namespaces, and permission masks.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over the values that authorization decisions are made from.
//!
//! ## Key Types
//!
//! - [`PublicKey`] - An Ed25519 verifying key parsed from a JWK
//! - [`KeyId`] - Stable fingerprint of a public key, the identity grants name
//! - [`Namespace`] - Hierarchical resource scope such as `teamA/app`
//! - [`PermissionMask`] - Bitset of allowed actions
//! - [`Clock`] - Source of evaluation time (Unix milliseconds)

pub mod clock;
pub mod crypto;
pub mod error;
pub mod jwk;
pub mod namespace;
pub mod permission;

pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{KeyId, Keypair, PublicKey};
pub use error::{CoreError, Result};
pub use jwk::Jwk;
pub use namespace::Namespace;
pub use permission::PermissionMask;
