//! Error types for the trust store.
//!
//! Only caller mistakes are errors. A key that is not authorized is a
//! normal answer and comes back as a [`Decision`](crate::Decision).

use thiserror::Error;

/// Usage errors reported by [`TrustStore::check_key`](crate::TrustStore::check_key).
#[derive(Debug, Error)]
pub enum TrustError {
    /// No key bytes were supplied.
    #[error("missing key")]
    MissingKey,

    /// The key bytes are not a supported JWK.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// The requested mask uses undefined bits.
    #[error("invalid permission mask: {0:#x}")]
    InvalidMask(u32),

    /// The namespace is not a valid namespace.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
}

/// Result type for trust store operations.
pub type Result<T> = std::result::Result<T, TrustError>;
