//! Error types for trustgraph core primitives.

use thiserror::Error;

/// Errors raised while constructing core values from caller input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid namespace {namespace:?}: {reason}")]
    InvalidNamespace { namespace: String, reason: String },

    #[error("invalid permission mask {0:#x}: undefined bits set")]
    InvalidMask(u32),

    #[error("permission mask must not be empty")]
    EmptyMask,

    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("unsupported key type: {0}")]
    UnsupportedKey(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
