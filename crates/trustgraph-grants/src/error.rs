//! Error types for the grant graph.

use thiserror::Error;

use trustgraph_core::CoreError;

/// Errors that can occur while building or querying a grant graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A statement failed validation; the whole graph is rejected.
    #[error("invalid statement at index {index}: {reason}")]
    InvalidStatement { index: usize, reason: String },

    /// The bundle watermark is not a usable time.
    #[error("invalid watermark: {0}")]
    InvalidWatermark(i64),

    /// Query namespace is not a valid namespace.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Query mask is zero or uses undefined bits.
    #[error("invalid permission mask: {0:#x}")]
    InvalidMask(u32),

    /// Bundle version is not understood.
    #[error("unsupported bundle version: {0}")]
    UnsupportedVersion(u8),

    /// Bundle bytes could not be decoded.
    #[error("decoding error: {0}")]
    Decode(String),

    /// Bundle could not be encoded.
    #[error("encoding error: {0}")]
    Encode(String),

    /// Any other core error.
    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for GraphError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidMask(bits) => GraphError::InvalidMask(bits),
            CoreError::EmptyMask => GraphError::InvalidMask(0),
            CoreError::InvalidNamespace { namespace, reason } => {
                GraphError::InvalidNamespace(format!("{:?}: {}", namespace, reason))
            }
            other => GraphError::Core(other),
        }
    }
}

/// Result type for grant graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
