//! Error types for upstream sources.

use thiserror::Error;

use trustgraph_grants::GraphError;

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetched data did not form a valid graph.
    #[error("invalid graph: {0}")]
    Invalid(#[from] GraphError),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The source has nothing to serve or refused to serve it.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
