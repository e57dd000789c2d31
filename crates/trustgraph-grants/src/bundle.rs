//! Grant bundles: the unit an upstream trust collector delivers.
//!
//! A bundle carries the full statement set plus the watermark after which
//! the whole cache is considered stale. Bundles are encoded as CBOR for
//! transport and storage, or JSON where humans edit them.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::grant::GrantStatement;
use crate::graph::GrantGraph;

/// Current bundle format version.
pub const BUNDLE_VERSION: u8 = 1;

/// Serialized graph plus watermark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantBundle {
    /// Format version.
    pub version: u8,

    /// Watermark: Unix milliseconds after which the cache must not grant.
    pub expires_at: i64,

    /// The statements, in upstream order.
    pub statements: Vec<GrantStatement>,
}

/// A validated graph and its watermark, ready to install.
#[derive(Debug)]
pub struct Snapshot {
    pub graph: GrantGraph,
    pub watermark: i64,
}

impl GrantBundle {
    /// Create a bundle at the current format version.
    pub fn new(expires_at: i64, statements: Vec<GrantStatement>) -> Self {
        Self {
            version: BUNDLE_VERSION,
            expires_at,
            statements,
        }
    }

    /// Validate into a [`Snapshot`].
    pub fn into_snapshot(self) -> Result<Snapshot> {
        if self.version != BUNDLE_VERSION {
            return Err(GraphError::UnsupportedVersion(self.version));
        }
        if self.expires_at <= 0 {
            return Err(GraphError::InvalidWatermark(self.expires_at));
        }

        Ok(Snapshot {
            graph: GrantGraph::new(self.statements)?,
            watermark: self.expires_at,
        })
    }

    /// Serialize to CBOR bytes.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| GraphError::Encode(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| GraphError::Decode(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| GraphError::Encode(e.to_string()))
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| GraphError::Decode(e.to_string()))
    }
}
