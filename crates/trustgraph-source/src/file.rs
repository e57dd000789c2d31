//! Bundle-file implementation of the GraphSource trait.
//!
//! Reads a bundle written by a trust collector to local disk. Files ending
//! in `.json` are decoded as JSON, everything else as CBOR. Reads happen on
//! the blocking pool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use trustgraph_grants::{GrantBundle, Snapshot};

use crate::error::{Result, SourceError};
use crate::traits::GraphSource;

/// Encoding of a bundle file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleFormat {
    Cbor,
    Json,
}

impl BundleFormat {
    /// Infer the format from a file extension.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => BundleFormat::Json,
            _ => BundleFormat::Cbor,
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<GrantBundle> {
        Ok(match self {
            BundleFormat::Cbor => GrantBundle::from_cbor(bytes)?,
            BundleFormat::Json => GrantBundle::from_json(bytes)?,
        })
    }

    fn encode(self, bundle: &GrantBundle) -> Result<Vec<u8>> {
        Ok(match self {
            BundleFormat::Cbor => bundle.to_cbor()?,
            BundleFormat::Json => bundle.to_json()?,
        })
    }
}

/// Source reading a bundle file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: BundleFormat,
}

impl FileSource {
    /// Read `path`, inferring the format from its extension.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = BundleFormat::for_path(&path);
        Self { path, format }
    }

    /// Read `path` with an explicit format.
    pub fn with_format(path: impl Into<PathBuf>, format: BundleFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// The bundle path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write a bundle so that a concurrent [`FileSource`] never reads a torn
/// file: the bytes go to a sibling temp file which is then renamed over
/// `path`.
pub fn write_bundle(path: &Path, bundle: &GrantBundle) -> Result<()> {
    let bytes = BundleFormat::for_path(path).encode(bundle)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl GraphSource for FileSource {
    async fn fetch(&self) -> Result<Snapshot> {
        let path = self.path.clone();
        let format = self.format;

        let bundle = tokio::task::spawn_blocking(move || {
            let bytes = std::fs::read(&path)?;
            format.decode(&bytes)
        })
        .await
        .map_err(|e| SourceError::Unavailable(format!("spawn_blocking failed: {}", e)))??;

        Ok(bundle.into_snapshot()?)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
