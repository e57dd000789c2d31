//! SQLite implementation of the GraphSource trait.
//!
//! A trust collector publishes bundles into the database; stores fetch from
//! it. Uses rusqlite with bundled SQLite, wrapped in async via
//! tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use trustgraph_core::{Clock, KeyId, SystemClock};
use trustgraph_grants::{GrantBundle, GrantStatement, Snapshot};

use crate::error::{Result, SourceError};
use crate::migration;
use crate::traits::GraphSource;

/// SQLite-backed source.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl SqliteSource {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let label = format!("sqlite:{}", path.as_ref().display());
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label,
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label: "sqlite::memory:".to_string(),
        })
    }

    /// Replace the published bundle in one transaction.
    ///
    /// A concurrent fetch sees either the previous bundle or this one.
    pub async fn publish_bundle(&self, bundle: &GrantBundle) -> Result<()> {
        let bundle = bundle.clone();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            let tx = conn.transaction()?;

            tx.execute("DELETE FROM grants", [])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO grants (grantee, scope, permissions, issued_at, expires_at, issuer)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for stmt in &bundle.statements {
                    insert.execute(params![
                        stmt.grantee.as_bytes().as_slice(),
                        stmt.scope,
                        stmt.permissions as i64,
                        stmt.issued_at,
                        stmt.expires_at,
                        stmt.issuer.as_ref().map(|k| k.as_bytes().as_slice()),
                    ])?;
                }
            }

            tx.execute(
                "INSERT INTO bundle_meta (id, version, expires_at, published_at)
                 VALUES (1, ?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    version = excluded.version,
                    expires_at = excluded.expires_at,
                    published_at = excluded.published_at",
                params![bundle.version, bundle.expires_at, SystemClock.now_millis()],
            )?;

            tx.commit()?;
            tracing::debug!(
                statements = bundle.statements.len(),
                watermark = bundle.expires_at,
                "published trust bundle"
            );
            Ok(())
        })
        .await
        .map_err(|e| SourceError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }

    /// Read the published bundle without validating it.
    pub async fn load_bundle(&self) -> Result<Option<GrantBundle>> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            // Read meta and rows from one snapshot of the database.
            let tx = conn.transaction()?;

            let meta: Option<(u8, i64)> = tx
                .query_row(
                    "SELECT version, expires_at FROM bundle_meta WHERE id = 1",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let Some((version, expires_at)) = meta else {
                return Ok(None);
            };

            let statements = {
                let mut select = tx.prepare(
                    "SELECT grantee, scope, permissions, issued_at, expires_at, issuer
                     FROM grants ORDER BY id",
                )?;
                let rows = select.query_map([], row_to_statement)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            };

            tx.commit()?;

            Ok(Some(GrantBundle {
                version,
                expires_at,
                statements,
            }))
        })
        .await
        .map_err(|e| SourceError::Unavailable(format!("spawn_blocking failed: {}", e)))?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| SourceError::Unavailable(format!("connection mutex poisoned: {}", e)))
}

fn key_id_column(row: &rusqlite::Row<'_>, idx: usize, name: &str) -> rusqlite::Result<KeyId> {
    let bytes: Vec<u8> = row.get(idx)?;
    let arr: [u8; 32] = bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(idx, name.into(), rusqlite::types::Type::Blob)
    })?;
    Ok(KeyId::from_bytes(arr))
}

// Helper to convert a row to a GrantStatement
fn row_to_statement(row: &rusqlite::Row<'_>) -> rusqlite::Result<GrantStatement> {
    let permissions: i64 = row.get(2)?;
    let issuer: Option<Vec<u8>> = row.get(5)?;

    Ok(GrantStatement {
        grantee: key_id_column(row, 0, "grantee")?,
        scope: row.get(1)?,
        // Out-of-range values become undefined bits and fail validation.
        permissions: u32::try_from(permissions).unwrap_or(u32::MAX),
        issued_at: row.get(3)?,
        expires_at: row.get(4)?,
        issuer: match issuer {
            Some(_) => Some(key_id_column(row, 5, "issuer")?),
            None => None,
        },
    })
}

#[async_trait]
impl GraphSource for SqliteSource {
    async fn fetch(&self) -> Result<Snapshot> {
        let bundle = self
            .load_bundle()
            .await?
            .ok_or_else(|| SourceError::Unavailable("no bundle published".into()))?;
        Ok(bundle.into_snapshot()?)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgraph_core::{Keypair, Namespace, PermissionMask};

    const T: i64 = 1_700_000_000_000;

    fn bundle() -> GrantBundle {
        let root = Keypair::from_seed(&[3; 32]).key_id();
        let dev = Keypair::from_seed(&[4; 32]).key_id();
        GrantBundle::new(
            T + 60_000,
            vec![
                GrantStatement::new(root, "*", PermissionMask::all(), T, T + 120_000),
                GrantStatement::new(dev, "teamA/app", PermissionMask::READ, T, T + 120_000)
                    .issued_by(root),
            ],
        )
    }

    #[tokio::test]
    async fn test_empty_database_is_unavailable() {
        let source = SqliteSource::open_memory().unwrap();
        assert!(source.load_bundle().await.unwrap().is_none());
        assert!(matches!(
            source.fetch().await,
            Err(SourceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_and_fetch() {
        let source = SqliteSource::open_memory().unwrap();
        source.publish_bundle(&bundle()).await.unwrap();

        assert_eq!(source.load_bundle().await.unwrap(), Some(bundle()));

        let snapshot = source.fetch().await.unwrap();
        let dev = Keypair::from_seed(&[4; 32]).key_id();
        assert_eq!(snapshot.watermark, T + 60_000);
        assert!(snapshot.graph.verify_at(
            &dev,
            &Namespace::new("teamA/app").unwrap(),
            PermissionMask::READ,
            T
        ));
    }

    #[tokio::test]
    async fn test_publish_replaces_previous_bundle() {
        let source = SqliteSource::open_memory().unwrap();
        source.publish_bundle(&bundle()).await.unwrap();

        let only = GrantBundle::new(T + 1, vec![]);
        source.publish_bundle(&only).await.unwrap();

        let snapshot = source.fetch().await.unwrap();
        assert!(snapshot.graph.is_empty());
        assert_eq!(snapshot.watermark, T + 1);
    }

    #[tokio::test]
    async fn test_invalid_rows_fail_validation() {
        let source = SqliteSource::open_memory().unwrap();
        let mut bad = bundle();
        bad.statements[1].permissions = 0x80;
        source.publish_bundle(&bad).await.unwrap();

        assert!(matches!(source.fetch().await, Err(SourceError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trust.db");

        {
            let source = SqliteSource::open(&path).unwrap();
            source.publish_bundle(&bundle()).await.unwrap();
        }

        let source = SqliteSource::open(&path).unwrap();
        assert_eq!(source.fetch().await.unwrap().graph.len(), 2);
        assert!(source.describe().starts_with("sqlite:"));
    }
}
