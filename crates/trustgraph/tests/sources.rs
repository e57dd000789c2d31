//! Trust store backed by the persistent sources.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use trustgraph::core::ManualClock;
use trustgraph::source::{write_bundle, FileSource, SourceError, SqliteSource};
use trustgraph::{
    Decision, GraphSource, PermissionMask, Refresher, Snapshot, StoreConfig, StoreStatus,
    TrustStore,
};
use trustgraph_testkit::{GraphFixture, TestKey, HOUR, T0};

fn fixture(key: &TestKey) -> GraphFixture {
    GraphFixture::new(T0).anchor(key, "teamA/app", PermissionMask::READ, HOUR)
}

#[tokio::test]
async fn test_file_source_json_and_cbor() {
    let dir = tempfile::tempdir().unwrap();
    let k1 = TestKey::from_seed(1);

    for name in ["trust.json", "trust.cbor"] {
        let path = dir.path().join(name);
        write_bundle(&path, &fixture(&k1).bundle()).unwrap();

        let store = TrustStore::new(FileSource::new(&path), StoreConfig::default())
            .with_clock(ManualClock::new(T0));
        store.update_base().await;

        assert_eq!(store.status(), StoreStatus::Fresh);
        assert_eq!(
            store.check_key("teamA/app/db", &k1.jwk, 1).unwrap(),
            Decision::Granted
        );
    }
}

#[tokio::test]
async fn test_file_source_corrupt_file_keeps_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trust.json");
    let k1 = TestKey::from_seed(1);
    write_bundle(&path, &fixture(&k1).bundle()).unwrap();

    let store = TrustStore::new(FileSource::new(&path), StoreConfig::default())
        .with_clock(ManualClock::new(T0));
    store.update_base().await;

    std::fs::write(&path, b"{ not json").unwrap();
    store.update_base().await;
    assert_eq!(store.check_key("teamA/app", &k1.jwk, 1).unwrap(), Decision::Granted);

    std::fs::remove_file(&path).unwrap();
    store.update_base().await;
    assert_eq!(store.check_key("teamA/app", &k1.jwk, 1).unwrap(), Decision::Granted);
}

#[tokio::test]
async fn test_sqlite_source_with_refresher() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trust.db");
    let k1 = TestKey::from_seed(1);
    let k2 = TestKey::from_seed(2);

    let collector = SqliteSource::open(&path).unwrap();
    collector.publish_bundle(&fixture(&k1).bundle()).await.unwrap();

    let store = Arc::new(
        TrustStore::new(SqliteSource::open(&path).unwrap(), StoreConfig::default())
            .with_clock(ManualClock::new(T0)),
    );
    let handle = Refresher::spawn(store.clone(), Duration::from_secs(3600));

    assert!(handle.refresh_now().await);
    assert_eq!(store.check_key("teamA/app", &k1.jwk, 1).unwrap(), Decision::Granted);
    assert_eq!(store.check_key("teamA/app", &k2.jwk, 1).unwrap(), Decision::Denied);

    collector
        .publish_bundle(&fixture(&k2).watermark_in(2 * HOUR).bundle())
        .await
        .unwrap();
    assert!(handle.refresh_now().await);

    assert_eq!(store.watermark(), Some(T0 + 2 * HOUR));
    assert_eq!(store.check_key("teamA/app", &k1.jwk, 1).unwrap(), Decision::Denied);
    assert_eq!(store.check_key("teamA/app", &k2.jwk, 1).unwrap(), Decision::Granted);

    handle.shutdown().await;
}

/// A source that never answers.
struct Hanging;

#[async_trait]
impl GraphSource for Hanging {
    async fn fetch(&self) -> trustgraph::source::Result<Snapshot> {
        std::future::pending::<()>().await;
        Err(SourceError::Unavailable("unreachable".into()))
    }

    fn describe(&self) -> String {
        "hanging".to_string()
    }
}

#[tokio::test(start_paused = true)]
async fn test_hanging_source_times_out() {
    let store = TrustStore::new(
        Hanging,
        StoreConfig::default().with_fetch_timeout(Duration::from_secs(1)),
    );
    store.update_base().await;
    assert_eq!(store.status(), StoreStatus::Uninitialized);
}
