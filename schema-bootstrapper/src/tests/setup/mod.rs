use crate::cli::database::mongodb::MongoDBCliArgs;
use crate::cli::SetupCmd;
use crate::core::client::database::constant::SCRAPED_DATA_COLLECTION;
use crate::core::client::database::{DatabaseClient, DatabaseError, MockDatabaseClient};
use crate::error::BootstrapperError;
use crate::setup::{bootstrap, bootstrap_within, setup, verify_indexes, Deadline};
use crate::tests::common::{named_index, server_indexes};
use assert_matches::assert_matches;
use async_trait::async_trait;
use mockall::Sequence;
use mongodb::bson::doc;
use mongodb::IndexModel;
use rstest::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing_test::traced_test;

fn connection_refused() -> DatabaseError {
    DatabaseError::ConnectionError("connection refused".to_string())
}

/// Tests for `bootstrap`.
/// Every step runs exactly once, in order: ping, drop, create indexes, read back.
#[rstest]
#[tokio::test]
#[traced_test]
async fn bootstrap_drops_before_creating_indexes(server_indexes: Vec<IndexModel>) {
    let mut client = MockDatabaseClient::new();
    let mut seq = Sequence::new();

    client.expect_ping().times(1).in_sequence(&mut seq).returning(|| Ok(()));
    client
        .expect_drop_collection()
        .withf(|collection| collection.to_string() == SCRAPED_DATA_COLLECTION)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    client
        .expect_create_indexes()
        .withf(|collection, indexes| collection.to_string() == SCRAPED_DATA_COLLECTION && indexes.len() == 6)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    client.expect_list_indexes().times(1).in_sequence(&mut seq).returning(move |_| Ok(server_indexes.clone()));
    client.expect_count_documents().times(1).in_sequence(&mut seq).returning(|_| Ok(0));

    let report = bootstrap(&client, SCRAPED_DATA_COLLECTION).await.unwrap();

    assert!(report.is_ok());
    assert_eq!(report.document_count, 0);
    assert!(logs_contain("Dropping collection"));
    assert!(logs_contain("Collection bootstrapped"));
}

/// An unreachable server must fail before anything destructive is attempted.
#[rstest]
#[tokio::test]
async fn bootstrap_fails_fast_when_unreachable() {
    let mut client = MockDatabaseClient::new();
    client.expect_ping().times(1).returning(|| Err(connection_refused()));
    client.expect_drop_collection().never();
    client.expect_create_indexes().never();

    let err = bootstrap(&client, SCRAPED_DATA_COLLECTION).await.unwrap_err();

    assert_matches!(err, BootstrapperError::DatabaseError(DatabaseError::ConnectionError(_)));
    assert!(err.left_collection_untouched());
    assert!(!err.is_partial());
}

#[rstest]
#[tokio::test]
async fn bootstrap_stops_when_drop_fails() {
    let mut client = MockDatabaseClient::new();
    client.expect_ping().returning(|| Ok(()));
    client.expect_drop_collection().times(1).returning(|_| Err(connection_refused()));
    client.expect_create_indexes().never();

    let err = bootstrap(&client, SCRAPED_DATA_COLLECTION).await.unwrap_err();

    assert_matches!(err, BootstrapperError::DatabaseError(_));
    assert!(!err.is_partial());
}

/// A conflict after the drop is reported as a partial bootstrap that still carries the conflict.
#[rstest]
#[tokio::test]
async fn bootstrap_reports_index_conflict_after_drop() {
    let mut client = MockDatabaseClient::new();
    client.expect_ping().returning(|| Ok(()));
    client.expect_drop_collection().returning(|_| Ok(()));
    client.expect_create_indexes().times(1).returning(|collection, _| {
        Err(DatabaseError::IndexConflict {
            collection: collection.to_string(),
            message: "Index already exists with a different name: by_url".to_string(),
        })
    });
    client.expect_list_indexes().never();

    let err = bootstrap(&client, SCRAPED_DATA_COLLECTION).await.unwrap_err();

    assert!(err.is_partial());
    assert_matches!(
        err,
        BootstrapperError::IndexCreationFailed { ref collection, source: DatabaseError::IndexConflict { .. } }
            if collection == SCRAPED_DATA_COLLECTION
    );
}

#[rstest]
#[tokio::test]
async fn bootstrap_detects_incomplete_index_set(mut server_indexes: Vec<IndexModel>) {
    // updated_at_1 never showed up
    server_indexes.pop();

    let mut client = MockDatabaseClient::new();
    client.expect_ping().returning(|| Ok(()));
    client.expect_drop_collection().returning(|_| Ok(()));
    client.expect_create_indexes().returning(|_, _| Ok(()));
    client.expect_list_indexes().returning(move |_| Ok(server_indexes.clone()));
    client.expect_count_documents().returning(|_| Ok(0));

    let err = bootstrap(&client, SCRAPED_DATA_COLLECTION).await.unwrap_err();

    assert!(err.is_partial());
    assert_matches!(err, BootstrapperError::PartialBootstrap { ref reason, .. } if reason.contains("updated_at_1"));
}

#[rstest]
#[tokio::test]
async fn bootstrap_reports_failed_read_back_as_partial() {
    let mut client = MockDatabaseClient::new();
    client.expect_ping().returning(|| Ok(()));
    client.expect_drop_collection().returning(|_| Ok(()));
    client.expect_create_indexes().returning(|_, _| Ok(()));
    client.expect_list_indexes().returning(|_| Err(connection_refused()));

    let err = bootstrap(&client, SCRAPED_DATA_COLLECTION).await.unwrap_err();

    assert_matches!(err, BootstrapperError::PartialBootstrap { .. });
}

/// Tests for `verify_indexes`.
#[rstest]
#[tokio::test]
async fn verify_indexes_accepts_expected_set(server_indexes: Vec<IndexModel>) {
    let mut client = MockDatabaseClient::new();
    client.expect_list_indexes().returning(move |_| Ok(server_indexes.clone()));
    client.expect_count_documents().returning(|_| Ok(42));

    let report = verify_indexes(&client, SCRAPED_DATA_COLLECTION).await.unwrap();

    assert!(report.is_ok());
    assert_eq!(report.document_count, 42);
}

#[rstest]
#[tokio::test]
async fn verify_indexes_reports_every_difference(mut server_indexes: Vec<IndexModel>) {
    // url_1 without its unique flag, no scraper_id_1, plus a stray index
    server_indexes[1] = named_index(doc! { "url": 1 }, "url_1", false);
    server_indexes.retain(|model| model.keys != doc! { "scraper_id": 1 });
    server_indexes.push(named_index(doc! { "title": 1 }, "title_1", false));

    let mut client = MockDatabaseClient::new();
    client.expect_list_indexes().returning(move |_| Ok(server_indexes.clone()));
    client.expect_count_documents().returning(|_| Ok(0));

    let report = verify_indexes(&client, SCRAPED_DATA_COLLECTION).await.unwrap();

    assert!(!report.is_ok());
    assert_eq!(report.mismatched, vec!["url_1".to_string()]);
    assert_eq!(report.missing, vec!["scraper_id_1".to_string()]);
    assert_eq!(report.unexpected, vec!["title_1".to_string()]);
}

#[rstest]
#[tokio::test]
async fn verify_indexes_on_missing_collection() {
    let mut client = MockDatabaseClient::new();
    client.expect_list_indexes().returning(|_| Ok(Vec::new()));
    client.expect_count_documents().returning(|_| Ok(0));

    let report = verify_indexes(&client, SCRAPED_DATA_COLLECTION).await.unwrap();

    assert_eq!(report.missing.len(), 6);
    assert!(report.unexpected.is_empty());
}

/// Client that answers immediately except for the calls configured as slow.
#[derive(Default)]
struct SlowClient {
    slow_ping: bool,
    slow_create_indexes: bool,
    dropped: AtomicBool,
}

impl SlowClient {
    async fn stall(slow: bool) {
        if slow {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    }
}

#[async_trait]
impl DatabaseClient for SlowClient {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Self::stall(self.slow_ping).await;
        Ok(())
    }

    async fn drop_collection(&self, _collection: &str) -> Result<(), DatabaseError> {
        self.dropped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn create_indexes(&self, _collection: &str, _indexes: Vec<IndexModel>) -> Result<(), DatabaseError> {
        Self::stall(self.slow_create_indexes).await;
        Ok(())
    }

    async fn list_indexes(&self, _collection: &str) -> Result<Vec<IndexModel>, DatabaseError> {
        Ok(server_indexes())
    }

    async fn count_documents(&self, _collection: &str) -> Result<u64, DatabaseError> {
        Ok(0)
    }
}

/// Running out of time once the collection is gone must be reported as partial.
#[rstest]
#[tokio::test]
async fn bootstrap_timing_out_after_drop_is_partial() {
    let client = SlowClient { slow_create_indexes: true, ..Default::default() };
    let deadline = Deadline::after(Duration::from_millis(200));

    let err = bootstrap_within(&client, SCRAPED_DATA_COLLECTION, Some(deadline)).await.unwrap_err();

    assert!(client.dropped.load(Ordering::SeqCst));
    assert!(err.is_partial());
    assert!(!err.left_collection_untouched());
    assert_matches!(err, BootstrapperError::PartialBootstrap { ref reason, .. } if reason.contains("timed out after drop"));
}

#[rstest]
#[tokio::test]
async fn bootstrap_timing_out_before_drop_is_a_timeout() {
    let client = SlowClient { slow_ping: true, ..Default::default() };
    let deadline = Deadline::after(Duration::from_millis(200));

    let err = bootstrap_within(&client, SCRAPED_DATA_COLLECTION, Some(deadline)).await.unwrap_err();

    assert!(!client.dropped.load(Ordering::SeqCst));
    assert!(!err.is_partial());
    assert_matches!(err, BootstrapperError::Timeout(budget) if budget == Duration::from_millis(200));
}

#[rstest]
#[tokio::test]
async fn bootstrap_within_generous_deadline_succeeds() {
    let client = SlowClient::default();

    let report =
        bootstrap_within(&client, SCRAPED_DATA_COLLECTION, Some(Deadline::after(Duration::from_secs(5)))).await.unwrap();

    assert!(report.is_ok());
}

fn unreachable_setup(timeout: Option<u64>) -> SetupCmd {
    SetupCmd {
        mongodb_args: MongoDBCliArgs {
            mongodb_connection_url: Some("mongodb://127.0.0.1:1".to_string()),
            mongodb_database_name: Some("crops".to_string()),
            connect_timeout_secs: 5,
        },
        collection: SCRAPED_DATA_COLLECTION.to_string(),
        timeout,
    }
}

/// The overall timeout also covers connecting, so a server that never answers ends in `Timeout`.
#[rstest]
#[tokio::test]
async fn setup_times_out_while_connecting() {
    let err = setup(&unreachable_setup(Some(1))).await.unwrap_err();

    assert_matches!(err, BootstrapperError::Timeout(budget) if budget == Duration::from_secs(1));
    assert!(!err.is_partial());
}

#[rstest]
#[tokio::test]
async fn setup_rejects_zero_timeout() {
    let err = setup(&unreachable_setup(Some(0))).await.unwrap_err();

    assert_matches!(err, BootstrapperError::ConfigError(_));
    assert!(err.left_collection_untouched());
}
