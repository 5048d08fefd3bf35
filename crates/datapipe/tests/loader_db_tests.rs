//! Ingest runs against PostGIS
//!
//! Requires Docker:
//!
//! ```bash
//! cargo test -p datapipe --test loader_db_tests -- --ignored --nocapture
//! ```

mod common;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use common::{write_zip, TestPostgres, TEST_POOL_KEY};
use datapipe::db::data_files::FileStatus;
use datapipe::partners::AttomData;
use datapipe::scheduler::{DispatchSummary, Scheduler, SchedulerOptions};
use datapipe::storage::LocalBackend;

const RENTAL_AVM_ZIP: &str = "ftp/ABODEMINE_RENTALAVM_0040.zip";

fn scheduler(db: &TestPostgres, store: &Path, batch_size: usize) -> Scheduler {
    Scheduler::new(
        db.request(),
        TEST_POOL_KEY,
        Arc::new(LocalBackend::new(store)),
        SchedulerOptions {
            batch_size,
            file_buffer_size: 2,
        },
    )
}

async fn ingest(db: &TestPostgres, store: &Path, batch_size: usize) -> DispatchSummary {
    let partner = AttomData::new("/ftp").unwrap();
    scheduler(db, store, batch_size).run(&partner).await.unwrap()
}

async fn count(db: &TestPostgres, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(db.pool()).await.unwrap()
}

/// Status, record count and meta of the tracked object named `name`.
async fn object(db: &TestPostgres, name: &str) -> (i32, i64, Option<Value>, Option<Uuid>) {
    sqlx::query_as("SELECT status, record_count, meta, parent_file_id FROM data_file_objects WHERE file_name = $1")
        .bind(name)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_archive_members_load_and_finish() {
    common::init_test_tracing();
    let db = TestPostgres::start().await.unwrap();
    let store = tempfile::tempdir().unwrap();

    write_zip(
        store.path(),
        RENTAL_AVM_ZIP,
        &[(
            "RENTALAVM.txt",
            b"[ATTOM ID]\tEstimatedRentalValue\n1\t1500\n2\t1700\n\n3\t\n".as_slice(),
        )],
    );

    let summary = ingest(&db, store.path(), 100).await;
    assert_eq!(summary.loaded_files, 1);
    assert_eq!(summary.failed_files, 0);
    assert_eq!(summary.processed_records, 3);

    assert_eq!(count(&db, "SELECT count(*) FROM ad_df_rental_avm").await, 3);
    assert_eq!(
        count(&db, "SELECT count(*) FROM ad_df_rental_avm WHERE estimated_rental_value IS NULL").await,
        1
    );

    let archive_id: Uuid = sqlx::query_scalar("SELECT id FROM data_file_objects WHERE file_name = $1")
        .bind("ABODEMINE_RENTALAVM_0040.zip")
        .fetch_one(db.pool())
        .await
        .unwrap();
    let (status, _, _, parent) = object(&db, "ABODEMINE_RENTALAVM_0040.zip").await;
    assert_eq!(status, FileStatus::Done.code());
    assert_eq!(parent, None);

    let (status, record_count, _, parent) = object(&db, "RENTALAVM.txt").await;
    assert_eq!(status, FileStatus::Done.code());
    assert_eq!(record_count, 3);
    assert_eq!(parent, Some(archive_id));

    // Finished files are not loaded twice.
    let again = ingest(&db, store.path(), 100).await;
    assert_eq!(again.loaded_files, 0);
    assert_eq!(again.skipped_files, 1);
    assert_eq!(count(&db, "SELECT count(*) FROM ad_df_rental_avm").await, 3);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_failed_member_resumes_after_committed_lines() {
    let db = TestPostgres::start().await.unwrap();
    let store = tempfile::tempdir().unwrap();

    write_zip(
        store.path(),
        RENTAL_AVM_ZIP,
        &[("RENTALAVM.txt", b"[ATTOM ID]\n1\n2\nx\n4\n".as_slice())],
    );

    let summary = ingest(&db, store.path(), 1).await;
    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.loaded_files, 0);

    let (status, record_count, meta, _) = object(&db, "RENTALAVM.txt").await;
    assert_eq!(status, FileStatus::Failed.code());
    assert_eq!(record_count, 2);
    assert!(meta.unwrap()["error"].is_object());

    let (status, _, meta, _) = object(&db, "ABODEMINE_RENTALAVM_0040.zip").await;
    assert_eq!(status, FileStatus::Failed.code());
    let chain = meta.unwrap()["error"].to_string();
    assert!(chain.contains(r#""member":"RENTALAVM.txt""#));
    assert_eq!(count(&db, "SELECT count(*) FROM ad_df_rental_avm").await, 2);

    // A corrected delivery picks up after the two committed lines.
    write_zip(
        store.path(),
        RENTAL_AVM_ZIP,
        &[("RENTALAVM.txt", b"[ATTOM ID]\n1\n2\n3\n4\n".as_slice())],
    );

    let summary = ingest(&db, store.path(), 1).await;
    assert_eq!(summary.loaded_files, 1);
    assert_eq!(summary.processed_records, 2);

    let (status, record_count, _, _) = object(&db, "RENTALAVM.txt").await;
    assert_eq!(status, FileStatus::Done.code());
    assert_eq!(record_count, 4);
    assert_eq!(count(&db, "SELECT count(*) FROM ad_df_rental_avm").await, 4);
    assert_eq!(count(&db, "SELECT count(DISTINCT attomid) FROM ad_df_rental_avm").await, 4);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_failed_release_holds_back_later_releases() {
    let db = TestPostgres::start().await.unwrap();
    let store = tempfile::tempdir().unwrap();

    write_zip(
        store.path(),
        RENTAL_AVM_ZIP,
        &[("RENTALAVM.txt", b"[ATTOM ID]\n1\nx\n".as_slice())],
    );
    write_zip(
        store.path(),
        "ftp/ABODEMINE_RENTALAVM_0041.zip",
        &[("RENTALAVM.txt", b"[ATTOM ID]\n1\n2\n".as_slice())],
    );

    let summary = ingest(&db, store.path(), 100).await;
    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.loaded_files, 0);
    assert_eq!(summary.held_files, 1);
    assert_eq!(
        count(&db, "SELECT count(*) FROM data_file_objects WHERE file_name = 'ABODEMINE_RENTALAVM_0041.zip'").await,
        0
    );

    // Once the older release is fixed both load, oldest first.
    write_zip(
        store.path(),
        RENTAL_AVM_ZIP,
        &[("RENTALAVM.txt", b"[ATTOM ID]\n1\n3\n".as_slice())],
    );

    let summary = ingest(&db, store.path(), 100).await;
    assert_eq!(summary.failed_files, 0);
    assert_eq!(summary.held_files, 0);
    assert_eq!(summary.loaded_files, 2);

    let (status, _, _, _) = object(&db, "ABODEMINE_RENTALAVM_0041.zip").await;
    assert_eq!(status, FileStatus::Done.code());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_assessor_updates_archive_and_deletes_soft_delete() {
    let db = TestPostgres::start().await.unwrap();
    let store = tempfile::tempdir().unwrap();

    write_zip(
        store.path(),
        "ftp/ABODEMINE_TAXASSESSOR_0250.zip",
        &[(
            "TAXASSESSOR.txt",
            b"[ATTOM ID]\tSitusCounty\n10\tLos Angeles\n11\tOrange\n".as_slice(),
        )],
    );
    write_zip(
        store.path(),
        "ftp/ABODEMINE_TAXASSESSOR_0251.zip",
        &[("TAXASSESSOR.txt", b"[ATTOM ID]\tSitusCounty\n10\tVentura\n".as_slice())],
    );
    write_zip(
        store.path(),
        "ftp/ABODEMINE_PROPERTYDELETES_0252.zip",
        &[("PROPERTYDELETES.txt", b"[ATTOM ID]\n11\n999\n".as_slice())],
    );

    let summary = ingest(&db, store.path(), 100).await;
    assert_eq!(summary.loaded_files, 3);
    assert_eq!(summary.failed_files, 0);
    assert_eq!(summary.processed_records, 5);
    // One archived assessor row plus one soft deleted property
    assert_eq!(summary.deleted_records, 2);

    assert_eq!(count(&db, "SELECT count(*) FROM ad_df_assessor").await, 2);
    assert_eq!(count(&db, "SELECT count(*) FROM ad_assessor_history").await, 1);
    assert_eq!(
        count(&db, "SELECT count(*) FROM ad_df_assessor WHERE am_deleted_at IS NOT NULL").await,
        1
    );

    let county: String = sqlx::query_scalar("SELECT situs_county FROM ad_df_assessor WHERE attomid = 10")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(county, "Ventura");

    let archived: String = sqlx::query_scalar("SELECT situs_county FROM ad_assessor_history WHERE attomid = 10")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(archived, "Los Angeles");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_directories_are_tracked_once() {
    let db = TestPostgres::start().await.unwrap();
    let store = tempfile::tempdir().unwrap();

    write_zip(
        store.path(),
        "ftp/Refresh/ABODEMINE_REFRESH_RECORDERDELETES_0002.zip",
        &[("RECORDERDELETES.txt", b"TransactionID\n5\n".as_slice())],
    );

    ingest(&db, store.path(), 100).await;
    ingest(&db, store.path(), 100).await;

    assert_eq!(count(&db, "SELECT count(*) FROM data_file_directories").await, 2);
    assert_eq!(
        count(
            &db,
            "SELECT count(*) FROM data_file_directories WHERE path = '/ftp/Refresh' AND parent_directory_id IS NOT NULL"
        )
        .await,
        1
    );
    // Neither the root nor Refresh carries a file type, so neither is finished.
    assert_eq!(
        count(&db, "SELECT count(*) FROM data_file_directories WHERE status = 300").await,
        0
    );
}
