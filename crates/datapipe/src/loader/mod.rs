//! Data file loader
//!
//! A loader turns one tracked [`DataFileObject`] into committed rows. The
//! file is read on a blocking thread (see [`reader`]) and every batch is
//! written in its own transaction together with the progress update of the
//! object, so `record_count` always equals the number of committed body
//! lines and an interrupted file resumes where it stopped.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use sqlx::{Postgres, QueryBuilder};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::uuid;

use datapipe_common::{Code, Error, ErrorContext, Result, ResultExt};

use crate::db::data_files::{self, DataFileObject, FileStatus, NewDataFileObject};
use crate::partners::Partner;
use crate::records::{push_insert, BatchOutcome, DataRecord, LoadParams, RecordKind};
use crate::request::Request;
use crate::storage::Backend;

pub mod reader;

pub use reader::{list_zip_members, read_batches, ReadPlan, Source, ZipMember};

/// Postgres accepts at most this many bind parameters per statement.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Records per batch for a record type with `columns` columns.
///
/// Inserts are capped by the bind parameter limit. Custom routines also bind
/// key arrays, so they give up one row in every `columns`. Deletes bind a
/// single array and only follow the configured size.
pub fn effective_batch_size(batch_size: usize, columns: usize, params: LoadParams) -> usize {
    let batch_size = batch_size.max(1);
    let columns = columns.max(1);
    let capped = batch_size.min(MAX_BIND_PARAMS / columns).max(1);

    match params {
        LoadParams::Insert => capped,
        LoadParams::Delete { .. } => batch_size,
        LoadParams::Custom(_) => capped.saturating_sub(capped.div_ceil(columns)).max(1),
    }
}

/// Totals of one loaded file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub processed_records: u64,
    pub deleted_records: u64,
}

impl LoadSummary {
    fn add(&mut self, outcome: BatchOutcome) {
        self.processed_records += outcome.processed;
        self.deleted_records += outcome.deleted;
    }

    fn merge(&mut self, other: LoadSummary) {
        self.processed_records += other.processed_records;
        self.deleted_records += other.deleted_records;
    }
}

#[derive(Debug, Clone)]
pub struct Loader {
    request: Request,
    key: String,
    backend: Arc<dyn Backend>,
    batch_size: usize,
}

impl Loader {
    pub fn new(request: Request, key: impl Into<String>, backend: Arc<dyn Backend>, batch_size: usize) -> Self {
        Self {
            request,
            key: key.into(),
            backend,
            batch_size,
        }
    }

    /// Load `object`. Status changes of the object itself are left to the
    /// caller; archive members are tracked and finished here.
    #[instrument(skip_all, fields(path = %object.path(), file_type = object.file_type))]
    pub async fn load_object(&self, partner: &dyn Partner, object: &DataFileObject) -> Result<LoadSummary> {
        let kind = partner.record_kind(object.file_type).ok_or_else(|| {
            Error::internal(
                uuid!("9ff2513a-8576-4ca6-85e1-7729bb1a31e6"),
                "No record type for file type.",
            )
            .with_meta("file_type", object.file_type)
        })?;

        let path = object.path();
        let local = self
            .request
            .guard(async {
                self.backend.fetch(&path).await.site(
                    uuid!("a365687d-a09b-48af-a4a2-469fdbc1bce0"),
                    Code::Unknown,
                    "Failed to fetch data file.",
                )
            })
            .await
            .map_err(|e| e.with_meta("path", path.as_str()))?;

        let extension = Path::new(&object.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("zip") => self
                .load_archive(partner.separator(), kind, object, local.path())
                .await
                .forward(uuid!("1c84047c-b02c-4388-ac3c-9cdb43f4fce4")),
            Some("txt") => {
                let source = Source::File(local.path().to_path_buf());
                self.load_source(source, partner.separator(), kind, object)
                    .await
                    .forward(uuid!("fb2a6ade-f5dc-45ed-abef-7a571dcab550"))
            },
            _ => Err(Error::invalid_argument(
                uuid!("79eadf23-d70d-46f3-9497-b93f47d2eb4c"),
                "Unsupported file format.",
            )
            .with_meta("path", path)),
        }
    }

    /// Each text member becomes a child object of the archive and is loaded
    /// in archive order. The first failing member stops the archive.
    async fn load_archive(
        &self,
        separator: char,
        kind: RecordKind,
        object: &DataFileObject,
        archive: &Path,
    ) -> Result<LoadSummary> {
        let members = tokio::task::spawn_blocking({
            let archive = archive.to_path_buf();
            move || list_zip_members(&archive)
        })
        .await
        .site(uuid!("72ea45ef-9d46-4415-8453-40dc584eb627"), Code::Internal, "Archive task failed.")??;

        debug!(members = members.len(), "Listed archive");

        let archive_path = object.path();
        let mut summary = LoadSummary::default();

        for member in members {
            self.request.check_canceled()?;

            let child = data_files::ensure_object(
                &self.request,
                &self.key,
                &NewDataFileObject {
                    file_type: object.file_type,
                    directory_id: object.directory_id,
                    parent_file_id: Some(object.id),
                    file_dir: &archive_path,
                    file_name: &member.name,
                    file_size: i64::try_from(member.size).unwrap_or(i64::MAX),
                    priorities: &object.priorities,
                },
            )
            .await
            .forward(uuid!("4270c7c1-e980-4e37-85d3-3e5e9297f01c"))?;

            if child.status().is_some_and(FileStatus::is_final) {
                debug!(member = %member.name, "Skipping finished archive member");
                continue;
            }

            let source = Source::ZipMember {
                archive: archive.to_path_buf(),
                index: member.index,
            };

            match self.load_source(source, separator, kind, &child).await {
                Ok(loaded) => {
                    summary.merge(loaded);
                    data_files::update_object_status(&self.request, &self.key, child.id, FileStatus::Done, None)
                        .await
                        .forward(uuid!("0e5ed7c9-7f66-46b5-b2ee-a347aea079f8"))?;
                },
                Err(e) => {
                    let meta = json!({ "error": e.to_json() });
                    if let Err(status_err) = data_files::update_object_status(
                        &self.request,
                        &self.key,
                        child.id,
                        FileStatus::Failed,
                        Some(meta),
                    )
                    .await
                    {
                        warn!(member = %member.name, error = %status_err, "Failed to mark archive member failed");
                    }
                    return Err(e.forward(uuid!("c2af64b4-23ed-44e2-a30d-c2d63c6f0785")).with_meta("member", member.name));
                },
            }
        }

        Ok(summary)
    }

    async fn load_source(
        &self,
        source: Source,
        separator: char,
        kind: RecordKind,
        object: &DataFileObject,
    ) -> Result<LoadSummary> {
        let columns = kind.columns();
        let params = kind.load_params();
        let plan = ReadPlan {
            kind,
            separator,
            skip: u64::try_from(object.record_count).unwrap_or_default(),
            batch_size: effective_batch_size(self.batch_size, columns.len(), params),
        };

        if plan.skip > 0 {
            info!(path = %object.path(), skip = plan.skip, "Resuming data file");
        }

        let (tx, mut rx) = mpsc::channel(1);
        let reader = tokio::task::spawn_blocking(move || read_batches(&source, &plan, &tx));

        let mut summary = LoadSummary::default();
        let committed: Result<()> = async {
            while let Some(mut batch) = self.request.guard(async { Ok(rx.recv().await) }).await? {
                let outcome = self
                    .commit_batch(object, kind, &columns, params, &mut batch)
                    .await
                    .forward(uuid!("83973fd7-3f5e-48a5-b6d9-f1934919b3a6"))?;
                summary.add(outcome);
            }
            Ok(())
        }
        .await;

        // Unblocks the reader when the committer stopped early.
        drop(rx);
        let read = reader
            .await
            .site(uuid!("abbac595-47a8-49c1-9c4c-b0f580a57ec2"), Code::Internal, "Reader task failed.")?;

        committed?;
        read.forward(uuid!("a784904e-a597-447a-ad2c-e16218a9c2cb"))?;

        info!(
            path = %object.path(),
            processed_records = summary.processed_records,
            deleted_records = summary.deleted_records,
            "Loaded data file"
        );
        Ok(summary)
    }

    /// One transaction: the batch DML and the progress update of `object`.
    async fn commit_batch(
        &self,
        object: &DataFileObject,
        kind: RecordKind,
        columns: &[&str],
        params: LoadParams,
        batch: &mut [DataRecord],
    ) -> Result<BatchOutcome> {
        let records = batch.len() as u64;
        let tx = self.request.begin(&self.key).await.forward(uuid!("44810965-19dd-44e9-8355-876d6bda9fbe"))?;

        let outcome = match params {
            LoadParams::Insert => {
                let mut builder = QueryBuilder::<Postgres>::new("");
                push_insert(&mut builder, kind.table(), columns, batch.iter_mut());
                tx.request()
                    .execute(&self.key, builder.build())
                    .await
                    .forward(uuid!("25fce9e3-8e83-47b4-b040-5e38146eee36"))?;
                BatchOutcome {
                    processed: records,
                    deleted: 0,
                }
            },
            LoadParams::Delete { key_column } => {
                let ids: Vec<i64> = batch.iter().filter_map(DataRecord::key).collect();
                let sql = format!(
                    "UPDATE {} SET am_deleted_at = now() WHERE {} = ANY($1) AND am_deleted_at IS NULL",
                    kind.table(),
                    key_column
                );
                let result = tx
                    .request()
                    .execute(&self.key, sqlx::query(&sql).bind(ids))
                    .await
                    .forward(uuid!("5983e9e3-51f1-42a2-bce1-19b6411d61fe"))?;
                BatchOutcome {
                    processed: records,
                    deleted: result.rows_affected(),
                }
            },
            LoadParams::Custom(load) => load(tx.request(), &self.key, batch)
                .await
                .forward(uuid!("4654c7cf-4c35-48e5-8fef-18420efc41fd"))?,
        };

        let record_count = data_files::increment_progress(
            tx.request(),
            &self.key,
            object.id,
            i64::try_from(records).unwrap_or(i64::MAX),
        )
        .await
        .forward(uuid!("3610052f-f4ac-4cb8-bcec-1fb6f1408d09"))?;

        tx.commit().await.forward(uuid!("cf2df4f8-f55c-4b2d-9d96-4e96d852baee"))?;
        debug!(records, record_count, "Committed batch");

        Ok(outcome)
    }
}
