//! Ingest scheduler
//!
//! A run has three steps. [`enumerate`] walks the partner store and
//! classifies every listed object into a [`Catalog`]. [`order`] sorts the
//! catalog by priority tuple. [`Scheduler::dispatch`] hands each loadable
//! file to the [`Loader`] and records the outcome in the file ledger.
//!
//! Files are grouped by their first priority. Groups may run side by side
//! up to `file_buffer_size`; files inside a group always load one after the
//! other in sorted order, and nothing after a failed file is loaded.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};
use uuid::{uuid, Uuid};

use datapipe_common::{Code, ErrorContext, Result, ResultExt};

use crate::config::IngestConfig;
use crate::db::data_files::{self, FileStatus, NewDataFileObject};
use crate::loader::{LoadSummary, Loader};
use crate::partners::{DataFileEntry, Partner};
use crate::request::Request;
use crate::storage::{clean_path, Backend};

/// Directory bookkeeping used while walking
#[async_trait]
pub trait DirectoryLedger: Send + Sync {
    /// Track the directory at `path` and return its id, or `None` when it
    /// is already finished and must not be walked.
    async fn open(&self, partner_id: Uuid, parent_id: Option<Uuid>, path: &str, name: &str) -> Result<Option<Uuid>>;
}

/// [`DirectoryLedger`] backed by `data_file_directories`
#[derive(Debug, Clone)]
pub struct RequestLedger {
    request: Request,
    key: String,
}

impl RequestLedger {
    pub fn new(request: Request, key: impl Into<String>) -> Self {
        Self {
            request,
            key: key.into(),
        }
    }
}

#[async_trait]
impl DirectoryLedger for RequestLedger {
    async fn open(&self, partner_id: Uuid, parent_id: Option<Uuid>, path: &str, name: &str) -> Result<Option<Uuid>> {
        self.request.check_canceled()?;
        let directory = data_files::ensure_directory(&self.request, &self.key, partner_id, parent_id, path, name)
            .await
            .forward(uuid!("b707d048-69ac-41b4-974d-0fb2f71fb6c6"))?;

        if directory.status().is_some_and(FileStatus::is_final) {
            return Ok(None);
        }
        Ok(Some(directory.id))
    }
}

/// A classified object and the tracked directory it was listed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub entry: DataFileEntry,
    pub directory_id: Option<Uuid>,
}

impl CatalogEntry {
    /// Files that dispatch hands to the loader
    pub fn is_loadable(&self) -> bool {
        !self.entry.ignore && !self.entry.object.is_directory && self.entry.file_type.is_some()
    }
}

/// A walked directory whose name carried a file type. It is finished once
/// every file below it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDirectory {
    pub id: Uuid,
    pub path: String,
}

/// Result of a walk, ignored entries included
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub typed_directories: Vec<TypedDirectory>,
}

impl Catalog {
    pub fn loadable(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_loadable())
    }
}

/// What a directory passes down to the objects listed in it
#[derive(Debug, Clone, Default)]
struct Inherited {
    directory_id: Uuid,
    file_type: Option<i32>,
    priorities: Vec<i32>,
    ignore_sub_dirs: bool,
}

/// Walk the store of `partner` from its root.
#[instrument(skip_all, fields(partner = partner.name(), root = partner.root()))]
pub async fn enumerate(
    partner: &dyn Partner,
    backend: &dyn Backend,
    ledger: &dyn DirectoryLedger,
) -> Result<Catalog> {
    let root = clean_path(partner.root());
    let name = root.rsplit('/').next().unwrap_or_default().to_string();

    let mut catalog = Catalog::default();
    let Some(root_id) = ledger.open(partner.id(), None, &root, &name).await? else {
        info!("Root directory already finished");
        return Ok(catalog);
    };

    let inherited = Inherited {
        directory_id: root_id,
        ..Default::default()
    };
    walk(partner, backend, ledger, root, inherited, &mut catalog).await?;

    info!(
        entries = catalog.entries.len(),
        loadable = catalog.loadable().count(),
        "Enumerated partner store"
    );
    Ok(catalog)
}

fn walk<'a>(
    partner: &'a dyn Partner,
    backend: &'a dyn Backend,
    ledger: &'a dyn DirectoryLedger,
    dir: String,
    parent: Inherited,
    catalog: &'a mut Catalog,
) -> BoxFuture<'a, Result<()>> {
    Box::pin(async move {
        let objects = backend
            .list(&dir)
            .await
            .site(uuid!("7bc88c7a-62f3-4057-be5c-9140ce3ae4b7"), Code::Unknown, "Failed to list directory.")
            .map_err(|e| e.with_meta("dir", dir.as_str()))?;

        for object in objects {
            let path = object.path();
            let mut entry = partner
                .classify(&path, &object)
                .map_err(|e| e.forward(uuid!("7ea4b7fb-1947-421b-9292-58424c61f48c")).with_meta("path", path.as_str()))?;

            if object.is_directory {
                let descend = !entry.ignore && (entry.enter_directory || !parent.ignore_sub_dirs);
                catalog.entries.push(CatalogEntry {
                    entry: entry.clone(),
                    directory_id: Some(parent.directory_id),
                });
                if !descend {
                    continue;
                }

                let Some(id) = ledger
                    .open(partner.id(), Some(parent.directory_id), &path, &object.name)
                    .await
                    .forward(uuid!("c72bb53d-ea16-499f-8c41-be04f4b7a788"))?
                else {
                    debug!(path = %path, "Skipping finished directory");
                    continue;
                };

                if entry.file_type.is_some() {
                    catalog.typed_directories.push(TypedDirectory {
                        id,
                        path: path.clone(),
                    });
                }

                let inherited = Inherited {
                    directory_id: id,
                    file_type: entry.file_type.or(parent.file_type),
                    priorities: if entry.priorities.is_empty() {
                        parent.priorities.clone()
                    } else {
                        entry.priorities
                    },
                    ignore_sub_dirs: entry.ignore_sub_dirs,
                };
                walk(partner, backend, ledger, path, inherited, catalog).await?;
                continue;
            }

            if entry.file_type.is_none() {
                entry.file_type = parent.file_type;
                if entry.priorities.is_empty() {
                    entry.priorities = parent.priorities.clone();
                }
            }

            let accepted = matches!(object.extension().as_deref(), Some("txt" | "zip"));
            if !accepted || entry.file_type.is_none() {
                debug!(path = %path, accepted, "Ignoring file");
                entry.ignore = true;
            }

            catalog.entries.push(CatalogEntry {
                entry,
                directory_id: Some(parent.directory_id),
            });
        }
        Ok(())
    })
}

/// Stable sort by priority tuple, lower first.
pub fn order(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| a.entry.priorities.cmp(&b.entry.priorities));
}

/// Split sorted loadable entries into runs sharing their first priority.
pub fn priority_groups(entries: &[CatalogEntry]) -> Vec<Vec<&CatalogEntry>> {
    let loadable: Vec<&CatalogEntry> = entries.iter().filter(|e| e.is_loadable()).collect();
    loadable
        .chunk_by(|a, b| a.entry.priorities.first() == b.entry.priorities.first())
        .map(<[&CatalogEntry]>::to_vec)
        .collect()
}

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    pub batch_size: usize,
    pub file_buffer_size: usize,
}

impl From<&IngestConfig> for SchedulerOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            file_buffer_size: config.file_buffer_size,
        }
    }
}

/// Totals of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub loaded_files: u64,
    pub skipped_files: u64,
    pub failed_files: u64,
    /// Files not attempted because an earlier file of their group failed
    pub held_files: u64,
    pub processed_records: u64,
    pub deleted_records: u64,
}

impl DispatchSummary {
    fn merge(&mut self, other: DispatchSummary) {
        self.loaded_files += other.loaded_files;
        self.skipped_files += other.skipped_files;
        self.failed_files += other.failed_files;
        self.held_files += other.held_files;
        self.processed_records += other.processed_records;
        self.deleted_records += other.deleted_records;
    }
}

enum FileOutcome {
    Loaded(LoadSummary),
    Skipped,
    Failed,
}

/// Process a group in order. The first failed file stops the group: later
/// files are held back so the failed one loads before them on the next run.
async fn drain_group<'a, F, Fut>(
    request: &Request,
    group: Vec<&'a CatalogEntry>,
    mut process: F,
) -> Result<(DispatchSummary, HashSet<Uuid>)>
where
    F: FnMut(&'a CatalogEntry) -> Fut,
    Fut: Future<Output = Result<FileOutcome>>,
{
    let mut summary = DispatchSummary::default();
    let mut unfinished = HashSet::new();
    let mut items = group.into_iter();

    while let Some(item) = items.next() {
        request.check_canceled()?;

        let failed = match process(item).await {
            Ok(FileOutcome::Loaded(loaded)) => {
                summary.loaded_files += 1;
                summary.processed_records += loaded.processed_records;
                summary.deleted_records += loaded.deleted_records;
                false
            },
            Ok(FileOutcome::Skipped) => {
                summary.skipped_files += 1;
                false
            },
            Ok(FileOutcome::Failed) => true,
            Err(e) if e.is(Code::Canceled) => return Err(e),
            Err(e) => {
                error!(path = %item.entry.path, error = %e, "Failed to track data file");
                true
            },
        };

        if failed {
            summary.failed_files += 1;
            unfinished.extend(item.directory_id);

            let held: Vec<&CatalogEntry> = items.by_ref().collect();
            if !held.is_empty() {
                warn!(
                    path = %item.entry.path,
                    held_files = held.len(),
                    "Holding back the rest of the priority group"
                );
            }
            summary.held_files += held.len() as u64;
            unfinished.extend(held.iter().filter_map(|h| h.directory_id));
            break;
        }
    }

    Ok((summary, unfinished))
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    request: Request,
    key: String,
    backend: Arc<dyn Backend>,
    loader: Loader,
    options: SchedulerOptions,
}

impl Scheduler {
    pub fn new(request: Request, key: impl Into<String>, backend: Arc<dyn Backend>, options: SchedulerOptions) -> Self {
        let key = key.into();
        let loader = Loader::new(request.clone(), key.clone(), backend.clone(), options.batch_size);
        Self {
            request,
            key,
            backend,
            loader,
            options,
        }
    }

    /// Walk, order and dispatch.
    #[instrument(skip_all, fields(partner = partner.name(), request_id = %self.request.id()))]
    pub async fn run(&self, partner: &dyn Partner) -> Result<DispatchSummary> {
        let ledger = RequestLedger::new(self.request.clone(), self.key.clone());
        let mut catalog = enumerate(partner, self.backend.as_ref(), &ledger)
            .await
            .forward(uuid!("0a7b11d9-0536-47ce-85eb-33261e372c08"))?;
        order(&mut catalog.entries);

        let summary = self.dispatch(partner, &catalog).await?;
        info!(
            loaded_files = summary.loaded_files,
            skipped_files = summary.skipped_files,
            failed_files = summary.failed_files,
            held_files = summary.held_files,
            processed_records = summary.processed_records,
            deleted_records = summary.deleted_records,
            "Ingest finished"
        );
        Ok(summary)
    }

    /// Load every loadable entry of an ordered catalog. Only cancellation
    /// stops a dispatch; a failed file stops its own group.
    pub async fn dispatch(&self, partner: &dyn Partner, catalog: &Catalog) -> Result<DispatchSummary> {
        let groups = priority_groups(&catalog.entries);
        debug!(groups = groups.len(), "Dispatching priority groups");

        let results: Vec<Result<(DispatchSummary, HashSet<Uuid>)>> = stream::iter(groups)
            .map(|group| self.run_group(partner, group))
            .buffered(self.options.file_buffer_size.max(1))
            .collect()
            .await;

        let mut summary = DispatchSummary::default();
        let mut unfinished = HashSet::new();
        for result in results {
            let (group_summary, group_unfinished) = result?;
            summary.merge(group_summary);
            unfinished.extend(group_unfinished);
        }

        for directory in &catalog.typed_directories {
            if unfinished.contains(&directory.id) {
                continue;
            }
            if let Err(e) =
                data_files::update_directory_status(&self.request, &self.key, directory.id, FileStatus::Done).await
            {
                warn!(path = %directory.path, error = %e, "Failed to mark directory done");
            }
        }

        Ok(summary)
    }

    /// Returns the group totals and the directories holding a failed or
    /// held back file.
    async fn run_group(
        &self,
        partner: &dyn Partner,
        group: Vec<&CatalogEntry>,
    ) -> Result<(DispatchSummary, HashSet<Uuid>)> {
        drain_group(&self.request, group, |item| self.process(partner, item)).await
    }

    async fn process(&self, partner: &dyn Partner, item: &CatalogEntry) -> Result<FileOutcome> {
        let entry = &item.entry;
        let Some(file_type) = entry.file_type else {
            return Ok(FileOutcome::Skipped);
        };

        let object = data_files::ensure_object(
            &self.request,
            &self.key,
            &NewDataFileObject {
                file_type,
                directory_id: item.directory_id,
                parent_file_id: None,
                file_dir: &entry.object.dir,
                file_name: &entry.object.name,
                file_size: i64::try_from(entry.object.size).unwrap_or(i64::MAX),
                priorities: &entry.priorities,
            },
        )
        .await
        .forward(uuid!("845fe931-ea81-4f9e-8d8a-a500a2657154"))?;

        if object.status().is_some_and(FileStatus::is_final) {
            debug!(path = %entry.path, "Skipping finished data file");
            return Ok(FileOutcome::Skipped);
        }

        if object.priorities != entry.priorities {
            data_files::update_object_priorities(&self.request, &self.key, object.id, &entry.priorities)
                .await
                .forward(uuid!("5752993e-eb87-4988-8ec3-8b359cfea3a7"))?;
        }

        info!(path = %entry.path, file_type, "Loading data file");

        match self.loader.load_object(partner, &object).await {
            Ok(loaded) => {
                data_files::update_object_status(&self.request, &self.key, object.id, FileStatus::Done, None)
                    .await
                    .forward(uuid!("6cb47afe-45c0-4940-ac8d-84c23ca9d973"))?;
                Ok(FileOutcome::Loaded(loaded))
            },
            // Left in progress so the next run resumes it.
            Err(e) if e.is(Code::Canceled) => Err(e),
            Err(e) => {
                error!(path = %entry.path, error = %e, "Failed to load data file");
                let meta = json!({ "error": e.to_json() });
                data_files::update_object_status(&self.request, &self.key, object.id, FileStatus::Failed, Some(meta))
                    .await
                    .forward(uuid!("f84b60b4-e466-49c7-aa27-1e144eb08bbd"))?;
                Ok(FileOutcome::Failed)
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::storage::StorageObject;

    fn file(dir: &str, name: &str, priorities: Vec<i32>) -> CatalogEntry {
        let object = StorageObject::file(dir, name, 1);
        let mut entry = DataFileEntry::new(object.path(), &object);
        entry.file_type = Some(1);
        entry.priorities = priorities;
        CatalogEntry {
            entry,
            directory_id: None,
        }
    }

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.entry.object.name.as_str()).collect()
    }

    #[test]
    fn test_order_is_stable_and_lexicographic() {
        let mut entries = vec![
            file("/ftp", "c.zip", vec![9, 2]),
            file("/ftp", "a.zip", vec![1]),
            file("/ftp", "b.zip", vec![9, 1, 5]),
            file("/ftp", "d.zip", vec![9, 1, 5]),
            file("/ftp", "e.zip", vec![9]),
        ];
        order(&mut entries);
        assert_eq!(names(&entries), vec!["a.zip", "e.zip", "b.zip", "d.zip", "c.zip"]);
    }

    #[test]
    fn test_priority_groups_skip_ignored() {
        let mut ignored = file("/ftp", "x.zip", vec![1]);
        ignored.entry.ignore = true;

        let mut entries = vec![
            file("/ftp", "a.zip", vec![1, 1]),
            ignored,
            file("/ftp", "b.zip", vec![1, 2]),
            file("/ftp", "c.zip", vec![2]),
        ];
        order(&mut entries);

        let groups = priority_groups(&entries);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0][0].entry.object.name, "a.zip");
        assert_eq!(groups[1][0].entry.object.name, "c.zip");
    }

    #[test]
    fn test_directories_are_not_loadable() {
        let object = StorageObject::directory("/ftp", "20250403_Update");
        let mut entry = DataFileEntry::new(object.path(), &object);
        entry.file_type = Some(1);
        let item = CatalogEntry {
            entry,
            directory_id: None,
        };
        assert!(!item.is_loadable());
    }

    fn outcome_for(name: &str) -> Result<FileOutcome> {
        match name {
            "bad.zip" => Ok(FileOutcome::Failed),
            "untracked.zip" => Err(datapipe_common::Error::unknown(
                uuid!("5d0c1a51-6f0e-4f63-9d3c-8b7a31e0a6c4"),
                "Failed to execute query.",
            )),
            "done.zip" => Ok(FileOutcome::Skipped),
            _ => Ok(FileOutcome::Loaded(LoadSummary {
                processed_records: 2,
                deleted_records: 1,
            })),
        }
    }

    #[tokio::test]
    async fn test_failed_file_holds_back_the_rest_of_its_group() {
        let request = Request::builder().build();
        let held_dir = Uuid::now_v7();

        let mut entries = vec![
            file("/ftp", "done.zip", vec![1, 1]),
            file("/ftp", "ok.zip", vec![1, 2]),
            file("/ftp", "bad.zip", vec![1, 3]),
            file("/ftp", "later.zip", vec![1, 4]),
        ];
        entries[3].directory_id = Some(held_dir);

        let mut attempted = Vec::new();
        let group: Vec<&CatalogEntry> = entries.iter().collect();
        let (summary, unfinished) = drain_group(&request, group, |item| {
            attempted.push(item.entry.object.name.clone());
            let outcome = outcome_for(&item.entry.object.name);
            async move { outcome }
        })
        .await
        .unwrap();

        assert_eq!(attempted, vec!["done.zip", "ok.zip", "bad.zip"]);
        assert_eq!(summary.skipped_files, 1);
        assert_eq!(summary.loaded_files, 1);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.held_files, 1);
        assert_eq!(summary.processed_records, 2);
        assert!(unfinished.contains(&held_dir));
    }

    #[tokio::test]
    async fn test_tracking_error_also_stops_the_group() {
        let request = Request::builder().build();
        let entries = vec![
            file("/ftp", "untracked.zip", vec![4, 1]),
            file("/ftp", "ok.zip", vec![4, 2]),
        ];

        let group: Vec<&CatalogEntry> = entries.iter().collect();
        let (summary, _) = drain_group(&request, group, |item| {
            let outcome = outcome_for(&item.entry.object.name);
            async move { outcome }
        })
        .await
        .unwrap();

        assert_eq!(summary.loaded_files, 0);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.held_files, 1);
    }

    #[tokio::test]
    async fn test_canceled_group_returns_canceled() {
        let request = Request::builder().build();
        request.cancel_token().cancel();
        let entries = vec![file("/ftp", "ok.zip", vec![1])];

        let group: Vec<&CatalogEntry> = entries.iter().collect();
        let err = drain_group(&request, group, |item| {
            let outcome = outcome_for(&item.entry.object.name);
            async move { outcome }
        })
        .await
        .unwrap_err();
        assert!(err.is(Code::Canceled));
    }
}
