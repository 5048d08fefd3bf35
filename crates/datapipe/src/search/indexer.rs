//! Address indexer
//!
//! Mirrors `addresses` into the search cluster one FIPS code at a time. A
//! pass works against a single target index: the index currently behind the
//! alias when its mapping matches [`AddressDocument`], otherwise a fresh
//! `<alias>_<timestamp>` index that replaces every older one once all FIPS
//! codes are done. Progress per FIPS code lives in the status index so an
//! interrupted pass resumes with the codes it did not finish.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};
use uuid::{uuid, Uuid};

use datapipe_common::{Code, Error, ErrorContext, Result, ResultExt};

use super::client::{push_bulk_index, SearchClient};
use super::document::{mappings_equal, AddressDocument, FipsProcessingStatus, FIPS_STATUS_INDEX};
use super::format::{format_address_text, state_full_name};
use crate::config::IndexConfig;
use crate::request::Request;

/// Backoff for rate limited bulk requests: `base * 2^(attempt - 1)`, capped.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl RetryPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base.saturating_mul(factor).min(self.cap)
    }
}

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub alias: String,
    pub batch_size: usize,
    pub zip5: Option<String>,
    pub fips: Option<String>,
    pub recency_window: chrono::Duration,
    pub outer_parallelism: usize,
    pub inner_parallelism: usize,
    pub retry: RetryPolicy,
}

impl From<&IndexConfig> for IndexOptions {
    fn from(config: &IndexConfig) -> Self {
        Self {
            alias: config.alias.clone(),
            batch_size: config.batch_size.max(crate::config::MIN_INDEX_BATCH_SIZE),
            zip5: config.zip5.clone(),
            fips: config.fips.clone(),
            recency_window: chrono::Duration::hours(config.recency_window_hours),
            outer_parallelism: config.outer_parallelism.max(1),
            inner_parallelism: config.inner_parallelism.max(1),
            retry: RetryPolicy {
                max_attempts: config.max_retries.max(1),
                base: Duration::from_millis(config.retry_base_ms),
                cap: Duration::from_millis(config.retry_cap_ms),
            },
        }
    }
}

/// Outcome of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub index: String,
    pub created: bool,
    pub fips_total: usize,
    pub fips_failed: usize,
    pub documents: i64,
}

#[derive(Debug, FromRow)]
struct AddressRow {
    id: Uuid,
    updated_at: DateTime<Utc>,
    city: Option<String>,
    county: Option<String>,
    data_source: Option<String>,
    fips: Option<String>,
    full_street_address: Option<String>,
    state: Option<String>,
    street_name: Option<String>,
    street_number: Option<String>,
    street_pos_direction: Option<String>,
    street_pre_direction: Option<String>,
    street_type: Option<String>,
    unit_nbr: Option<String>,
    unit_type: Option<String>,
    zip5: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    property_id: Option<Uuid>,
    ad_attom_id: Option<i64>,
    fa_property_id: Option<i64>,
}

const ADDRESS_PAGE_SQL: &str = "\
SELECT a.id, a.updated_at, a.city, a.county, a.data_source, a.fips, a.full_street_address, a.state,
       a.street_name, a.street_number, a.street_pos_direction, a.street_pre_direction, a.street_type,
       a.unit_nbr, a.unit_type, a.zip5, a.latitude, a.longitude,
       p.id AS property_id, p.ad_attom_id, p.fa_property_id
FROM addresses a
LEFT JOIN properties p ON a.id = p.address_id
WHERE a.fips = $1
  AND ($2::uuid IS NULL OR a.id > $2)
  AND ($3::text IS NULL OR a.zip5 = $3)
ORDER BY a.id
LIMIT $4";

fn opt_format(value: Option<String>) -> Option<String> {
    value.map(|v| format_address_text(&v))
}

impl From<AddressRow> for AddressDocument {
    fn from(row: AddressRow) -> Self {
        let location = match (row.latitude, row.longitude) {
            (Some(lat), Some(lon)) => Some(format!("{},{}", lat, lon)),
            _ => None,
        };

        AddressDocument {
            am_id: row.id.to_string(),
            am_updated_at: row.updated_at,
            property_id: row.property_id.map(|id| id.to_string()),
            ad_attom_id: row.ad_attom_id,
            fa_property_id: row.fa_property_id,
            full_address: row.full_street_address,
            fips: row.fips.unwrap_or_default(),
            state_full_name: row.state.as_deref().map(state_full_name),
            state: row.state,
            county: row.county,
            zip5: row.zip5.unwrap_or_default(),
            pre_directional: opt_format(row.street_pre_direction),
            street_number: row.street_number,
            street: opt_format(row.street_name),
            post_directional: opt_format(row.street_pos_direction),
            street_type: opt_format(row.street_type),
            unit_type: opt_format(row.unit_type),
            unit_nbr: row.unit_nbr,
            city: opt_format(row.city),
            source: row.data_source,
            location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Indexer {
    request: Request,
    db_key: String,
    search_key: String,
    options: IndexOptions,
}

impl Indexer {
    pub fn new(request: Request, db_key: impl Into<String>, search_key: impl Into<String>, options: IndexOptions) -> Self {
        Self {
            request,
            db_key: db_key.into(),
            search_key: search_key.into(),
            options,
        }
    }

    fn client(&self) -> Result<SearchClient> {
        self.request
            .search(&self.search_key)
            .cloned()
            .forward(uuid!("cfafd13d-c07c-4cca-990f-a7d7ba5d4ea4"))
    }

    /// Run one pass over the selected FIPS codes.
    #[instrument(skip(self), fields(alias = %self.options.alias))]
    pub async fn run(&self) -> Result<IndexSummary> {
        let client = self.client()?;
        let started = Instant::now();

        let (index, created) = self.resolve_target_index(&client).await?;
        self.ensure_status_index(&client).await?;
        self.ensure_alias(&client, &index).await?;

        // A fresh index starts empty, so recently processed codes are indexed again.
        let fips_codes = self.select_fips(&client, !created).await?;
        let mut summary = IndexSummary {
            index: index.clone(),
            created,
            fips_total: fips_codes.len(),
            ..Default::default()
        };

        if fips_codes.is_empty() {
            info!("No unprocessed FIPS codes found");
            return Ok(summary);
        }

        let total = fips_codes.len();
        let mut completed = 0usize;

        for group in fips_codes.chunks(self.options.outer_parallelism) {
            self.request.check_canceled()?;

            let mut tasks = JoinSet::new();
            for fips in group {
                let this = self.clone();
                let index = index.clone();
                let fips = fips.clone();
                tasks.spawn(async move {
                    let res = this.index_fips(&index, &fips).await;
                    (fips, res)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((fips, Ok(count))) => {
                        summary.documents += count;
                        info!(fips = %fips, count, total_documents = summary.documents, "Finished FIPS");
                    },
                    Ok((fips, Err(e))) => {
                        summary.fips_failed += 1;
                        error!(fips = %fips, error = %e, "Failed to index FIPS");
                    },
                    Err(e) => {
                        summary.fips_failed += 1;
                        error!(error = %e, "FIPS task aborted");
                    },
                }
            }

            completed += group.len();
            let elapsed = started.elapsed();
            let average = elapsed / completed as u32;
            let remaining = average * (total - completed) as u32;
            info!(
                completed_fips = completed,
                remaining_fips = total - completed,
                total_fips = total,
                progress_percent = %format!("{:.1}", completed as f64 / total as f64 * 100.0),
                elapsed = ?elapsed,
                avg_per_fips = ?average,
                estimated_remaining = ?remaining,
                "Finished group of FIPS codes"
            );
        }

        self.request.check_canceled()?;

        if created {
            self.switch_alias(&client, &index).await?;
        }

        info!(
            index = %index,
            fips = total,
            failed = summary.fips_failed,
            documents = summary.documents,
            elapsed = ?started.elapsed(),
            "Address indexing completed"
        );

        Ok(summary)
    }

    /// The index behind the alias when its mapping is current, otherwise a
    /// newly created one. The flag tells whether the index was created.
    async fn resolve_target_index(&self, client: &SearchClient) -> Result<(String, bool)> {
        let body = AddressDocument::index_body();
        let alias = &self.options.alias;

        let current = self
            .request
            .guard(async {
                client.get_alias(alias).await.site(
                    uuid!("9e92f72c-dc44-4a36-9bf0-76fe030a810e"),
                    Code::Unknown,
                    "Failed to read alias.",
                )
            })
            .await?;

        if let Some(existing) = current.last() {
            match client.get_mapping(existing).await {
                Ok(mapping) if mappings_equal(&mapping, &body["mappings"]) => {
                    info!(index = %existing, "No mapping changes detected, using existing index");
                    return Ok((existing.clone(), false));
                },
                Ok(_) => info!(index = %existing, "Mapping changes detected, creating new index"),
                Err(e) => warn!(index = %existing, error = %e, "Failed to read mapping, creating new index"),
            }
        }

        let index = format!("{}_{}", alias, Utc::now().format("%Y%m%d_%H%M%S"));
        self.request
            .guard(async {
                client.create_index(&index, &body).await.site(
                    uuid!("e9254752-5c0d-4e77-8c3d-7fbbc9fc32e9"),
                    Code::Unknown,
                    "Failed to create index.",
                )
            })
            .await
            .map_err(|e| e.with_meta("index", index.clone()))?;

        info!(index = %index, "Created index");
        Ok((index, true))
    }

    async fn ensure_status_index(&self, client: &SearchClient) -> Result<()> {
        match client
            .create_index(FIPS_STATUS_INDEX, &FipsProcessingStatus::index_body())
            .await
        {
            Ok(()) => {
                info!(index = FIPS_STATUS_INDEX, "Created status index");
                Ok(())
            },
            Err(e) if e.is_already_exists() => Ok(()),
            Err(e) => Err(Error::unknown(
                uuid!("026af531-4ec6-42db-b8e4-04062a606197"),
                "Failed to create status index.",
            )
            .with_cause(e)),
        }
    }

    async fn ensure_alias(&self, client: &SearchClient, index: &str) -> Result<()> {
        let alias = &self.options.alias;
        let current = client.get_alias(alias).await.site(
            uuid!("2bf87901-64e7-4038-a001-b1c9c5c1b149"),
            Code::Unknown,
            "Failed to read alias.",
        )?;

        if !current.is_empty() {
            return Ok(());
        }

        client
            .update_aliases(vec![json!({ "add": { "index": index, "alias": alias } })])
            .await
            .site(
                uuid!("2a081747-2cb7-412b-83ad-c36bf42b86ef"),
                Code::Unknown,
                "Failed to create alias.",
            )?;

        info!(alias = %alias, index = %index, "Created alias");
        Ok(())
    }

    /// The requested FIPS code, or every FIPS code in `addresses`, minus the
    /// ones processed successfully within the recency window when `skip_recent`.
    async fn select_fips(&self, client: &SearchClient, skip_recent: bool) -> Result<Vec<String>> {
        if let Some(fips) = &self.options.fips {
            return Ok(vec![fips.clone()]);
        }

        let rows = self
            .request
            .fetch_all(
                &self.db_key,
                sqlx::query("SELECT DISTINCT fips FROM addresses WHERE fips IS NOT NULL ORDER BY fips"),
            )
            .await
            .forward(uuid!("ef108c71-52a2-473b-a49f-5679d6d58778"))?;

        let all: Vec<String> = rows
            .iter()
            .map(|row| sqlx::Row::try_get::<String, _>(row, "fips"))
            .collect::<std::result::Result<_, _>>()
            .site(
                uuid!("92ef8058-2b99-4569-b6a4-131d80b490cc"),
                Code::Unknown,
                "Failed to decode FIPS code.",
            )?;

        if !skip_recent {
            return Ok(all);
        }

        let since = Utc::now() - self.options.recency_window;
        let query = json!({
            "query": {
                "bool": {
                    "must": [
                        { "term": { "processed": true } },
                        { "range": { "finished_at": { "gte": since.to_rfc3339() } } }
                    ]
                }
            },
            "size": 10000,
            "_source": ["fips"]
        });

        let result = self
            .request
            .guard(async {
                client.search(FIPS_STATUS_INDEX, &query).await.site(
                    uuid!("dd7c9905-eb74-430a-b895-0fb3ea87dafb"),
                    Code::Unknown,
                    "Failed to read FIPS status.",
                )
            })
            .await?;

        let recent: std::collections::HashSet<&str> = result["hits"]["hits"]
            .as_array()
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| hit["_source"]["fips"].as_str())
                    .collect()
            })
            .unwrap_or_default();

        let pending: Vec<String> = all.iter().filter(|f| !recent.contains(f.as_str())).cloned().collect();

        info!(
            total_fips = all.len(),
            recently_processed = recent.len(),
            to_process = pending.len(),
            "FIPS processing status"
        );

        Ok(pending)
    }

    /// Index one FIPS code and record its terminal status.
    #[instrument(skip(self, index))]
    async fn index_fips(&self, index: &str, fips: &str) -> Result<i64> {
        let client = self.client()?;

        if let Err(e) = client
            .put_document(FIPS_STATUS_INDEX, fips, &FipsProcessingStatus::started(fips))
            .await
        {
            warn!(fips, error = %e, "Failed to record FIPS start");
        }

        let (indexed, res) = self.index_fips_pages(&client, index, fips).await;

        let error = res.as_ref().err().map(ToString::to_string);
        let status = FipsProcessingStatus::started(fips).finish(indexed, error);
        if let Err(e) = client.put_document(FIPS_STATUS_INDEX, fips, &status).await {
            warn!(fips, error = %e, "Failed to record FIPS status");
        }

        res.map(|()| indexed)
    }

    /// Documents indexed before any failure, and how the pass ended.
    async fn index_fips_pages(&self, client: &SearchClient, index: &str, fips: &str) -> (i64, Result<()>) {
        let request = self.request.child();
        let semaphore = Arc::new(Semaphore::new(self.options.inner_parallelism));
        let (err_tx, mut err_rx) = mpsc::channel::<Error>(1);
        let count = Arc::new(AtomicI64::new(0));
        let mut batches = JoinSet::new();
        let mut last_id: Option<Uuid> = None;

        let paged: Result<()> = async {
            loop {
                let rows = request
                    .fetch_all(
                        &self.db_key,
                        sqlx::query(ADDRESS_PAGE_SQL)
                            .bind(fips)
                            .bind(last_id)
                            .bind(self.options.zip5.as_deref())
                            .bind(self.options.batch_size as i64),
                    )
                    .await
                    .forward(uuid!("36b1110a-9223-4034-9d59-9dabc76e2592"))?;

                if rows.is_empty() {
                    return Ok(());
                }

                let docs: Vec<AddressDocument> = rows
                    .iter()
                    .map(|row| AddressRow::from_row(row).map(AddressDocument::from))
                    .collect::<std::result::Result<_, _>>()
                    .site(
                        uuid!("2ab1f1d6-ad32-4ba4-8371-cf1b42250089"),
                        Code::Unknown,
                        "Failed to decode address row.",
                    )?;

                last_id = rows
                    .last()
                    .map(|row| sqlx::Row::try_get::<Uuid, _>(row, "id"))
                    .transpose()
                    .site(
                        uuid!("9b53c2e3-5faa-4eff-8294-7201e2b6d19e"),
                        Code::Unknown,
                        "Failed to decode address id.",
                    )?;

                let permit = tokio::select! {
                    biased;
                    _ = request.cancel_token().cancelled() => {
                        return Err(Error::canceled(uuid!("c7ee1258-0a5c-41ce-9218-d3d8610a4fd1")));
                    }
                    permit = semaphore.clone().acquire_owned() => permit.site(
                        uuid!("4ff352a6-3063-4f97-8cd4-3b73cad284ff"),
                        Code::Internal,
                        "Semaphore closed.",
                    )?,
                };

                let client = client.clone();
                let request = request.clone();
                let index = index.to_string();
                let retry = self.options.retry;
                let count = count.clone();
                let err_tx = err_tx.clone();
                let batch_last = last_id;

                batches.spawn(async move {
                    let _permit = permit;
                    match bulk_index(&client, &request, &index, &docs, retry).await {
                        Ok(n) => {
                            let total = count.fetch_add(n as i64, Ordering::Relaxed) + n as i64;
                            debug!(last_id = ?batch_last, batch = n, total, "Batch indexed");
                        },
                        Err(e) => {
                            let _ = err_tx.try_send(e);
                            request.cancel_token().cancel();
                        },
                    }
                });
            }
        }
        .await;

        while let Some(joined) = batches.join_next().await {
            if let Err(e) = joined {
                let _ = err_tx.try_send(
                    Error::internal(uuid!("5f22a874-14ea-49a8-b76d-bdbf2de65fef"), "Bulk task aborted.")
                        .with_cause(e),
                );
            }
        }
        drop(err_tx);

        let indexed = count.load(Ordering::Relaxed);
        if let Ok(e) = err_rx.try_recv() {
            return (indexed, Err(e.forward(uuid!("4956e53c-24e8-4fcd-8645-68661d3e96d1"))));
        }
        (indexed, paged)
    }

    /// Drop every other `<alias>_*` index and point the alias at `index`.
    async fn switch_alias(&self, client: &SearchClient, index: &str) -> Result<()> {
        let alias = &self.options.alias;
        let pattern = format!("{}_*", alias);

        let indices = client.cat_indices(&pattern).await.site(
            uuid!("b46973e1-4bb2-472a-a325-47a97c04a8f9"),
            Code::Unknown,
            "Failed to list indices.",
        )?;

        for old in indices.iter().filter(|name| name.as_str() != index) {
            match client.delete_index(old).await {
                Ok(()) => info!(index = %old, "Deleted old index"),
                Err(e) => warn!(index = %old, error = %e, "Failed to delete old index"),
            }
        }

        let mut actions: Vec<Value> = client
            .get_alias(alias)
            .await
            .site(
                uuid!("34f56b34-dfa3-478d-9264-cbcece133d54"),
                Code::Unknown,
                "Failed to read alias.",
            )?
            .into_iter()
            .filter(|name| name != index)
            .map(|name| json!({ "remove": { "index": name, "alias": alias } }))
            .collect();
        actions.push(json!({ "add": { "index": index, "alias": alias } }));

        client.update_aliases(actions).await.site(
            uuid!("a6c8758f-57cd-4ee7-b83e-89562a4ff1cf"),
            Code::Unknown,
            "Failed to update alias.",
        )?;

        info!(alias = %alias, index = %index, "Alias updated to point to new index");
        Ok(())
    }
}

/// Send one bulk request, retrying while the cluster rate limits it.
/// Returns the number of documents indexed.
pub async fn bulk_index(
    client: &SearchClient,
    request: &Request,
    index: &str,
    docs: &[AddressDocument],
    retry: RetryPolicy,
) -> Result<usize> {
    let mut body = String::new();
    for doc in docs {
        push_bulk_index(&mut body, index, &doc.am_id, doc).site(
            uuid!("75d41d6e-6c49-4fd1-ad96-a21228bb0e4d"),
            Code::Internal,
            "Failed to encode document.",
        )?;
    }

    for attempt in 1..=retry.max_attempts {
        let outcome = tokio::select! {
            biased;
            _ = request.cancel_token().cancelled() => {
                return Err(Error::canceled(uuid!("580de9ee-beda-4963-808c-d98faad34832")));
            }
            outcome = client.bulk(body.clone()) => outcome,
        };

        match outcome {
            Ok(response) if !response.errors => return Ok(docs.len()),
            Ok(response) => {
                let failures: Vec<_> = response.failures().collect();
                if !failures.iter().all(|item| item.status == 429) {
                    let first = failures.iter().find(|item| item.status != 429);
                    return Err(Error::unknown(
                        uuid!("425c8f31-3e88-4efb-81c8-ad251506ea6d"),
                        "Bulk request had failed items.",
                    )
                    .with_meta("failed", failures.len())
                    .with_meta("first_error", first.and_then(|i| i.error.clone()).unwrap_or(Value::Null)));
                }
            },
            Err(e) if e.is_rate_limited() => {},
            Err(e) => {
                return Err(Error::unknown(uuid!("c864a425-8018-4ff0-a9f6-d99e9486983e"), "Bulk request failed.")
                    .with_cause(e));
            },
        }

        if attempt < retry.max_attempts {
            let delay = retry.delay(attempt);
            warn!(
                "Bulk attempt {}/{} rate limited, retrying in {:?}",
                attempt, retry.max_attempts, delay
            );
            tokio::select! {
                biased;
                _ = request.cancel_token().cancelled() => {
                    return Err(Error::canceled(uuid!("8e3872a6-1bdd-429c-b7e7-b34a8e16d044")));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    Err(Error::unknown(
        uuid!("3077bf95-2fc2-444a-a9c4-84760b7dd147"),
        "Bulk request still rate limited.",
    )
    .with_meta("attempts", retry.max_attempts))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delays() {
        let retry = RetryPolicy {
            max_attempts: 5,
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
        };
        let delays: Vec<u64> = (1..=6).map(|n| retry.delay(n).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30]);
    }

    #[test]
    fn test_options_clamp_batch_size() {
        let config = IndexConfig {
            batch_size: 10,
            ..IndexConfig::default()
        };
        let options = IndexOptions::from(&config);
        assert_eq!(options.batch_size, 100);
        assert_eq!(options.recency_window, chrono::Duration::hours(24));
        assert_eq!(options.retry.max_attempts, 5);
    }

    #[test]
    fn test_row_to_document() {
        let row = AddressRow {
            id: Uuid::nil(),
            updated_at: Utc::now(),
            city: Some("LOS ANGELES".into()),
            county: Some("Los Angeles".into()),
            data_source: Some("first_american".into()),
            fips: Some("06037".into()),
            full_street_address: Some("123 N MAIN ST".into()),
            state: Some("ca".into()),
            street_name: Some("MAIN".into()),
            street_number: Some("123".into()),
            street_pos_direction: None,
            street_pre_direction: Some("N".into()),
            street_type: Some("ST".into()),
            unit_nbr: None,
            unit_type: None,
            zip5: Some("90012".into()),
            latitude: Some(34.05),
            longitude: Some(-118.25),
            property_id: None,
            ad_attom_id: Some(42),
            fa_property_id: None,
        };

        let doc = AddressDocument::from(row);
        assert_eq!(doc.city.as_deref(), Some("Los Angeles"));
        assert_eq!(doc.pre_directional.as_deref(), Some("N"));
        assert_eq!(doc.street_type.as_deref(), Some("St"));
        assert_eq!(doc.state.as_deref(), Some("ca"));
        assert_eq!(doc.state_full_name.as_deref(), Some("California"));
        assert_eq!(doc.location.as_deref(), Some("34.05,-118.25"));
        assert_eq!(doc.full_address.as_deref(), Some("123 N MAIN ST"));
    }

    #[test]
    fn test_location_requires_both_coordinates() {
        let row = AddressRow {
            id: Uuid::nil(),
            updated_at: Utc::now(),
            city: None,
            county: None,
            data_source: None,
            fips: None,
            full_street_address: None,
            state: None,
            street_name: None,
            street_number: None,
            street_pos_direction: None,
            street_pre_direction: None,
            street_type: None,
            unit_nbr: None,
            unit_type: None,
            zip5: None,
            latitude: Some(1.0),
            longitude: None,
            property_id: None,
            ad_attom_id: None,
            fa_property_id: None,
        };
        let doc = AddressDocument::from(row);
        assert!(doc.location.is_none());
        assert!(doc.state_full_name.is_none());
        assert_eq!(doc.fips, "");
    }
}
