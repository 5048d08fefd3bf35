//! Request context shared by the loader, the scheduler and the indexer
//!
//! A [`Request`] carries the process-wide database pools and search clients
//! by key, a cancellation token and a correlation id. It never owns the
//! pools: cloning a request is cheap and clones share them.
//!
//! Transactions are scoped. [`Request::begin`] opens a transaction on one
//! pool and returns a [`Transaction`] whose [`Transaction::request`] is a
//! clone of the original with that pool key overridden, so every query made
//! through it runs inside the transaction. Committing consumes the scope. A
//! scope dropped without commit rolls back, which covers early returns and
//! `?` propagation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::{uuid, Uuid};

use datapipe_common::{Code, Error, ErrorContext, Result};

use crate::search::SearchClient;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Shared slot holding an open transaction
#[derive(Clone)]
pub struct TxHandle(Arc<Mutex<Option<sqlx::Transaction<'static, Postgres>>>>);

impl TxHandle {
    fn new(tx: sqlx::Transaction<'static, Postgres>) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }
}

#[derive(Clone)]
pub struct Request {
    id: Uuid,
    pools: Arc<HashMap<String, PgPool>>,
    search: Arc<HashMap<String, SearchClient>>,
    txs: HashMap<String, TxHandle>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("pools", &self.pools.keys().collect::<Vec<_>>())
            .field("search", &self.search.keys().collect::<Vec<_>>())
            .field("txs", &self.txs.keys().collect::<Vec<_>>())
            .field("canceled", &self.cancel.is_cancelled())
            .finish()
    }
}

#[derive(Default)]
pub struct RequestBuilder {
    pools: HashMap<String, PgPool>,
    search: HashMap<String, SearchClient>,
    cancel: Option<CancellationToken>,
}

impl RequestBuilder {
    pub fn pool(mut self, key: impl Into<String>, pool: PgPool) -> Self {
        self.pools.insert(key.into(), pool);
        self
    }

    pub fn search(mut self, key: impl Into<String>, client: SearchClient) -> Self {
        self.search.insert(key.into(), client);
        self
    }

    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Request {
        Request {
            id: Uuid::now_v7(),
            pools: Arc::new(self.pools),
            search: Arc::new(self.search),
            txs: HashMap::new(),
            cancel: self.cancel.unwrap_or_default(),
        }
    }
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with `canceled` once the token fired.
    pub fn check_canceled(&self) -> Result<()> {
        if self.is_canceled() {
            return Err(Error::canceled(uuid!("b3f62fa4-176e-489f-9f6d-77e4ecd310e0")));
        }
        Ok(())
    }

    /// Clone with a child token, so the clone can be canceled on its own.
    pub fn child(&self) -> Request {
        let mut request = self.clone();
        request.cancel = self.cancel.child_token();
        request
    }

    /// Clone that runs every query on `key` through `tx`.
    pub fn clone_with_tx(&self, key: &str, tx: TxHandle) -> Request {
        let mut request = self.clone();
        request.txs.insert(key.to_string(), tx);
        request
    }

    pub fn in_transaction(&self, key: &str) -> bool {
        self.txs.contains_key(key)
    }

    pub fn pool(&self, key: &str) -> Result<&PgPool> {
        self.pools.get(key).ok_or_else(|| {
            Error::internal(uuid!("b6f032c4-757d-40df-9d9b-a85263e9e87e"), "Unknown database pool.")
                .with_meta("key", key)
        })
    }

    pub fn search(&self, key: &str) -> Result<&SearchClient> {
        self.search.get(key).ok_or_else(|| {
            Error::internal(uuid!("d37d9ffd-42dc-4450-95ff-539868291740"), "Unknown search client.")
                .with_meta("key", key)
        })
    }

    /// Run `fut` unless the request is canceled first.
    pub async fn guard<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(Error::canceled(uuid!("d6971e7c-ffe3-4013-8b48-62e033c52e3d")))
            }
            res = fut => res,
        }
    }

    pub async fn execute(&self, key: &str, query: PgQuery<'_>) -> Result<PgQueryResult> {
        self.guard(async {
            match self.txs.get(key) {
                Some(handle) => {
                    let mut slot = handle.0.lock().await;
                    let tx = slot.as_mut().ok_or_else(finished_tx)?;
                    query.execute(&mut **tx).await
                },
                None => query.execute(self.pool(key)?).await,
            }
            .site(uuid!("3d88d0dd-5b55-452a-ad3f-115600b3af3c"), Code::Unknown, "Failed to execute query.")
        })
        .await
    }

    pub async fn fetch_all(&self, key: &str, query: PgQuery<'_>) -> Result<Vec<PgRow>> {
        self.guard(async {
            match self.txs.get(key) {
                Some(handle) => {
                    let mut slot = handle.0.lock().await;
                    let tx = slot.as_mut().ok_or_else(finished_tx)?;
                    query.fetch_all(&mut **tx).await
                },
                None => query.fetch_all(self.pool(key)?).await,
            }
            .site(uuid!("0118fb41-5e23-424e-892a-5d06f00098d4"), Code::Unknown, "Failed to fetch rows.")
        })
        .await
    }

    pub async fn fetch_optional(&self, key: &str, query: PgQuery<'_>) -> Result<Option<PgRow>> {
        self.guard(async {
            match self.txs.get(key) {
                Some(handle) => {
                    let mut slot = handle.0.lock().await;
                    let tx = slot.as_mut().ok_or_else(finished_tx)?;
                    query.fetch_optional(&mut **tx).await
                },
                None => query.fetch_optional(self.pool(key)?).await,
            }
            .site(uuid!("16e32cfb-c3d9-4ae6-81bd-34b028752d53"), Code::Unknown, "Failed to fetch row.")
        })
        .await
    }

    pub async fn fetch_one(&self, key: &str, query: PgQuery<'_>) -> Result<PgRow> {
        self.fetch_optional(key, query).await?.ok_or_else(|| {
            Error::not_found(uuid!("0150b3e1-a52d-4e5d-923d-697eb4f214e7"), "Row not found.")
        })
    }

    /// Open a transaction on `key`.
    pub async fn begin(&self, key: &str) -> Result<Transaction> {
        let pool = self.pool(key)?.clone();
        let tx = self
            .guard(async {
                pool.begin().await.site(
                    uuid!("742943c1-6b99-4d6b-8770-415c99b03707"),
                    Code::Unknown,
                    "Failed to begin transaction.",
                )
            })
            .await?;

        let handle = TxHandle::new(tx);
        debug!(request_id = %self.id, key, "Transaction started");

        Ok(Transaction {
            request: self.clone_with_tx(key, handle.clone()),
            handle,
            key: key.to_string(),
        })
    }
}

fn finished_tx() -> Error {
    Error::internal(
        uuid!("fd5fbb62-7426-4c22-8ea2-d9beb603e238"),
        "Transaction already finished.",
    )
}

/// An open transaction and the request scoped to it
pub struct Transaction {
    request: Request,
    handle: TxHandle,
    key: String,
}

impl Transaction {
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Commit, or roll back and fail with `canceled` when the request was
    /// canceled before the commit went out.
    pub async fn commit(self) -> Result<()> {
        let tx = self.handle.0.lock().await.take().ok_or_else(finished_tx)?;

        if self.request.is_canceled() {
            if let Err(e) = tx.rollback().await {
                warn!(error = %e, key = %self.key, "Failed to roll back canceled transaction");
            }
            return Err(Error::canceled(uuid!("cb55a6d7-d8ab-446f-9263-97f30f05f7d0")));
        }

        tx.commit().await.site(
            uuid!("0a8149f1-4d84-4fab-95d3-b17a34250a9e"),
            Code::Unknown,
            "Failed to commit transaction.",
        )
    }

    pub async fn rollback(self) -> Result<()> {
        let tx = self.handle.0.lock().await.take().ok_or_else(finished_tx)?;
        tx.rollback().await.site(
            uuid!("fce5127e-4e9b-4e58-a9fd-bf6f7d4f3d94"),
            Code::Unknown,
            "Failed to roll back transaction.",
        )
    }
}
