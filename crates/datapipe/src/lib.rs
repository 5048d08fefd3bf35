//! Datapipe
//!
//! Loads real-estate data files delivered by data partners into Postgres and
//! keeps an address search index in sync with the loaded addresses.
//!
//! # Overview
//!
//! - **Partners**: file naming rules that classify every object of a
//!   partner store and decide the order it is loaded in ([`partners`])
//! - **Records**: typed rows parsed from data file lines ([`records`])
//! - **Scheduler**: walks a store, orders files and dispatches them
//!   ([`scheduler`])
//! - **Loader**: reads a file and commits its records in batches, resuming
//!   interrupted files ([`loader`])
//! - **Search**: FIPS sharded indexer writing versioned indices behind an
//!   alias ([`search`])
//!
//! Every database and search call goes through a [`request::Request`],
//! which carries the shared pools, the cancellation token and the
//! transaction scope of the caller.
//!
//! # Example
//!
//! ```no_run
//! use datapipe::{config::Config, db, partners::PartnerName, request::Request, scheduler::Scheduler, storage};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let backend = storage::open_backend(&config.storage).await?;
//!     let request = Request::builder().pool(&config.pool_keys.datapipe, pool).build();
//!
//!     let partner = PartnerName::Attom.build(config.ingest.root.as_deref())?;
//!     let scheduler = Scheduler::new(request, &config.pool_keys.datapipe, backend, (&config.ingest).into());
//!     scheduler.run(partner.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod db;
pub mod loader;
pub mod partners;
pub mod records;
pub mod request;
pub mod scheduler;
pub mod search;
pub mod storage;
