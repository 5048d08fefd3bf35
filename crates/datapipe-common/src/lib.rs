//! Datapipe common library
//!
//! Pieces shared by the ingest pipeline and the search indexer:
//!
//! - **Errors**: the chained, site-identified [`Error`] and its [`Result`]
//! - **Values**: coercion of raw partner fields into typed values ([`val`])
//! - **Logging**: subscriber setup driven by `LOG_*` variables
//! - **Checksums**: path hashes for file bookkeeping

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod error;
pub mod logging;
pub mod val;

pub use error::{Code, Error, ErrorContext, Result, ResultExt};
