//! Address search indexing

pub mod client;
pub mod document;
pub mod format;
pub mod indexer;

pub use client::{SearchClient, SearchError};
pub use document::{AddressDocument, FipsProcessingStatus, MappingType, FIPS_STATUS_INDEX};
pub use indexer::{IndexOptions, IndexSummary, Indexer, RetryPolicy};
