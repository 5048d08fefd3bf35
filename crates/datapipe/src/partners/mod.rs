//! Data partners and their file naming rules
//!
//! Each partner drops files into its own store with its own naming grammar.
//! A [`Partner`] turns a listed [`StorageObject`] into a [`DataFileEntry`]
//! that tells the scheduler whether to load it, with which record type, and
//! where it sits in the processing order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use datapipe_common::Result;

use crate::records::RecordKind;
use crate::storage::StorageObject;

pub mod attom;
pub mod first_american;

pub use attom::AttomData;
pub use first_american::FirstAmerican;

/// Classification of one listed storage object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFileEntry {
    pub object: StorageObject,
    pub path: String,
    /// Partner scoped file type id
    pub file_type: Option<i32>,
    pub release_number: Option<i32>,
    pub release_part: Option<i32>,
    pub date: Option<NaiveDate>,
    /// Sort key, lower first
    pub priorities: Vec<i32>,
    pub ignore: bool,
    pub enter_directory: bool,
    pub ignore_sub_dirs: bool,
    /// A directory entered only for the files inside it
    pub selected_directory: bool,
}

impl DataFileEntry {
    pub fn new(path: impl Into<String>, object: &StorageObject) -> Self {
        Self {
            object: object.clone(),
            path: path.into(),
            file_type: None,
            release_number: None,
            release_part: None,
            date: None,
            priorities: Vec::new(),
            ignore: false,
            enter_directory: false,
            ignore_sub_dirs: false,
            selected_directory: false,
        }
    }

    pub fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// Classification and record lookup for one partner
pub trait Partner: Send + Sync + std::fmt::Debug {
    fn id(&self) -> Uuid;

    fn name(&self) -> &'static str;

    /// Path the store is walked from.
    fn root(&self) -> &str;

    /// Field separator of every file of this partner.
    fn separator(&self) -> char;

    /// Classify `object`, found at the absolute `path`.
    fn classify(&self, path: &str, object: &StorageObject) -> Result<DataFileEntry>;

    /// Record type loaded from files of `file_type`, if any.
    fn record_kind(&self, file_type: i32) -> Option<RecordKind>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnerName {
    Attom,
    FirstAmerican,
}

impl PartnerName {
    pub fn default_root(self) -> &'static str {
        match self {
            PartnerName::Attom => attom::DEFAULT_ROOT,
            PartnerName::FirstAmerican => first_american::DEFAULT_ROOT,
        }
    }

    /// Build the partner, walking from `root` when given.
    pub fn build(self, root: Option<&str>) -> anyhow::Result<Arc<dyn Partner>> {
        let root = root.unwrap_or(self.default_root());
        Ok(match self {
            PartnerName::Attom => Arc::new(AttomData::new(root)?),
            PartnerName::FirstAmerican => Arc::new(FirstAmerican::new(root)?),
        })
    }
}

impl std::fmt::Display for PartnerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartnerName::Attom => write!(f, "attom"),
            PartnerName::FirstAmerican => write!(f, "first-american"),
        }
    }
}
