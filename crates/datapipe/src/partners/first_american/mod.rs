//! Partner B: pipe separated files grouped in date stamped directories
//!
//! Directory names look like `20250403_Update` or `20250101_Power_AVMHist_2`.
//! The directory decides the type and order of every file inside it, so
//! files are classified only through their directory.

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::{debug, warn};
use uuid::{uuid, Uuid};

use datapipe_common::{val, Error, Result};

use super::{DataFileEntry, Partner};
use crate::records::RecordKind;
use crate::storage::StorageObject;

pub mod address;
pub mod assessor;
pub mod avm_power;

pub use address::Address;
pub use assessor::Assessor;
pub use avm_power::AvmPower;

pub const PARTNER_ID: Uuid = uuid!("44f2033f-f93a-4cad-bcaa-d5f649940094");

pub const DEFAULT_ROOT: &str = "/ftp";

const DIRECTORY_PATTERN: &str = r"^(\d{8})_([A-Za-z_]*[A-Za-z]+)_?(\d+)?$";

pub mod file_type {
    pub const ASR: i32 = 494501913;
    pub const ADDRESS: i32 = 732748435;
    pub const ASSESSOR_ANNUAL: i32 = 363785734;
    pub const ASSESSOR_UPDATE: i32 = 515042169;
    pub const AVM_POWER: i32 = 288491261;
    pub const DEED_MTG: i32 = 541242299;
    pub const HOA: i32 = 347768023;
    pub const HOA_LIEN: i32 = 156325817;
    pub const HPI: i32 = 579722379;
    pub const INV_LIEN: i32 = 357089610;
    pub const LISTING: i32 = 960605711;
    pub const NOD: i32 = 311010286;
    pub const PFC: i32 = 448481785;
    pub const SHAPE: i32 = 236998122;
    pub const TAX_HISTORY: i32 = 240431550;
    pub const VALUE_HISTORY: i32 = 809597855;
}

/// Assessor directories sort by date first, then annual before update.
pub mod priority {
    pub const ASSESSOR_GROUP: i32 = 1;
    pub const ASSESSOR_ANNUAL: i32 = 2;
    pub const ASSESSOR_UPDATE: i32 = 3;
    pub const AVM_POWER: i32 = 4;
    pub const AVM_POWER_HISTORY: i32 = 5;
    pub const ASR: i32 = 6;
    pub const DEED_MTG: i32 = 7;
    pub const HOA: i32 = 8;
    pub const HOA_LIEN: i32 = 9;
    pub const HPI: i32 = 10;
    pub const INV_LIEN: i32 = 11;
    pub const LISTING: i32 = 12;
    pub const NOD: i32 = 13;
    pub const PFC: i32 = 14;
    pub const SHAPE: i32 = 15;
    pub const TAX_HISTORY: i32 = 16;
    pub const VALUE_HISTORY: i32 = 17;
    pub const ADDRESS: i32 = 18;
}

/// First annual directory in the current schema
const FIRST_ANNUAL: i32 = 20250326;
/// First update directory in the current schema
const FIRST_UPDATE: i32 = 20250403;

#[derive(Debug, Clone)]
pub struct FirstAmerican {
    root: String,
    pattern: Regex,
}

impl FirstAmerican {
    pub fn new(root: &str) -> anyhow::Result<Self> {
        Ok(Self {
            root: crate::storage::clean_path(root),
            pattern: Regex::new(DIRECTORY_PATTERN)?,
        })
    }

    fn classify_directory(&self, object: &StorageObject, mut entry: DataFileEntry) -> Result<DataFileEntry> {
        let Some(captures) = self.pattern.captures(&object.name) else {
            debug!(name = %object.name, reason = "no_match", "Skipping directory");
            return Ok(entry.ignored());
        };

        let date = val::date_int(&captures[1])
            .ok()
            .flatten()
            .ok_or_else(|| {
                Error::invalid_argument(
                    uuid!("41f70b85-b3c1-4119-900d-e845a873289c"),
                    "Invalid date format.",
                )
                .with_meta("date", &captures[1])
            })?;
        entry.date = Some(date);

        if let Some(release) = captures.get(3) {
            match release.as_str().parse::<i32>() {
                Ok(release) => entry.release_number = Some(release),
                Err(_) => {
                    warn!(name = %object.name, reason = "invalid_release_number", "Skipping directory");
                    return Ok(entry.ignored());
                },
            }
        }

        let day = integer_date(date);
        let release = entry.release_number.unwrap_or_default();
        let suffix = captures[2].to_uppercase();

        let (file_type, priorities, ignore) = match suffix.as_str() {
            // Not loaded until address master ids are reconciled with the
            // canonical address table.
            "ADDRESS" | "ADDRESSMASTER" => (file_type::ADDRESS, vec![priority::ADDRESS, day], true),
            "ANNUAL" => (
                file_type::ASSESSOR_ANNUAL,
                vec![priority::ASSESSOR_GROUP, day, priority::ASSESSOR_ANNUAL],
                day < FIRST_ANNUAL,
            ),
            "UPDATE" => (
                file_type::ASSESSOR_UPDATE,
                vec![priority::ASSESSOR_GROUP, day, priority::ASSESSOR_UPDATE],
                day < FIRST_UPDATE,
            ),
            "AVMPOWER" => {
                if date.year() < 2025 {
                    return Ok(entry.ignored());
                }
                (file_type::AVM_POWER, vec![priority::AVM_POWER, day], false)
            },
            "POWER_AVMHIST" => (
                file_type::AVM_POWER,
                vec![priority::AVM_POWER_HISTORY, release, day],
                true,
            ),
            // Rebuilt by hand from annual and update files.
            "ASR" | "PROP" => return Ok(entry.ignored()),
            "DEED" | "DEEDMTG" => (file_type::DEED_MTG, vec![priority::DEED_MTG, day], true),
            "HOA" => (file_type::HOA, vec![priority::HOA, day], true),
            "HOALIEN" => (file_type::HOA_LIEN, vec![priority::HOA_LIEN, day], true),
            "HPI" => (file_type::HPI, vec![priority::HPI, day], true),
            "INVL" | "INVLIEN" => (file_type::INV_LIEN, vec![priority::INV_LIEN, day], true),
            "LISTING" | "LISTINGS" => (file_type::LISTING, vec![priority::LISTING, day], true),
            "NOD" => (file_type::NOD, vec![priority::NOD, day], true),
            "PFC" => (file_type::PFC, vec![priority::PFC, day], true),
            "SHAPE" => (file_type::SHAPE, vec![priority::SHAPE, day], true),
            "TAXHIST" | "TAXHISTORY" => (file_type::TAX_HISTORY, vec![priority::TAX_HISTORY, day], true),
            "VALHIST" | "VALUEHIST" => (
                file_type::VALUE_HISTORY,
                vec![priority::VALUE_HISTORY, day],
                true,
            ),
            _ => {
                warn!(name = %object.name, suffix = %suffix, "Unknown data file type");
                return Ok(entry.ignored());
            },
        };

        entry.file_type = Some(file_type);
        entry.priorities = priorities;
        entry.ignore = ignore;
        entry.enter_directory = !ignore;
        Ok(entry)
    }
}

/// `YYYYMMDD` as an integer
pub fn integer_date(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

impl Partner for FirstAmerican {
    fn id(&self) -> Uuid {
        PARTNER_ID
    }

    fn name(&self) -> &'static str {
        "first_american"
    }

    fn root(&self) -> &str {
        &self.root
    }

    fn separator(&self) -> char {
        '|'
    }

    fn classify(&self, path: &str, object: &StorageObject) -> Result<DataFileEntry> {
        let entry = DataFileEntry::new(path, object);
        if object.is_directory {
            self.classify_directory(object, entry)
        } else {
            // Files take their type from the directory.
            Ok(entry)
        }
    }

    fn record_kind(&self, file_type: i32) -> Option<RecordKind> {
        match file_type {
            file_type::ADDRESS => Some(RecordKind::FaAddress),
            file_type::ASSESSOR_ANNUAL | file_type::ASSESSOR_UPDATE => Some(RecordKind::FaAssessor),
            file_type::AVM_POWER => Some(RecordKind::FaAvmPower),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use datapipe_common::Code;

    fn classify(name: &str) -> Result<DataFileEntry> {
        let partner = FirstAmerican::new(DEFAULT_ROOT).unwrap();
        let object = StorageObject::directory("/ftp", name);
        partner.classify(&object.path(), &object)
    }

    #[test]
    fn test_assessor_directories() {
        let annual = classify("20250326_Annual").unwrap();
        assert_eq!(annual.file_type, Some(file_type::ASSESSOR_ANNUAL));
        assert_eq!(
            annual.priorities,
            vec![priority::ASSESSOR_GROUP, 20250326, priority::ASSESSOR_ANNUAL]
        );
        assert!(!annual.ignore);
        assert!(annual.enter_directory);

        let update = classify("20250403_update").unwrap();
        assert_eq!(update.file_type, Some(file_type::ASSESSOR_UPDATE));
        assert!(annual.priorities < update.priorities);

        assert!(classify("20250325_Annual").unwrap().ignore);
        assert!(classify("20250402_Update").unwrap().ignore);
    }

    #[test]
    fn test_annual_before_update_on_same_day() {
        let annual = classify("20250410_Annual").unwrap();
        let update = classify("20250410_Update").unwrap();
        assert!(annual.priorities < update.priorities);
    }

    #[test]
    fn test_avm_power() {
        let entry = classify("20250115_AVMPower").unwrap();
        assert_eq!(entry.file_type, Some(file_type::AVM_POWER));
        assert_eq!(entry.priorities, vec![priority::AVM_POWER, 20250115]);

        let old = classify("20241231_AVMPower").unwrap();
        assert!(old.ignore);
        assert_eq!(old.file_type, None);

        let history = classify("20250101_Power_AVMHist_2").unwrap();
        assert!(history.ignore);
        assert_eq!(history.release_number, Some(2));
        assert_eq!(history.priorities, vec![priority::AVM_POWER_HISTORY, 2, 20250101]);
    }

    #[test]
    fn test_invalid_date_is_an_error() {
        let err = classify("20251301_Annual").unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);
        assert_eq!(err.meta["date"], "20251301");
    }

    #[test]
    fn test_unknown_and_unmatched() {
        assert!(classify("20250101_Mystery").unwrap().ignore);
        assert!(classify("misc").unwrap().ignore);
        assert!(classify("20250101_PROP").unwrap().ignore);
    }

    #[test]
    fn test_files_inherit() {
        let partner = FirstAmerican::new(DEFAULT_ROOT).unwrap();
        let object = StorageObject::file("/ftp/20250403_Update", "FA_UPDATE_001.txt", 1);
        let entry = partner.classify(&object.path(), &object).unwrap();
        assert_eq!(entry.file_type, None);
        assert!(!entry.ignore);
        assert!(entry.priorities.is_empty());
    }

    #[test]
    fn test_integer_date() {
        assert_eq!(integer_date(NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()), 20250403);
    }
}
