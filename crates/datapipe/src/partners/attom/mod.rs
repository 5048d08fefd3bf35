//! Partner A: tab separated files shipped as ZIP archives
//!
//! Regular releases land in the store root. Refresh releases, which restate
//! history, land in `Refresh/` under the root. Deletes must be applied
//! before the matching updates of a regular release and after them for a
//! refresh release, which the priority groups below encode.

use regex::Regex;
use tracing::{debug, warn};
use uuid::{uuid, Uuid};

use datapipe_common::Result;

use super::{DataFileEntry, Partner};
use crate::records::RecordKind;
use crate::storage::{parent_path, StorageObject};

pub mod assessor;
pub mod deletes;
pub mod listing;
pub mod recorder;
pub mod rental_avm;

pub use assessor::Assessor;
pub use deletes::{PropertyDelete, RecorderDelete};
pub use listing::{Listing, ListingVersion};
pub use recorder::Recorder;
pub use rental_avm::RentalAvm;

pub const PARTNER_ID: Uuid = uuid!("11ecadd9-6bc1-4b5d-927e-378dc11829fb");

pub const DEFAULT_ROOT: &str = "/ftp";

/// Directory under the root holding refresh releases
pub const REFRESH_DIR: &str = "Refresh";

const FILE_PATTERN: &str = r"^([A-Za-z]+)_([A-Za-z_]+)_(\d+)_?(\d+)?\.zip$";

/// Stable file type ids. A newer schema of the same feed gets a higher id.
pub mod file_type {
    pub const ASSESSOR: i32 = 369011232;
    pub const ASSIGNMENT_RELEASE: i32 = 466086029;
    pub const AVM: i32 = 425540929;
    pub const BUILDING_PERMIT: i32 = 210907693;
    pub const BUILDING_PERMIT_CLASSIFIERS: i32 = 554513072;
    pub const BUILDING_PERMIT_DELETE: i32 = 908335649;
    pub const BUILDING_PERMIT_STATUS: i32 = 902471889;
    pub const CF: i32 = 929659292;
    pub const DAILY_FORECLOSURE: i32 = 779874070;
    pub const HOA: i32 = 313638910;
    pub const LISTING: i32 = 233079812;
    /// Adds `CurrentStatus`
    pub const LISTING_V20250417: i32 = 233079813;
    pub const MONTHLY_AMORTIZED_EQUITY: i32 = 702256699;
    pub const MONTHLY_LOAN_MODEL: i32 = 969505053;
    pub const PROPERTY_DELETE: i32 = 712329206;
    pub const RECORDER: i32 = 260494762;
    pub const RECORDER_DELETE: i32 = 990733446;
    pub const RENTAL_AVM: i32 = 614553397;
    pub const XREF_PROPERTY_TO_BOUNDARY_MATCH_PARCEL: i32 = 955541030;
}

/// Leading elements of the priority tuples, lower first.
pub mod priority {
    pub const LISTING: i32 = 1;

    pub const RECORDER_GROUP: i32 = 2;
    pub const RECORDER_REGULAR_GROUP: i32 = 3;
    pub const RECORDER_REFRESH_GROUP: i32 = 4;
    pub const RECORDER_DELETES_REGULAR: i32 = 5;
    pub const RECORDER_REGULAR: i32 = 6;
    pub const RECORDER_REFRESH: i32 = 7;
    pub const RECORDER_DELETES_REFRESH: i32 = 8;

    pub const ASSESSOR_GROUP: i32 = 9;
    pub const ASSESSOR_REGULAR_GROUP: i32 = 10;
    pub const ASSESSOR_REFRESH_GROUP: i32 = 11;
    pub const PROPERTY_DELETES_REGULAR: i32 = 12;
    pub const ASSESSOR_REGULAR: i32 = 13;
    pub const ASSESSOR_REFRESH: i32 = 14;
    pub const PROPERTY_DELETES_REFRESH: i32 = 15;

    pub const ASSIGNMENT_RELEASE: i32 = 16;
    pub const AVM: i32 = 17;
    pub const BUILDING_PERMIT_CLASSIFIERS: i32 = 18;
    pub const BUILDING_PERMIT_DELETE: i32 = 19;
    pub const BUILDING_PERMIT_STATUS: i32 = 20;
    pub const BUILDING_PERMIT: i32 = 21;
    pub const CF: i32 = 22;

    pub const DAILY_FORECLOSURE_GROUP: i32 = 23;
    pub const DAILY_FORECLOSURE_REGULAR_GROUP: i32 = 24;
    pub const DAILY_FORECLOSURE_REFRESH_GROUP: i32 = 25;
    pub const DAILY_FORECLOSURE: i32 = 26;

    pub const HOA: i32 = 27;
    pub const MONTHLY_AMORTIZED_EQUITY: i32 = 28;
    pub const MONTHLY_LOAN_MODEL: i32 = 29;
    pub const RENTAL_AVM: i32 = 30;
    pub const XREF_PROPERTY_TO_BOUNDARY_MATCH_PARCEL: i32 = 31;
}

#[derive(Debug, Clone)]
pub struct AttomData {
    root: String,
    refresh_dir: String,
    pattern: Regex,
}

impl AttomData {
    pub fn new(root: &str) -> anyhow::Result<Self> {
        let root = crate::storage::clean_path(root);
        Ok(Self {
            refresh_dir: crate::storage::join_path(&root, REFRESH_DIR),
            root,
            pattern: Regex::new(FILE_PATTERN)?,
        })
    }

    fn classify_directory(&self, path: &str, mut entry: DataFileEntry) -> DataFileEntry {
        if path == self.refresh_dir {
            entry.selected_directory = true;
            entry.enter_directory = true;
            entry.ignore_sub_dirs = true;
            entry
        } else {
            entry.ignored()
        }
    }

    fn classify_file(&self, path: &str, object: &StorageObject, mut entry: DataFileEntry) -> DataFileEntry {
        let Some(captures) = self.pattern.captures(&object.name) else {
            debug!(name = %object.name, reason = "no_match", "Skipping file");
            return entry.ignored();
        };

        let Ok(release) = captures[3].parse::<i32>() else {
            warn!(name = %object.name, reason = "invalid_release_number", "Skipping file");
            return entry.ignored();
        };
        entry.release_number = Some(release);

        // The part only splits a release into several archives and takes no
        // part in ordering.
        if let Some(part) = captures.get(4) {
            match part.as_str().parse::<i32>() {
                Ok(part) => entry.release_part = Some(part),
                Err(_) => {
                    warn!(name = %object.name, reason = "invalid_release_part", "Skipping file");
                    return entry.ignored();
                },
            }
        }

        let refresh = parent_path(path) == self.refresh_dir;
        let token = &captures[2];

        let (file_type, priorities, ignore) = match token {
            "ASSIGNMENTRELEASE" => (
                file_type::ASSIGNMENT_RELEASE,
                vec![priority::ASSIGNMENT_RELEASE, release],
                true,
            ),
            "AVM" => (file_type::AVM, vec![priority::AVM, release], true),
            "BUILDINGPERMIT" => (
                file_type::BUILDING_PERMIT,
                vec![priority::BUILDING_PERMIT, release],
                true,
            ),
            "BUILDINGPERMITCLASSIFIERS" => (
                file_type::BUILDING_PERMIT_CLASSIFIERS,
                vec![priority::BUILDING_PERMIT_CLASSIFIERS, release],
                true,
            ),
            "BUILDINGPERMITDELETE" => (
                file_type::BUILDING_PERMIT_DELETE,
                vec![priority::BUILDING_PERMIT_DELETE, release],
                true,
            ),
            "BUILDINGPERMITSTATUS" => (
                file_type::BUILDING_PERMIT_STATUS,
                vec![priority::BUILDING_PERMIT_STATUS, release],
                true,
            ),
            "CF" => (file_type::CF, vec![priority::CF, release], true),
            "DAILY_FORECLOSURE" => (
                file_type::DAILY_FORECLOSURE,
                vec![
                    priority::DAILY_FORECLOSURE_GROUP,
                    priority::DAILY_FORECLOSURE_REGULAR_GROUP,
                    release,
                    priority::DAILY_FORECLOSURE,
                ],
                true,
            ),
            "REFRESH_FORECLOSURE" => (
                file_type::DAILY_FORECLOSURE,
                vec![
                    priority::DAILY_FORECLOSURE_GROUP,
                    priority::DAILY_FORECLOSURE_REFRESH_GROUP,
                    release,
                    priority::DAILY_FORECLOSURE,
                ],
                true,
            ),
            "HOA" => (file_type::HOA, vec![priority::HOA, release], true),
            "LISTINGANALYTICSCOMPLETE" => {
                if release < 316 {
                    return entry.ignored();
                }
                let file_type = if release < 347 {
                    file_type::LISTING
                } else {
                    file_type::LISTING_V20250417
                };
                (file_type, vec![priority::LISTING, release], false)
            },
            "MONTHLY_AMORTIZEDEQUITY" => (
                file_type::MONTHLY_AMORTIZED_EQUITY,
                vec![priority::MONTHLY_AMORTIZED_EQUITY, release],
                true,
            ),
            "MONTHLY_LOANMODEL" => (
                file_type::MONTHLY_LOAN_MODEL,
                vec![priority::MONTHLY_LOAN_MODEL, release],
                true,
            ),
            "PROPERTYDELETES" => (
                file_type::PROPERTY_DELETE,
                vec![
                    priority::ASSESSOR_GROUP,
                    priority::ASSESSOR_REGULAR_GROUP,
                    release,
                    priority::PROPERTY_DELETES_REGULAR,
                ],
                release < 242,
            ),
            "REFRESH_PROPERTYDELETES" => (
                file_type::PROPERTY_DELETE,
                vec![
                    priority::ASSESSOR_GROUP,
                    priority::ASSESSOR_REFRESH_GROUP,
                    release,
                    priority::PROPERTY_DELETES_REFRESH,
                ],
                false,
            ),
            "RECORDER" => (
                file_type::RECORDER,
                vec![
                    priority::RECORDER_GROUP,
                    priority::RECORDER_REGULAR_GROUP,
                    release,
                    priority::RECORDER_REGULAR,
                ],
                release < 246,
            ),
            // Only the second refresh release is loaded.
            "REFRESH_RECORDER" => (
                file_type::RECORDER,
                vec![
                    priority::RECORDER_GROUP,
                    priority::RECORDER_REFRESH_GROUP,
                    release,
                    priority::RECORDER_REFRESH,
                ],
                release != 2,
            ),
            "RECORDERDELETES" => (
                file_type::RECORDER_DELETE,
                vec![
                    priority::RECORDER_GROUP,
                    priority::RECORDER_REGULAR_GROUP,
                    release,
                    priority::RECORDER_DELETES_REGULAR,
                ],
                release < 246,
            ),
            "REFRESH_RECORDERDELETES" => (
                file_type::RECORDER_DELETE,
                vec![
                    priority::RECORDER_GROUP,
                    priority::RECORDER_REFRESH_GROUP,
                    release,
                    priority::RECORDER_DELETES_REFRESH,
                ],
                release != 2,
            ),
            "RENTALAVM" => (
                file_type::RENTAL_AVM,
                vec![priority::RENTAL_AVM, release],
                !refresh && release < 40,
            ),
            "REFRESH_RENTALAVM" => return entry.ignored(),
            "TAXASSESSOR" => (
                file_type::ASSESSOR,
                vec![
                    priority::ASSESSOR_GROUP,
                    priority::ASSESSOR_REGULAR_GROUP,
                    release,
                    priority::ASSESSOR_REGULAR,
                ],
                release < 242,
            ),
            "REFRESH_TAXASSESSOR" => (
                file_type::ASSESSOR,
                vec![
                    priority::ASSESSOR_GROUP,
                    priority::ASSESSOR_REFRESH_GROUP,
                    release,
                    priority::ASSESSOR_REFRESH,
                ],
                false,
            ),
            "XREF_PROPERTYTOBOUNDARYMATCH_PARCEL" => (
                file_type::XREF_PROPERTY_TO_BOUNDARY_MATCH_PARCEL,
                vec![priority::XREF_PROPERTY_TO_BOUNDARY_MATCH_PARCEL, release],
                true,
            ),
            _ => {
                warn!(name = %object.name, token, "Unknown data file type");
                return entry.ignored();
            },
        };

        entry.file_type = Some(file_type);
        entry.priorities = priorities;
        entry.ignore = ignore;
        entry
    }
}

impl Partner for AttomData {
    fn id(&self) -> Uuid {
        PARTNER_ID
    }

    fn name(&self) -> &'static str {
        "attom"
    }

    fn root(&self) -> &str {
        &self.root
    }

    fn separator(&self) -> char {
        '\t'
    }

    fn classify(&self, path: &str, object: &StorageObject) -> Result<DataFileEntry> {
        let entry = DataFileEntry::new(path, object);
        if object.is_directory {
            Ok(self.classify_directory(path, entry))
        } else {
            Ok(self.classify_file(path, object, entry))
        }
    }

    fn record_kind(&self, file_type: i32) -> Option<RecordKind> {
        match file_type {
            file_type::ASSESSOR => Some(RecordKind::AttomAssessor),
            file_type::LISTING => Some(RecordKind::AttomListing(ListingVersion::Original)),
            file_type::LISTING_V20250417 => Some(RecordKind::AttomListing(ListingVersion::V20250417)),
            file_type::PROPERTY_DELETE => Some(RecordKind::AttomPropertyDelete),
            file_type::RECORDER => Some(RecordKind::AttomRecorder),
            file_type::RECORDER_DELETE => Some(RecordKind::AttomRecorderDelete),
            file_type::RENTAL_AVM => Some(RecordKind::AttomRentalAvm),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn classify(dir: &str, name: &str) -> DataFileEntry {
        let partner = AttomData::new(DEFAULT_ROOT).unwrap();
        let object = StorageObject::file(dir, name, 1);
        partner.classify(&object.path(), &object).unwrap()
    }

    #[test]
    fn test_refresh_directory_is_selected() {
        let partner = AttomData::new(DEFAULT_ROOT).unwrap();
        let object = StorageObject::directory("/ftp", "Refresh");
        let entry = partner.classify("/ftp/Refresh", &object).unwrap();
        assert!(entry.selected_directory);
        assert!(entry.enter_directory);
        assert!(entry.ignore_sub_dirs);
        assert!(!entry.ignore);

        let other = StorageObject::directory("/ftp", "Archive");
        assert!(partner.classify("/ftp/Archive", &other).unwrap().ignore);
    }

    #[test]
    fn test_assessor_release() {
        let entry = classify("/ftp", "ABODEMINE_TAXASSESSOR_0250_001.zip");
        assert_eq!(entry.file_type, Some(file_type::ASSESSOR));
        assert_eq!(entry.release_number, Some(250));
        assert_eq!(entry.release_part, Some(1));
        assert_eq!(
            entry.priorities,
            vec![
                priority::ASSESSOR_GROUP,
                priority::ASSESSOR_REGULAR_GROUP,
                250,
                priority::ASSESSOR_REGULAR
            ]
        );
        assert!(!entry.ignore);

        assert!(classify("/ftp", "ABODEMINE_TAXASSESSOR_0241.zip").ignore);
    }

    #[test]
    fn test_listing_versions() {
        assert!(classify("/ftp", "ABODEMINE_LISTINGANALYTICSCOMPLETE_0315.zip").ignore);
        assert_eq!(
            classify("/ftp", "ABODEMINE_LISTINGANALYTICSCOMPLETE_0346.zip").file_type,
            Some(file_type::LISTING)
        );
        assert_eq!(
            classify("/ftp", "ABODEMINE_LISTINGANALYTICSCOMPLETE_0347.zip").file_type,
            Some(file_type::LISTING_V20250417)
        );
    }

    #[test]
    fn test_refresh_recorder_only_release_two() {
        assert!(!classify("/ftp/Refresh", "ABODEMINE_REFRESH_RECORDER_0002_003.zip").ignore);
        assert!(classify("/ftp/Refresh", "ABODEMINE_REFRESH_RECORDER_0003.zip").ignore);
        assert!(classify("/ftp/Refresh", "ABODEMINE_REFRESH_RECORDERDELETES_0001.zip").ignore);
    }

    #[test]
    fn test_rental_avm_refresh_rule() {
        assert!(classify("/ftp", "ABODEMINE_RENTALAVM_0039.zip").ignore);
        assert!(!classify("/ftp/Refresh", "ABODEMINE_RENTALAVM_0039.zip").ignore);
        assert!(classify("/ftp/Refresh", "ABODEMINE_REFRESH_RENTALAVM_0002.zip").ignore);
    }

    #[test]
    fn test_unknown_and_unmatched_names_are_ignored() {
        let entry = classify("/ftp", "ABODEMINE_SOMETHINGNEW_0010.zip");
        assert!(entry.ignore);
        assert_eq!(entry.file_type, None);

        assert!(classify("/ftp", "readme.txt").ignore);
        assert!(classify("/ftp", "ABODEMINE_TAXASSESSOR_99999999999.zip").ignore);
    }

    #[test]
    fn test_record_kinds() {
        let partner = AttomData::new(DEFAULT_ROOT).unwrap();
        assert_eq!(
            partner.record_kind(file_type::LISTING_V20250417),
            Some(RecordKind::AttomListing(ListingVersion::V20250417))
        );
        assert_eq!(partner.record_kind(file_type::HOA), None);
    }
}
