//! Typed rows parsed from partner data files
//!
//! Every loadable file type has a record type. Records are built from one
//! line of a file: the first line of the file names the columns, every
//! following line is split on the partner's separator and each positional
//! field is routed to its destination by header name. A header the record
//! does not know is a hard error, so schema drift stops a load before any
//! data is silently dropped.
//!
//! Most record types are declared with [`data_record!`](crate::data_record),
//! which generates the struct, the header dispatch and the column and value
//! lists from a single field table. [`DataRecord`] is the sum of all record
//! types and [`RecordKind`] names a record type without holding a row.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::BoxFuture;
use serde_json::Value;
use sqlx::query_builder::Separated;
use sqlx::{Postgres, QueryBuilder};
use uuid::{uuid, Uuid};

use datapipe_common::{Error, Result};

use crate::partners::attom::{
    self, Assessor as AttomAssessor, Listing, ListingVersion, PropertyDelete, Recorder,
    RecorderDelete, RentalAvm,
};
use crate::partners::first_american::{
    self, Address, Assessor as FaAssessor, AvmPower,
};
use crate::request::Request;

/// Declares a record type from a table of `column: type = "Header" => parser`
/// rows, where `parser` names a function in `datapipe_common::val`.
///
/// The generated type holds an [`AdminHeader`] plus one public field per
/// row, and provides `TABLE`, `REQUIRED_HEADERS`, `FIELD_COLUMNS`,
/// `columns()`, `parse()` and `sql_values()`.
#[macro_export]
macro_rules! data_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident in $table:literal {
            site: $site:literal,
            required: [$($required:literal),* $(,)?],
        } {
            $( $column:ident: $ty:ty = $header:literal => $parse:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub admin: $crate::records::AdminHeader,
            $( pub $column: $ty, )*
        }

        impl $name {
            pub const TABLE: &'static str = $table;
            pub const REQUIRED_HEADERS: &'static [&'static str] = &[$($required),*];
            pub const FIELD_COLUMNS: &'static [&'static str] = &[$(stringify!($column)),*];
            const SITE: ::uuid::Uuid = ::uuid::uuid!($site);

            /// Insert columns, administrative ones first.
            pub fn columns() -> Vec<&'static str> {
                let mut columns = $crate::records::AdminHeader::COLUMNS.to_vec();
                columns.extend_from_slice(Self::FIELD_COLUMNS);
                columns
            }

            pub fn parse(
                headers: &$crate::records::Headers,
                fields: &[&str],
            ) -> ::datapipe_common::Result<Self> {
                let mut record = Self::default();
                $crate::records::dispatch_fields(headers, fields, |header, value| {
                    record.apply(header, value)
                })?;
                Ok(record)
            }

            fn apply(&mut self, header: &str, value: &str) -> ::datapipe_common::Result<bool> {
                match header {
                    $(
                        $header => {
                            self.$column = ::datapipe_common::val::$parse(value)
                                .map_err(|e| e.forward(Self::SITE).with_meta("header", header))?;
                        }
                    )*
                    _ => return Ok(false),
                }
                Ok(true)
            }

            /// Values aligned with [`Self::columns`].
            pub fn sql_values(&mut self) -> Vec<$crate::records::SqlValue> {
                let mut values = self.admin.sql_values();
                $( values.push($crate::records::SqlValue::from(self.$column.clone())); )*
                values
            }
        }
    };
}

/// Administrative columns carried by every persisted row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminHeader {
    pub am_id: Option<Uuid>,
    pub am_created_at: Option<DateTime<Utc>>,
    pub am_updated_at: Option<DateTime<Utc>>,
    pub am_meta: Option<Value>,
}

impl AdminHeader {
    pub const COLUMNS: [&'static str; 4] = ["am_id", "am_created_at", "am_updated_at", "am_meta"];

    /// Assigns the id and creation time once, and the update time on every
    /// call.
    pub fn stamp(&mut self) {
        let now = Utc::now();
        self.am_id.get_or_insert_with(Uuid::now_v7);
        self.am_created_at.get_or_insert(now);
        self.am_updated_at = Some(now);
    }

    pub fn sql_values(&mut self) -> Vec<SqlValue> {
        self.stamp();
        vec![
            SqlValue::Uuid(self.am_id),
            SqlValue::Timestamp(self.am_created_at),
            SqlValue::Timestamp(self.am_updated_at),
            SqlValue::Json(self.am_meta.clone()),
        ]
    }
}

/// A bindable column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f64>),
    Decimal(Option<BigDecimal>),
    Date(Option<NaiveDate>),
    Bool(Option<bool>),
    Uuid(Option<Uuid>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Option<Value>),
    /// WGS 84 point as `(longitude, latitude)`
    Point(Option<(f64, f64)>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::BigInt(v) => v.is_none(),
            SqlValue::Float(v) => v.is_none(),
            SqlValue::Decimal(v) => v.is_none(),
            SqlValue::Date(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Uuid(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
            SqlValue::Json(v) => v.is_none(),
            SqlValue::Point(v) => v.is_none(),
        }
    }

    /// Push this value as the next element of a `VALUES (...)` tuple.
    pub fn push_to(self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        match self {
            SqlValue::Text(v) => row.push_bind(v),
            SqlValue::Int(v) => row.push_bind(v),
            SqlValue::BigInt(v) => row.push_bind(v),
            SqlValue::Float(v) => row.push_bind(v),
            SqlValue::Decimal(v) => row.push_bind(v),
            SqlValue::Date(v) => row.push_bind(v),
            SqlValue::Bool(v) => row.push_bind(v),
            SqlValue::Uuid(v) => row.push_bind(v),
            SqlValue::Timestamp(v) => row.push_bind(v),
            SqlValue::Json(v) => row.push_bind(v),
            SqlValue::Point(None) => row.push("NULL"),
            SqlValue::Point(Some((lon, lat))) => row
                .push("ST_SetSRID(ST_MakePoint(")
                .push_bind_unseparated(lon)
                .push_unseparated(", ")
                .push_bind_unseparated(lat)
                .push_unseparated("), 4326)"),
        };
    }
}

/// Append `INSERT INTO <table> (<columns>) VALUES (...), ...` for `records`,
/// which must not be empty.
pub fn push_insert<'r>(
    builder: &mut QueryBuilder<'_, Postgres>,
    table: &str,
    columns: &[&str],
    records: impl IntoIterator<Item = &'r mut DataRecord>,
) {
    builder
        .push("INSERT INTO ")
        .push(table)
        .push(" (")
        .push(columns.join(", "))
        .push(")");
    builder.push_values(records, |mut row, record| {
        for value in record.sql_values() {
            value.push_to(&mut row);
        }
    });
}

macro_rules! sql_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Option<$ty>> for SqlValue {
                fn from(value: Option<$ty>) -> Self {
                    SqlValue::$variant(value)
                }
            }

            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(Some(value))
                }
            }
        )*
    };
}

sql_value_from! {
    String => Text,
    i32 => Int,
    i64 => BigInt,
    f64 => Float,
    BigDecimal => Decimal,
    NaiveDate => Date,
    bool => Bool,
}

/// Column names of a data file, by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headers {
    names: Vec<String>,
}

impl Headers {
    pub fn parse(line: &str, separator: char) -> Self {
        Self {
            names: line.split(separator).map(str::to_string).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Fails when a required column is absent from the header row.
    pub fn require(&self, required: &[&str]) -> Result<()> {
        for name in required {
            if !self.names.iter().any(|n| n == name) {
                return Err(Error::invalid_argument(
                    uuid!("8025a7ec-7984-4c76-b638-d09e68c61f32"),
                    "Required header is missing.",
                )
                .with_meta("header", *name));
            }
        }
        Ok(())
    }
}

/// Route each positional field to `apply` by its header name. `apply`
/// returns `false` for a header it does not know.
///
/// A row shorter than the header row still visits every header; the missing
/// trailing fields read as empty, so required columns fail as if blank.
pub fn dispatch_fields<F>(headers: &Headers, fields: &[&str], mut apply: F) -> Result<()>
where
    F: FnMut(&str, &str) -> Result<bool>,
{
    for index in 0..fields.len().max(headers.len()) {
        let header = headers.get(index).unwrap_or_default();
        let value = fields.get(index).copied().unwrap_or_default();

        if !apply(header, value)? {
            return Err(Error::invalid_argument(
                uuid!("2f202af0-13ad-4d7a-b894-d83e68d20e1e"),
                "Unknown header.",
            )
            .with_meta("index", index)
            .with_meta("value", value)
            .with_meta("header", header));
        }
    }
    Ok(())
}

/// Counts reported by one committed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub processed: u64,
    pub deleted: u64,
}

/// Batch routine of a custom load mode. It runs inside the loader's
/// transaction through the given request and must not commit.
pub type LoadFn =
    for<'a> fn(&'a Request, &'a str, &'a mut [DataRecord]) -> BoxFuture<'a, Result<BatchOutcome>>;

/// How the loader persists a batch
#[derive(Clone, Copy)]
pub enum LoadParams {
    /// One multi-row insert into the record table
    Insert,
    /// Soft delete of the rows whose key column matches the batch keys
    Delete { key_column: &'static str },
    /// A record-specific batch routine whose statement also binds the batch
    /// keys as one array parameter
    Custom(LoadFn),
}

impl std::fmt::Debug for LoadParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadParams::Insert => f.write_str("Insert"),
            LoadParams::Delete { key_column } => {
                f.debug_struct("Delete").field("key_column", key_column).finish()
            },
            LoadParams::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Loadable record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    AttomAssessor,
    AttomListing(ListingVersion),
    AttomPropertyDelete,
    AttomRecorder,
    AttomRecorderDelete,
    AttomRentalAvm,
    FaAddress,
    FaAssessor,
    FaAvmPower,
}

impl RecordKind {
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::AttomAssessor => AttomAssessor::TABLE,
            RecordKind::AttomListing(_) => Listing::TABLE,
            RecordKind::AttomPropertyDelete => PropertyDelete::TABLE,
            RecordKind::AttomRecorder => Recorder::TABLE,
            RecordKind::AttomRecorderDelete => RecorderDelete::TABLE,
            RecordKind::AttomRentalAvm => RentalAvm::TABLE,
            RecordKind::FaAddress => Address::TABLE,
            RecordKind::FaAssessor => FaAssessor::TABLE,
            RecordKind::FaAvmPower => AvmPower::TABLE,
        }
    }

    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            RecordKind::AttomAssessor => AttomAssessor::columns(),
            RecordKind::AttomListing(version) => Listing::versioned_columns(*version),
            RecordKind::AttomPropertyDelete => PropertyDelete::columns(),
            RecordKind::AttomRecorder => Recorder::columns(),
            RecordKind::AttomRecorderDelete => RecorderDelete::columns(),
            RecordKind::AttomRentalAvm => RentalAvm::columns(),
            RecordKind::FaAddress => Address::insert_columns(),
            RecordKind::FaAssessor => FaAssessor::columns(),
            RecordKind::FaAvmPower => AvmPower::columns(),
        }
    }

    pub fn required_headers(&self) -> &'static [&'static str] {
        match self {
            RecordKind::AttomAssessor => AttomAssessor::REQUIRED_HEADERS,
            RecordKind::AttomListing(_) => Listing::REQUIRED_HEADERS,
            RecordKind::AttomPropertyDelete => PropertyDelete::REQUIRED_HEADERS,
            RecordKind::AttomRecorder => Recorder::REQUIRED_HEADERS,
            RecordKind::AttomRecorderDelete => RecorderDelete::REQUIRED_HEADERS,
            RecordKind::AttomRentalAvm => RentalAvm::REQUIRED_HEADERS,
            RecordKind::FaAddress => Address::REQUIRED_HEADERS,
            RecordKind::FaAssessor => FaAssessor::REQUIRED_HEADERS,
            RecordKind::FaAvmPower => AvmPower::REQUIRED_HEADERS,
        }
    }

    pub fn load_params(&self) -> LoadParams {
        match self {
            RecordKind::AttomAssessor => LoadParams::Custom(attom::assessor::load_batch),
            RecordKind::AttomPropertyDelete => LoadParams::Delete {
                key_column: PropertyDelete::KEY_COLUMN,
            },
            RecordKind::AttomRecorderDelete => LoadParams::Delete {
                key_column: RecorderDelete::KEY_COLUMN,
            },
            RecordKind::FaAssessor => LoadParams::Custom(first_american::assessor::load_batch),
            RecordKind::AttomListing(_)
            | RecordKind::AttomRecorder
            | RecordKind::AttomRentalAvm
            | RecordKind::FaAddress
            | RecordKind::FaAvmPower => LoadParams::Insert,
        }
    }

    pub fn parse(&self, headers: &Headers, fields: &[&str]) -> Result<DataRecord> {
        Ok(match self {
            RecordKind::AttomAssessor => DataRecord::AttomAssessor(AttomAssessor::parse(headers, fields)?),
            RecordKind::AttomListing(version) => {
                DataRecord::AttomListing(Listing::parse(headers, fields)?, *version)
            },
            RecordKind::AttomPropertyDelete => {
                DataRecord::AttomPropertyDelete(PropertyDelete::parse(headers, fields)?)
            },
            RecordKind::AttomRecorder => DataRecord::AttomRecorder(Recorder::parse(headers, fields)?),
            RecordKind::AttomRecorderDelete => {
                DataRecord::AttomRecorderDelete(RecorderDelete::parse(headers, fields)?)
            },
            RecordKind::AttomRentalAvm => DataRecord::AttomRentalAvm(RentalAvm::parse(headers, fields)?),
            RecordKind::FaAddress => DataRecord::FaAddress(Address::parse(headers, fields)?),
            RecordKind::FaAssessor => DataRecord::FaAssessor(FaAssessor::parse(headers, fields)?),
            RecordKind::FaAvmPower => DataRecord::FaAvmPower(AvmPower::parse(headers, fields)?),
        })
    }
}

/// One parsed row of any loadable file type
#[derive(Debug, Clone, PartialEq)]
pub enum DataRecord {
    AttomAssessor(AttomAssessor),
    AttomListing(Listing, ListingVersion),
    AttomPropertyDelete(PropertyDelete),
    AttomRecorder(Recorder),
    AttomRecorderDelete(RecorderDelete),
    AttomRentalAvm(RentalAvm),
    FaAddress(Address),
    FaAssessor(FaAssessor),
    FaAvmPower(AvmPower),
}

impl DataRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            DataRecord::AttomAssessor(_) => RecordKind::AttomAssessor,
            DataRecord::AttomListing(_, version) => RecordKind::AttomListing(*version),
            DataRecord::AttomPropertyDelete(_) => RecordKind::AttomPropertyDelete,
            DataRecord::AttomRecorder(_) => RecordKind::AttomRecorder,
            DataRecord::AttomRecorderDelete(_) => RecordKind::AttomRecorderDelete,
            DataRecord::AttomRentalAvm(_) => RecordKind::AttomRentalAvm,
            DataRecord::FaAddress(_) => RecordKind::FaAddress,
            DataRecord::FaAssessor(_) => RecordKind::FaAssessor,
            DataRecord::FaAvmPower(_) => RecordKind::FaAvmPower,
        }
    }

    pub fn sql_table(&self) -> &'static str {
        self.kind().table()
    }

    pub fn sql_columns(&self) -> Vec<&'static str> {
        self.kind().columns()
    }

    pub fn sql_values(&mut self) -> Vec<SqlValue> {
        match self {
            DataRecord::AttomAssessor(r) => r.sql_values(),
            DataRecord::AttomListing(r, version) => r.versioned_values(*version),
            DataRecord::AttomPropertyDelete(r) => r.sql_values(),
            DataRecord::AttomRecorder(r) => r.sql_values(),
            DataRecord::AttomRecorderDelete(r) => r.sql_values(),
            DataRecord::AttomRentalAvm(r) => r.sql_values(),
            DataRecord::FaAddress(r) => r.insert_values(),
            DataRecord::FaAssessor(r) => r.sql_values(),
            DataRecord::FaAvmPower(r) => r.sql_values(),
        }
    }

    pub fn load_params(&self) -> LoadParams {
        self.kind().load_params()
    }

    /// Primary key of record types that are loaded by key
    pub fn key(&self) -> Option<i64> {
        match self {
            DataRecord::AttomAssessor(r) => Some(r.attomid),
            DataRecord::AttomPropertyDelete(r) => Some(r.attomid),
            DataRecord::AttomRecorderDelete(r) => Some(r.transaction_id),
            DataRecord::FaAssessor(r) => Some(r.property_id),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use datapipe_common::Code;

    #[test]
    fn test_admin_header_stamps_once() {
        let mut admin = AdminHeader::default();
        let first = admin.sql_values();
        let id = admin.am_id.unwrap();
        let created = admin.am_created_at.unwrap();

        let second = admin.sql_values();
        assert_eq!(first.len(), 4);
        assert_eq!(admin.am_id.unwrap(), id);
        assert_eq!(admin.am_created_at.unwrap(), created);
        assert_eq!(second[0], SqlValue::Uuid(Some(id)));
        assert!(admin.am_updated_at.unwrap() >= created);
        assert!(second[3].is_null());
    }

    #[test]
    fn test_dispatch_fields_rejects_extra_field() {
        let headers = Headers::parse("A\tB", '\t');
        let err = dispatch_fields(&headers, &["1", "2", "3"], |_, _| Ok(true)).unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);
        assert_eq!(err.meta["index"], 2);
        assert_eq!(err.meta["value"], "3");
        assert_eq!(err.meta["header"], "");
    }

    #[test]
    fn test_dispatch_fields_rejects_unknown_header() {
        let headers = Headers::parse("Known|Surprise", '|');
        let err = dispatch_fields(&headers, &["a", "b"], |h, _| Ok(h == "Known")).unwrap_err();
        assert_eq!(err.meta["header"], "Surprise");
        assert_eq!(err.meta["index"], 1);
    }

    #[test]
    fn test_dispatch_fields_visits_missing_trailing_fields() {
        let headers = Headers::parse("A\tB\tC", '\t');
        let mut seen = Vec::new();
        dispatch_fields(&headers, &["1"], |h, v| {
            seen.push((h.to_string(), v.to_string()));
            Ok(true)
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), String::new()),
                ("C".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_short_row_without_required_field_is_rejected() {
        let headers = Headers::parse("PropertyAddressFull\t[ATTOM ID]", '\t');
        let err = RecordKind::AttomRentalAvm.parse(&headers, &["1 Main St"]).unwrap_err();
        assert_eq!(err.meta["header"], "[ATTOM ID]");
        assert_eq!(err.origin().code, Code::InvalidArgument);

        let headers = Headers::parse("TransactionID\tExtra", '\t');
        assert!(RecordKind::AttomRecorderDelete.parse(&headers, &[]).is_err());

        // Optional trailing columns may still be cut off.
        let headers = Headers::parse("[ATTOM ID]\tPropertyAddressFull", '\t');
        match RecordKind::AttomRentalAvm.parse(&headers, &["42"]).unwrap() {
            DataRecord::AttomRentalAvm(r) => {
                assert_eq!(r.attomid, 42);
                assert_eq!(r.property_address_full, None);
            },
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn test_headers_require() {
        let headers = Headers::parse("FIPS|APN", '|');
        assert!(headers.require(&["FIPS"]).is_ok());
        let err = headers.require(&["FIPS", "PropertyID"]).unwrap_err();
        assert_eq!(err.meta["header"], "PropertyID");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_columns_match_values_for_every_kind() {
        let kinds = [
            RecordKind::AttomAssessor,
            RecordKind::AttomListing(ListingVersion::Original),
            RecordKind::AttomListing(ListingVersion::V20250417),
            RecordKind::AttomRecorder,
            RecordKind::AttomRentalAvm,
            RecordKind::AttomPropertyDelete,
            RecordKind::AttomRecorderDelete,
            RecordKind::FaAddress,
            RecordKind::FaAssessor,
            RecordKind::FaAvmPower,
        ];

        for kind in kinds {
            let required = kind.required_headers();
            let headers = Headers::parse(&required.join("\t"), '\t');
            let fields: Vec<&str> = required
                .iter()
                .map(|h| if h.contains("Date") { "04/03/2025" } else { "7" })
                .collect();

            let mut record = kind.parse(&headers, &fields).unwrap();
            assert_eq!(record.kind(), kind);
            assert_eq!(
                record.sql_columns().len(),
                record.sql_values().len(),
                "{:?}",
                kind
            );
        }
    }
}
