//! Search documents and the index mappings generated from them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Name of the index holding per-FIPS progress.
pub const FIPS_STATUS_INDEX: &str = "fips_processing_status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingType {
    Keyword,
    Text,
    Date,
    GeoPoint,
    Boolean,
    Integer,
    /// Stored but not searchable
    Store,
}

impl MappingType {
    pub fn property(self) -> Value {
        match self {
            Self::Keyword => json!({ "type": "keyword" }),
            Self::Text => json!({ "type": "text" }),
            Self::Date => json!({ "type": "date" }),
            Self::GeoPoint => json!({ "type": "geo_point" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Store => json!({ "type": "keyword", "index": "false" }),
        }
    }
}

/// Declares a document struct together with the mapping type of each field.
macro_rules! search_document {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident: $ty:ty => $mapping:ident,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        impl $name {
            pub const FIELDS: &'static [(&'static str, MappingType)] = &[
                $((stringify!($field), MappingType::$mapping),)*
            ];

            /// Index creation body with settings and a strict mapping.
            pub fn index_body() -> Value {
                build_index_body(Self::FIELDS)
            }
        }
    };
}

search_document! {
    /// One address as served by the search alias
    pub struct AddressDocument {
        am_id: String => Keyword,
        am_updated_at: DateTime<Utc> => Date,
        property_id: Option<String> => Keyword,
        ad_attom_id: Option<i64> => Keyword,
        fa_property_id: Option<i64> => Keyword,
        full_address: Option<String> => Text,
        fips: String => Keyword,
        state: Option<String> => Keyword,
        state_full_name: Option<String> => Text,
        county: Option<String> => Text,
        zip5: String => Keyword,
        pre_directional: Option<String> => Keyword,
        street_number: Option<String> => Keyword,
        street: Option<String> => Text,
        post_directional: Option<String> => Keyword,
        street_type: Option<String> => Keyword,
        unit_type: Option<String> => Keyword,
        unit_nbr: Option<String> => Keyword,
        city: Option<String> => Keyword,
        source: Option<String> => Keyword,
        /// `"lat,lon"`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<String> => GeoPoint,
    }
}

search_document! {
    /// Progress of one FIPS code, keyed by the code
    pub struct FipsProcessingStatus {
        fips: String => Keyword,
        processed: bool => Boolean,
        count: i64 => Integer,
        started_at: DateTime<Utc> => Date,
        finished_at: Option<DateTime<Utc>> => Date,
        error: Option<String> => Text,
    }
}

impl FipsProcessingStatus {
    pub fn started(fips: impl Into<String>) -> Self {
        Self {
            fips: fips.into(),
            processed: false,
            count: 0,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }

    pub fn finish(mut self, count: i64, error: Option<String>) -> Self {
        self.processed = true;
        self.count = count;
        self.finished_at = Some(Utc::now());
        self.error = error;
        self
    }
}

fn build_index_body(fields: &[(&str, MappingType)]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|(name, mapping)| (name.to_string(), mapping.property()))
        .collect();

    json!({
        "settings": {
            "index": {
                "number_of_shards": 1,
                "number_of_replicas": 1
            }
        },
        "mappings": {
            "dynamic": "strict",
            "properties": properties
        }
    })
}

/// Compare two `mappings` sections. The cluster echoes some scalars with a
/// different JSON type than they were sent with (`"false"` comes back as
/// `false`), so scalars are compared by their string form.
pub fn mappings_equal(a: &Value, b: &Value) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), normalize(v))).collect()),
        Value::Array(items) => Value::Array(items.iter().map(normalize).collect()),
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        other => other.clone(),
    }
}
