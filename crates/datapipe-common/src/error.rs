//! Error type shared by every datapipe component
//!
//! An [`Error`] is a link in a chain. Each link carries the id of the call
//! site that produced it (a UUID literal, stable across releases so log
//! searches keep working), a machine readable [`Code`], a short detail and a
//! free-form metadata map. [`Error::forward`] wraps an error in a new link
//! with a new site id while keeping the code and detail of the original.
//!
//! ```
//! use datapipe_common::error::{Code, Error, ResultExt};
//! use uuid::uuid;
//!
//! fn parse(value: &str) -> datapipe_common::Result<i64> {
//!     value.parse::<i64>().map_err(|e| {
//!         Error::unknown(uuid!("ea466a01-9372-42f6-8bf2-50f479304830"), "Invalid integer.")
//!             .with_cause(e)
//!             .with_meta("value", value)
//!     })
//! }
//!
//! let err = parse("x")
//!     .forward(uuid!("04086d3d-0784-436a-ba1c-de6b32532310"))
//!     .unwrap_err();
//! assert_eq!(err.code, Code::Unknown);
//! assert_eq!(err.chain().count(), 2);
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Result type alias for datapipe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    InvalidArgument,
    Unknown,
    Internal,
    NotFound,
    Canceled,
}

impl Code {
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::InvalidArgument => "invalid_argument",
            Code::Unknown => "unknown",
            Code::Internal => "internal",
            Code::NotFound => "not_found",
            Code::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One link of an error chain
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{detail} [{code} {id}]")]
pub struct Error {
    pub id: Uuid,
    pub code: Code,
    pub detail: String,
    /// Message of a foreign error that started the chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[source]
    pub forwarded: Option<Box<Error>>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Error {
    pub fn new(id: Uuid, code: Code, detail: impl Into<String>) -> Self {
        Self {
            id,
            code,
            detail: detail.into(),
            cause: None,
            forwarded: None,
            meta: Map::new(),
        }
    }

    pub fn invalid_argument(id: Uuid, detail: impl Into<String>) -> Self {
        Self::new(id, Code::InvalidArgument, detail)
    }

    pub fn unknown(id: Uuid, detail: impl Into<String>) -> Self {
        Self::new(id, Code::Unknown, detail)
    }

    pub fn internal(id: Uuid, detail: impl Into<String>) -> Self {
        Self::new(id, Code::Internal, detail)
    }

    pub fn not_found(id: Uuid, detail: impl Into<String>) -> Self {
        Self::new(id, Code::NotFound, detail)
    }

    pub fn canceled(id: Uuid) -> Self {
        Self::new(id, Code::Canceled, "Operation canceled.")
    }

    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Wrap this error in a new link with the given site id.
    pub fn forward(self, id: Uuid) -> Self {
        Self {
            id,
            code: self.code,
            detail: self.detail.clone(),
            cause: None,
            forwarded: Some(Box::new(self)),
            meta: Map::new(),
        }
    }

    /// Iterate the chain from this link down to the originating one.
    pub fn chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |e| e.forwarded.as_deref())
    }

    /// The link that started the chain
    pub fn origin(&self) -> &Error {
        let mut current = self;
        while let Some(next) = current.forwarded.as_deref() {
            current = next;
        }
        current
    }

    pub fn is(&self, code: Code) -> bool {
        self.code == code
    }

    /// Serialize the whole chain, falling back to the display form.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::String(self.to_string()))
    }
}

/// Forwarding for results that already carry an [`Error`]
pub trait ResultExt<T> {
    fn forward(self, id: Uuid) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn forward(self, id: Uuid) -> Result<T> {
        self.map_err(|e| e.forward(id))
    }
}

/// Turns a foreign error into the first link of a chain. The alternate
/// display form is kept as the cause so `anyhow` contexts survive.
pub trait ErrorContext<T> {
    fn site(self, id: Uuid, code: Code, detail: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> ErrorContext<T> for std::result::Result<T, E> {
    fn site(self, id: Uuid, code: Code, detail: &str) -> Result<T> {
        self.map_err(|e| Error::new(id, code, detail).with_cause(format!("{:#}", e)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use uuid::uuid;

    const ORIGIN: Uuid = uuid!("fc3594ff-f66f-4a2b-8544-526569817a9e");
    const OUTER: Uuid = uuid!("a774b2ac-d96d-43c8-ab24-01324a74462b");

    #[test]
    fn test_forward_keeps_code_and_detail() {
        let err = Error::invalid_argument(ORIGIN, "Bad value.")
            .with_meta("value", "x")
            .forward(OUTER);

        assert_eq!(err.id, OUTER);
        assert_eq!(err.code, Code::InvalidArgument);
        assert_eq!(err.detail, "Bad value.");
        assert!(err.meta.is_empty());
        assert_eq!(err.origin().id, ORIGIN);
        assert_eq!(err.origin().meta["value"], "x");
        assert_eq!(err.chain().map(|e| e.id).collect::<Vec<_>>(), vec![OUTER, ORIGIN]);
    }

    #[test]
    fn test_site_wraps_foreign_error() {
        let res: std::result::Result<i32, std::num::ParseIntError> = "abc".parse();
        let err = res.site(ORIGIN, Code::Unknown, "Invalid integer.").unwrap_err();
        assert_eq!(err.code, Code::Unknown);
        assert!(err.cause.unwrap().contains("invalid digit"));
    }

    #[test]
    fn test_serializes_chain() {
        let err = Error::not_found(ORIGIN, "Missing.").forward(OUTER);
        let json = err.to_json();
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["id"], OUTER.to_string());
        assert_eq!(json["forwarded"]["id"], ORIGIN.to_string());
        assert!(json.get("cause").is_none());
    }

    #[test]
    fn test_display() {
        let err = Error::canceled(ORIGIN);
        assert_eq!(
            err.to_string(),
            format!("Operation canceled. [canceled {}]", ORIGIN)
        );
    }
}
