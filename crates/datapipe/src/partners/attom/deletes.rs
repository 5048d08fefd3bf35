//! Delete lists (`PROPERTYDELETES`, `RECORDERDELETES` and their refresh
//! variants). Each row names one key whose rows are soft deleted.

use uuid::uuid;

use datapipe_common::{val, Result};

use crate::records::{dispatch_fields, Headers, SqlValue};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDelete {
    pub attomid: i64,
}

impl PropertyDelete {
    pub const TABLE: &'static str = super::Assessor::TABLE;
    pub const KEY_COLUMN: &'static str = "attomid";
    pub const REQUIRED_HEADERS: &'static [&'static str] = &["[ATTOM ID]"];

    pub fn columns() -> Vec<&'static str> {
        vec![Self::KEY_COLUMN]
    }

    pub fn parse(headers: &Headers, fields: &[&str]) -> Result<Self> {
        let mut record = Self::default();
        dispatch_fields(headers, fields, |header, value| {
            if header != "[ATTOM ID]" {
                return Ok(false);
            }
            record.attomid = val::required_i64(value)
                .map_err(|e| e.forward(uuid!("112411da-900b-4e88-9a1e-05edfce7cd26")))?;
            Ok(true)
        })?;
        Ok(record)
    }

    pub fn sql_values(&mut self) -> Vec<SqlValue> {
        vec![SqlValue::from(self.attomid)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderDelete {
    pub transaction_id: i64,
}

impl RecorderDelete {
    pub const TABLE: &'static str = super::Recorder::TABLE;
    pub const KEY_COLUMN: &'static str = "transaction_id";
    pub const REQUIRED_HEADERS: &'static [&'static str] = &["TransactionID"];

    pub fn columns() -> Vec<&'static str> {
        vec![Self::KEY_COLUMN]
    }

    pub fn parse(headers: &Headers, fields: &[&str]) -> Result<Self> {
        let mut record = Self::default();
        dispatch_fields(headers, fields, |header, value| {
            if header != "TransactionID" {
                return Ok(false);
            }
            record.transaction_id = val::required_i64(value)
                .map_err(|e| e.forward(uuid!("cf851dc6-53c6-4466-9294-af1c79de8686")))?;
            Ok(true)
        })?;
        Ok(record)
    }

    pub fn sql_values(&mut self) -> Vec<SqlValue> {
        vec![SqlValue::from(self.transaction_id)]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use datapipe_common::Code;

    #[test]
    fn test_property_delete() {
        let headers = Headers::parse("[ATTOM ID]", '\t');
        let mut record = PropertyDelete::parse(&headers, &["184467"]).unwrap();
        assert_eq!(record.attomid, 184467);
        assert_eq!(record.sql_values(), vec![SqlValue::BigInt(Some(184467))]);
        assert_eq!(PropertyDelete::TABLE, "ad_df_assessor");
    }

    #[test]
    fn test_recorder_delete_rejects_empty_key() {
        let headers = Headers::parse("TransactionID", '\t');
        let err = RecorderDelete::parse(&headers, &[""]).unwrap_err();
        assert_eq!(err.code, Code::InvalidArgument);

        let headers = Headers::parse("TransactionID\tExtra", '\t');
        let err = RecorderDelete::parse(&headers, &["1", "2"]).unwrap_err();
        assert_eq!(err.meta["header"], "Extra");
    }
}
