//! String to value coercion for partner data files
//!
//! Every field in a partner file arrives as text. The functions here turn a
//! raw field into a typed value. Optional variants map the empty string to
//! `None` and parse anything else strictly; required variants reject the
//! empty string. Failures carry the offending value under `meta.value`.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use uuid::{uuid, Uuid};

use crate::error::{Error, Result};

/// `YYYYMMDD`
pub const INTEGER_DATE: &str = "%Y%m%d";
/// `YYYY-MM-DD`
pub const ISO_DATE: &str = "%Y-%m-%d";
/// `MM/DD/YYYY`
pub const US_SLASH_DATE: &str = "%m/%d/%Y";

/// Date stored when a partner leaves its last-updated column blank
pub fn sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1800, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn string(s: &str) -> Result<Option<String>> {
    if s.is_empty() {
        return Ok(None);
    }
    Ok(Some(s.to_string()))
}

pub fn required_string(s: &str) -> Result<String> {
    if s.is_empty() {
        return Err(Error::invalid_argument(
            uuid!("7aba7bec-e2ec-4172-8607-f7cbcd2ebd3b"),
            "Required value is empty.",
        ));
    }
    Ok(s.to_string())
}

fn number<T>(s: &str, id: Uuid, detail: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| {
        Error::unknown(id, detail)
            .with_cause(e)
            .with_meta("value", s)
    })
}

pub fn i32(s: &str) -> Result<Option<i32>> {
    if s.is_empty() {
        return Ok(None);
    }
    number(s, uuid!("f4f8db08-e2ba-4284-9d92-2e338c7fed68"), "Invalid integer.").map(Some)
}

pub fn i64(s: &str) -> Result<Option<i64>> {
    if s.is_empty() {
        return Ok(None);
    }
    number(s, uuid!("18e05e70-3143-45f8-bd67-07fee3abbf1d"), "Invalid integer.").map(Some)
}

pub fn required_i64(s: &str) -> Result<i64> {
    if s.is_empty() {
        return Err(Error::invalid_argument(
            uuid!("cbf3188f-a14d-46a1-af4b-099597551972"),
            "Required integer is empty.",
        ));
    }
    number(s, uuid!("c3fecf2a-dee1-4fa7-b99c-6a76bbb5cca7"), "Invalid integer.")
}

pub fn f64(s: &str) -> Result<Option<f64>> {
    if s.is_empty() {
        return Ok(None);
    }
    number(s, uuid!("29df696d-e00e-4060-a1d6-96ea9176e7ea"), "Invalid float.").map(Some)
}

/// Fixed precision decimal, parsed without going through a float.
pub fn decimal(s: &str) -> Result<Option<BigDecimal>> {
    if s.is_empty() {
        return Ok(None);
    }
    number(s, uuid!("447973a0-297d-4a2e-a8d7-1aea18c19e1f"), "Invalid decimal.").map(Some)
}

/// Integer column that a partner writes in float notation (`"3.0"`).
/// The fractional part is truncated.
pub fn i32_from_f64(s: &str) -> Result<Option<i32>> {
    if s.is_empty() {
        return Ok(None);
    }
    let value: f64 = number(s, uuid!("6fd48e3e-af6c-4476-9878-ed706c2ad465"), "Invalid float.")?;
    Ok(Some(value.trunc() as i32))
}

/// Strict boolean: `1 t T TRUE true True 0 f F FALSE false False`.
pub fn bool(s: &str) -> Result<Option<bool>> {
    if s.is_empty() {
        return Ok(None);
    }
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Some(true)),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Some(false)),
        _ => Err(Error::invalid_argument(
            uuid!("78db4c5b-7c2b-4b50-908e-86ff7ae66b93"),
            "Invalid boolean.",
        )
        .with_meta("value", s)),
    }
}

/// Boolean that may also be written as `Y`/`N` in either case.
pub fn yn_bool(s: &str) -> Result<Option<bool>> {
    let upper = s.to_uppercase();
    let normalized = match upper.as_str() {
        "Y" => "t",
        "N" => "f",
        _ => s,
    };
    bool(normalized)
}

/// Exactly `Y`, `N` or empty.
pub fn yn(s: &str) -> Result<Option<bool>> {
    match s {
        "" => Ok(None),
        "Y" => Ok(Some(true)),
        "N" => Ok(Some(false)),
        _ => Err(Error::invalid_argument(
            uuid!("f297f77f-07a3-45a7-be98-63c4985bd9cf"),
            "Invalid Y/N value.",
        )
        .with_meta("value", s)),
    }
}

fn date(s: &str, layout: &str, id: Uuid) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, layout).map_err(|e| {
        Error::invalid_argument(id, "Invalid date.")
            .with_cause(e)
            .with_meta("value", s)
            .with_meta("layout", layout)
    })
}

/// `YYYYMMDD`; empty and `0` mean no date.
pub fn date_int(s: &str) -> Result<Option<NaiveDate>> {
    if s.is_empty() || s == "0" {
        return Ok(None);
    }
    date(s, INTEGER_DATE, uuid!("79a3ea81-72e3-4347-89da-f4e5dc26391e")).map(Some)
}

pub fn date_iso(s: &str) -> Result<Option<NaiveDate>> {
    if s.is_empty() {
        return Ok(None);
    }
    date(s, ISO_DATE, uuid!("9cfa25f3-8be1-4899-95ef-cc2e92c88665")).map(Some)
}

/// `YYYY-MM-DD`, with an empty value stored as [`sentinel_date`].
pub fn date_iso_or_sentinel(s: &str) -> Result<Option<NaiveDate>> {
    if s.is_empty() {
        return Ok(Some(sentinel_date()));
    }
    date(s, ISO_DATE, uuid!("c207529a-4910-487c-9d9f-cee21a11da2c")).map(Some)
}

pub fn date_us(s: &str) -> Result<Option<NaiveDate>> {
    if s.is_empty() {
        return Ok(None);
    }
    date(s, US_SLASH_DATE, uuid!("a6f9f54f-e14e-4af5-bf80-01ef8bd5dcf2")).map(Some)
}

pub fn required_date_us(s: &str) -> Result<NaiveDate> {
    if s.is_empty() {
        return Err(Error::invalid_argument(
            uuid!("280f16d9-17f2-40fd-b9e5-06e61c7d71f4"),
            "Required date is empty.",
        ));
    }
    date(s, US_SLASH_DATE, uuid!("9a773891-288e-4dd8-87de-0373a0351436"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::Code;
    use proptest::prelude::*;

    #[test]
    fn test_string() {
        assert_eq!(string("").unwrap(), None);
        assert_eq!(string(" a ").unwrap(), Some(" a ".to_string()));
        assert_eq!(required_string("x").unwrap(), "x");
        assert_eq!(required_string("").unwrap_err().code, Code::InvalidArgument);
    }

    #[test]
    fn test_integers() {
        assert_eq!(i32("").unwrap(), None);
        assert_eq!(i32("-12").unwrap(), Some(-12));
        assert_eq!(i64("9000000000").unwrap(), Some(9_000_000_000));
        assert_eq!(required_i64("42").unwrap(), 42);

        let err = i32("1.5").unwrap_err();
        assert_eq!(err.code, Code::Unknown);
        assert_eq!(err.meta["value"], "1.5");
        assert_eq!(required_i64("").unwrap_err().code, Code::InvalidArgument);
    }

    #[test]
    fn test_decimal_keeps_precision() {
        let value = decimal("0.1000000000000000055511151231257827").unwrap().unwrap();
        let (_, scale) = value.as_bigint_and_exponent();
        assert_eq!(scale, 34);
        assert_eq!(decimal("").unwrap(), None);
        assert!(decimal("12,5").is_err());
    }

    #[test]
    fn test_i32_from_f64_truncates() {
        assert_eq!(i32_from_f64("3.0").unwrap(), Some(3));
        assert_eq!(i32_from_f64("3.9").unwrap(), Some(3));
        assert_eq!(i32_from_f64("").unwrap(), None);
        assert!(i32_from_f64("three").is_err());
    }

    #[test]
    fn test_bool_variants() {
        assert_eq!(bool("t").unwrap(), Some(true));
        assert_eq!(bool("False").unwrap(), Some(false));
        assert!(bool("Y").is_err());

        assert_eq!(yn_bool("Y").unwrap(), Some(true));
        assert_eq!(yn_bool("n").unwrap(), Some(false));
        assert_eq!(yn_bool("").unwrap(), None);
        assert_eq!(yn_bool("maybe").unwrap_err().code, Code::InvalidArgument);

        assert_eq!(yn("Y").unwrap(), Some(true));
        assert_eq!(yn("N").unwrap(), Some(false));
        assert_eq!(yn("").unwrap(), None);
        assert!(yn("y").is_err());
    }

    #[test]
    fn test_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        assert_eq!(date_int("20250403").unwrap(), Some(d));
        assert_eq!(date_int("0").unwrap(), None);
        assert_eq!(date_int("").unwrap(), None);
        assert_eq!(date_iso("2025-04-03").unwrap(), Some(d));
        assert_eq!(date_us("04/03/2025").unwrap(), Some(d));
        assert_eq!(required_date_us("04/03/2025").unwrap(), d);
        assert_eq!(date_iso_or_sentinel("").unwrap(), Some(sentinel_date()));
        assert_eq!(sentinel_date().to_string(), "1800-01-01");

        let err = date_int("20251301").unwrap_err();
        assert_eq!(err.meta["layout"], INTEGER_DATE);
    }

    proptest! {
        #[test]
        fn prop_string_none_iff_empty(s in ".*") {
            prop_assert_eq!(string(&s).unwrap().is_none(), s.is_empty());
        }

        #[test]
        fn prop_yn_bool_matches_upper(s in "[yYnN]") {
            prop_assert_eq!(yn_bool(&s).unwrap(), Some(s.to_uppercase() == "Y"));
        }
    }
}
