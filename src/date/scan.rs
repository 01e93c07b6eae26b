//! Database binding for [`Date`].
//!
//! Scanning accepts whatever a driver hands back for a `DATE` column: text,
//! raw bytes, or a native date-time. Values are written as canonical
//! `YYYY-MM-DD` text, so a column written by [`Valuer::value`] compares
//! equal to a literal such as `'2012-12-11'`.

use chrono::TimeZone;

use super::{CANONICAL_LAYOUT, Date, Zone};
use crate::db::port::{Scanner, Valuer, Value};
use crate::error::DateError;

impl Date {
    fn scan_text(&mut self, text: &str) -> Result<(), DateError> {
        if text.is_empty() {
            return Ok(());
        }
        *self = Date::parse(CANONICAL_LAYOUT, text)?;
        Ok(())
    }
}

impl Scanner for Date {
    type Error = DateError;

    /// Assigns from a column value.
    ///
    /// `NULL`, empty text and empty bytes leave `self` unchanged. Numbers and
    /// booleans fail with [`DateError::Type`]. On any error `self` is left
    /// unchanged.
    fn scan(&mut self, src: &Value) -> Result<(), DateError> {
        match src {
            Value::Null => Ok(()),
            Value::Bin(bytes) => {
                if bytes.is_empty() {
                    return Ok(());
                }
                let text =
                    std::str::from_utf8(bytes).map_err(|e| DateError::decode("scan", e))?;
                self.scan_text(text)
            }
            Value::Str(text) => self.scan_text(text),
            Value::DateTime(naive) => {
                *self = Date::from_instant(Zone::Utc.from_utc_datetime(naive));
                Ok(())
            }
            Value::Timestamp(dt) => {
                *self = Date::from(*dt);
                Ok(())
            }
            Value::Date(date) => {
                *self = *date;
                Ok(())
            }
            Value::I64(_) | Value::U64(_) | Value::F64(_) | Value::Bool(_) => {
                Err(DateError::Type(src.type_name()))
            }
        }
    }
}

impl Valuer for Date {
    type Error = DateError;

    /// The canonical `YYYY-MM-DD` text.
    ///
    /// # Errors
    /// [`DateError::OutOfRange`] for years outside `0..=9999`, which have no
    /// four-digit form and could not be scanned back.
    fn value(&self) -> Result<Value, DateError> {
        if !(0..=9999).contains(&self.year()) {
            return Err(DateError::OutOfRange(format!(
                "year {} has no YYYY-MM-DD form",
                self.year()
            )));
        }
        Ok(Value::Str(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use chrono_tz::Tz;

    fn sentinel() -> Date {
        Date::new(1999, 9, 9, Zone::Named(Tz::Europe__Paris)).unwrap()
    }

    fn scanned(src: impl Into<Value>) -> Result<Date, DateError> {
        let mut d = sentinel();
        d.scan(&src.into())?;
        Ok(d)
    }

    #[test]
    fn scan_text_and_bytes() {
        let expected = Date::new(2012, 12, 12, Zone::Utc).unwrap();

        let d = scanned("2012-12-12").unwrap();
        assert_eq!(d.ymd(), (2012, 12, 12));
        assert_eq!(d, expected);

        assert_eq!(scanned(&b"2012-12-12"[..]).unwrap(), expected);
    }

    #[test]
    fn empty_and_null_leave_target_unchanged() {
        for src in [
            Value::Null,
            Value::Str(String::new()),
            Value::Bin(Vec::new()),
        ] {
            let mut d = sentinel();
            d.scan(&src).unwrap();
            assert_eq!(d, sentinel());
            assert_eq!(d.location(), sentinel().location());
        }
    }

    #[test]
    fn malformed_text_fails_and_keeps_target() {
        let mut d = sentinel();
        let err = d.scan(&Value::from("2012-13-40")).unwrap_err();
        assert!(matches!(err, DateError::Parse { .. }));
        assert_eq!(d, sentinel());

        let err = d.scan(&Value::Bin(vec![0xff, 0xfe])).unwrap_err();
        assert!(matches!(err, DateError::Decode { format: "scan", .. }));
    }

    #[test]
    fn unsupported_types_fail_with_type_error() {
        for (src, name) in [
            (Value::I64(20121212), "i64"),
            (Value::U64(1), "u64"),
            (Value::F64(1.5), "f64"),
            (Value::Bool(true), "bool"),
        ] {
            let mut d = sentinel();
            let err = d.scan(&src).unwrap_err();
            assert!(matches!(err, DateError::Type(t) if t == name));
            assert!(err.to_string().contains(name));
            assert_eq!(d, sentinel());
        }
    }

    #[test]
    fn scan_native_instants_normalizes() {
        let naive = NaiveDate::from_ymd_opt(2012, 12, 12)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let d = scanned(naive).unwrap();
        assert_eq!(d, Date::new(2012, 12, 12, Zone::Utc).unwrap());
        assert_eq!(d.clock(), (0, 0, 0));

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dt = offset.from_local_datetime(&naive).unwrap();
        let by_value = scanned(dt).unwrap();
        let by_ref = scanned(&dt).unwrap();
        assert_eq!(by_value.ymd(), (2012, 12, 12));
        assert_eq!(by_value.location(), Zone::Fixed(offset));
        assert_eq!(by_value, by_ref);
    }

    #[test]
    fn scan_date_copies() {
        let src = Date::new(2012, 12, 11, Zone::Named(Tz::Asia__Tokyo)).unwrap();

        let by_value = scanned(src).unwrap();
        assert_eq!(by_value, src);
        assert_eq!(by_value.location(), src.location());

        let by_ref = scanned(&src).unwrap();
        assert_eq!(by_ref, src);
    }

    #[test]
    fn value_is_canonical_text() {
        let d = Date::new(2012, 12, 11, Zone::Utc).unwrap();
        match d.value() {
            Ok(Value::Str(s)) => assert_eq!(s, "2012-12-11"),
            other => panic!("expected Str, got {other:?}"),
        }
    }

    #[test]
    fn value_rejects_years_without_four_digits() {
        for year in [10_000, -1] {
            let d = Date::new(year, 1, 1, Zone::Utc).unwrap();
            let err = d.value().unwrap_err();
            assert!(matches!(err, DateError::OutOfRange(_)), "{year}");
        }
        let last = Date::new(9999, 12, 31, Zone::Utc).unwrap();
        assert!(matches!(last.value(), Ok(Value::Str(s)) if s == "9999-12-31"));
    }

    #[test]
    fn value_then_scan_round_trips() {
        let d = Date::new(2012, 12, 11, Zone::Utc).unwrap();
        let v = d.value().unwrap();
        let mut back = Date::default();
        back.scan(&v).unwrap();
        assert_eq!(back, d);
    }
}
