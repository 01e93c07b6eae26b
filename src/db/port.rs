//! # Database Port (Synchronous)
//!
//! Defines an abstract database interface (`Db`) and the binding contract
//! between column values and domain types.
//!
//! - [`Param`]: SQL parameters.
//! - [`Value`] / [`Row`]: generic owned column data, as drivers hand it back.
//! - [`Scanner`] / [`Valuer`]: "scan from column value" and "produce column
//!   value", implemented by [`Date`].
//! - [`Db`]: minimal operations (`fetch_one`, `fetch_all`, `exec`).
//!
//! # Example
//! ```rust
//! use wzs_date::db::port::{Row, Value};
//!
//! let mut row = Row::default();
//! row.insert("deadline", Value::Str("2012-12-12".into()));
//!
//! let deadline = row.get_date("deadline").unwrap();
//! assert_eq!(deadline.to_string(), "2012-12-12");
//! ```
use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::date::Date;

/// SQL parameter types passed to a query.
///
/// - `Str(&str)` holds a borrowed string reference.
/// - `Date` is bound through its [`Valuer`] implementation.
/// - `Null` represents an SQL NULL.
#[derive(Debug)]
pub enum Param<'a> {
    I64(i64),
    U64(u64),
    Bool(bool),
    Str(&'a str),
    Date(Date),
    Null,
}

/// Generic owned database value.
///
/// This is the closed set of shapes a driver (or a caller) may hand to
/// [`Scanner::scan`].
#[derive(Debug, Clone)]
pub enum Value {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(String),
    Bin(Vec<u8>),
    /// Driver-native DATE/DATETIME without zone; read as UTC.
    DateTime(NaiveDateTime),
    Timestamp(DateTime<FixedOffset>),
    Date(Date),
    Null,
}

impl Value {
    /// Short name of the variant's payload type, used in scan errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Bin(_) => "bytes",
            Value::DateTime(_) => "datetime",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::Null => "null",
        }
    }
}

/// Represents a single database row (column name → value map).
#[derive(Debug, Clone, Default)]
pub struct Row {
    cols: HashMap<String, Value>,
}

/// A type that can be assigned from a column value.
///
/// Implementations must treat [`Value::Null`] as "leave unchanged".
pub trait Scanner {
    type Error: std::error::Error + Send + Sync + 'static;

    fn scan(&mut self, src: &Value) -> std::result::Result<(), Self::Error>;
}

/// A type that can produce a column value.
pub trait Valuer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn value(&self) -> std::result::Result<Value, Self::Error>;
}

// ------------------------------
// Param conversions (From impls)
// ------------------------------

impl<'a> From<i64> for Param<'a> {
    fn from(x: i64) -> Self {
        Param::I64(x)
    }
}

impl<'a> From<u64> for Param<'a> {
    fn from(x: u64) -> Self {
        Param::U64(x)
    }
}

impl<'a> From<bool> for Param<'a> {
    fn from(x: bool) -> Self {
        Param::Bool(x)
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(x: &'a str) -> Self {
        Param::Str(x)
    }
}

impl<'a> From<Option<&'a str>> for Param<'a> {
    fn from(x: Option<&'a str>) -> Self {
        match x {
            Some(s) => Param::Str(s),
            None => Param::Null,
        }
    }
}

impl<'a> From<Date> for Param<'a> {
    fn from(d: Date) -> Self {
        Param::Date(d)
    }
}

impl<'a> From<&'a Date> for Param<'a> {
    fn from(d: &'a Date) -> Self {
        Param::Date(*d)
    }
}

impl<'a> From<Option<Date>> for Param<'a> {
    fn from(x: Option<Date>) -> Self {
        x.map_or(Param::Null, Param::Date)
    }
}

// ------------------------------
// Value conversions (From impls)
// ------------------------------

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bin(b.to_vec())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(dt)
    }
}

impl From<&DateTime<FixedOffset>> for Value {
    fn from(dt: &DateTime<FixedOffset>) -> Self {
        Value::Timestamp(*dt)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Value::Date(d)
    }
}

impl From<&Date> for Value {
    fn from(d: &Date) -> Self {
        Value::Date(*d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(x: Option<T>) -> Self {
        x.map_or(Value::Null, Into::into)
    }
}

// ------------------------------------
// params! macro
// ------------------------------------

/// Macro to easily build a `Vec<Param>` for SQL queries.
///
/// # Example
/// ```rust
/// use wzs_date::db::port::Param;
/// use wzs_date::{params, Date, Zone};
///
/// let deadline = Date::new(2012, 12, 11, Zone::Utc).unwrap();
/// let note: Option<&str> = None; // becomes NULL
///
/// let ps = params![42u64, "Alice", deadline, note];
/// assert!(matches!(ps[0], Param::U64(42)));
/// assert!(matches!(ps[1], Param::Str("Alice")));
/// assert!(matches!(ps[2], Param::Date(_)));
/// assert!(matches!(ps[3], Param::Null));
/// ```
#[macro_export]
macro_rules! params {
    ($($x:expr),* $(,)?) => {{
       let mut v = Vec::<$crate::db::port::Param>::new();
       $( v.push($crate::db::port::Param::from($x)); )*
          v
    }};
}

// ------------------------------
// Row helper methods
// ------------------------------

impl Row {
    /// Inserts a new column (used internally by DB adapters).
    pub fn insert(&mut self, key: impl Into<String>, val: Value) {
        self.cols.insert(key.into(), val);
    }

    /// Returns the raw column value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.cols.get(key)
    }

    /// Returns a `String` (only for `Value::Str`).
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.cols.get(key) {
            Some(Value::Str(s)) => Ok(s.clone()),
            _ => bail!("column `{key}` is not String"),
        }
    }

    /// Scans a column into a fresh `T::default()`.
    ///
    /// A `NULL` column therefore yields `T::default()`.
    pub fn scan<T: Scanner + Default>(&self, key: &str) -> Result<T> {
        let src = self
            .cols
            .get(key)
            .ok_or_else(|| anyhow!("column `{key}` not found"))?;
        let mut out = T::default();
        out.scan(src)
            .with_context(|| format!("column `{key}` ({}) cannot be scanned", src.type_name()))?;
        Ok(out)
    }

    /// Returns a [`Date`] (NULL and empty text yield the zero date).
    pub fn get_date(&self, key: &str) -> Result<Date> {
        self.scan(key)
    }

    /// Returns an optional [`Date`] (`NULL` → `None`).
    pub fn get_date_opt(&self, key: &str) -> Result<Option<Date>> {
        match self.cols.get(key) {
            Some(Value::Null) => Ok(None),
            Some(_) => self.scan(key).map(Some),
            None => bail!("column `{key}` not found"),
        }
    }
}

/// Helper to build `Vec<Param>` without using the [`params!`] macro.
pub fn params<'a>(xs: impl Into<Vec<Param<'a>>>) -> Vec<Param<'a>> {
    xs.into()
}

/// Database abstraction (synchronous).
pub trait Db: Send + Sync + 'static {
    fn fetch_one(&self, sql: &str, params: &[Param]) -> Result<Option<Row>>;

    fn fetch_all(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>>;

    /// Execute a write operation (`INSERT`, `UPDATE`, `DELETE`).
    ///
    /// Returns affected row count.
    fn exec(&self, sql: &str, params: &[Param]) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::Zone;
    use crate::error::DateError;
    use crate::params;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    fn deadline() -> Date {
        Date::new(2012, 12, 11, Zone::Utc).unwrap()
    }

    #[test]
    fn params_macro_and_from_impls_work() {
        let note: Option<&str> = None;
        let missing: Option<Date> = None;
        let d = deadline();
        let v = params![123u64, -5i64, "abc", true, note, d, &d, missing];

        assert!(matches!(v[0], Param::U64(123)));
        assert!(matches!(v[1], Param::I64(-5)));
        assert!(matches!(v[2], Param::Str("abc")));
        assert!(matches!(v[3], Param::Bool(true)));
        assert!(matches!(v[4], Param::Null));
        assert!(matches!(v[5], Param::Date(x) if x == d));
        assert!(matches!(v[6], Param::Date(x) if x == d));
        assert!(matches!(v[7], Param::Null));
    }

    #[test]
    fn params_helper_accepts_arrays() {
        let v = params([Param::from("x"), Param::Null]);
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn value_from_impls() {
        assert!(matches!(Value::from("2012-12-12"), Value::Str(s) if s == "2012-12-12"));
        assert!(matches!(Value::from(&b"x"[..]), Value::Bin(b) if b == b"x"));
        assert!(matches!(Value::from(None::<Date>), Value::Null));
        assert!(matches!(Value::from(Some(deadline())), Value::Date(_)));
    }

    #[test]
    fn row_get_date_from_text_bytes_and_native() {
        let mut r = Row::default();
        let native = NaiveDate::from_ymd_opt(2012, 12, 12)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();

        r.insert("text", Value::Str("2012-12-12".into()));
        r.insert("bytes", Value::Bin(b"2012-12-12".to_vec()));
        r.insert("native", Value::DateTime(native));
        r.insert("empty", Value::Str(String::new()));
        r.insert("null", Value::Null);

        let expected = Date::new(2012, 12, 12, Zone::Utc).unwrap();
        assert_eq!(r.get_date("text").unwrap(), expected);
        assert_eq!(r.get_date("bytes").unwrap(), expected);
        assert_eq!(r.get_date("native").unwrap(), expected);
        assert!(r.get_date("empty").unwrap().is_zero());
        assert!(r.get_date("null").unwrap().is_zero());

        assert_eq!(r.get_date_opt("text").unwrap(), Some(expected));
        assert_eq!(r.get_date_opt("null").unwrap(), None);
    }

    #[test]
    fn row_get_date_errors_keep_typed_cause() {
        let mut r = Row::default();
        r.insert("count", Value::I64(3));
        r.insert("garbage", Value::Str("12/12/2012".into()));

        let err = r.get_date("count").unwrap_err();
        assert!(err.to_string().contains("column `count` (i64)"));
        assert!(matches!(
            err.downcast_ref::<DateError>(),
            Some(DateError::Type("i64"))
        ));

        let err = r.get_date("garbage").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DateError>(),
            Some(DateError::Parse { .. })
        ));

        let err = r.get_date_opt("missing").unwrap_err().to_string();
        assert!(err.contains("not found"));
    }

    #[test]
    fn row_get_string() {
        let mut r = Row::default();
        r.insert("str", Value::Str("hello".into()));
        r.insert("num", Value::U64(1));

        assert_eq!(r.get_string("str").unwrap(), "hello");
        assert!(r.get_string("num").unwrap_err().to_string().contains("is not String"));
        assert!(matches!(r.get("num"), Some(Value::U64(1))));
    }

    /// In-memory `Db` that stores one text column, the way a `DATE` column
    /// bound to canonical text behaves.
    #[derive(Default)]
    struct MemoryDb {
        deadlines: Mutex<Vec<String>>,
    }

    impl Db for MemoryDb {
        fn fetch_one(&self, sql: &str, params: &[Param]) -> Result<Option<Row>> {
            Ok(self.fetch_all(sql, params)?.into_iter().next())
        }

        fn fetch_all(&self, _sql: &str, params: &[Param]) -> Result<Vec<Row>> {
            let filter = match params.first() {
                Some(Param::Str(s)) => Some(s.to_string()),
                Some(Param::Date(d)) => match d.value() {
                    Ok(Value::Str(s)) => Some(s),
                    other => bail!("unexpected date value {other:?}"),
                },
                _ => None,
            };
            let rows = self.deadlines.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|s| filter.as_deref().is_none_or(|f| f == s.as_str()))
                .map(|s| {
                    let mut row = Row::default();
                    row.insert("deadline", Value::Bin(s.as_bytes().to_vec()));
                    row
                })
                .collect())
        }

        fn exec(&self, _sql: &str, params: &[Param]) -> Result<u64> {
            let text = match params.first() {
                Some(Param::Str(s)) => s.to_string(),
                Some(Param::Date(d)) => d.to_string(),
                other => bail!("unsupported param {other:?}"),
            };
            self.deadlines.lock().unwrap().push(text);
            Ok(1)
        }
    }

    #[test]
    fn date_round_trips_through_a_text_column() {
        let db = MemoryDb::default();

        db.exec("INSERT INTO info (deadline) VALUES (?)", &params!["2012-12-12"])
            .unwrap();
        let row = db
            .fetch_one("SELECT deadline FROM info", &[])
            .unwrap()
            .unwrap();
        assert_eq!(row.get_date("deadline").unwrap().to_string(), "2012-12-12");

        db.exec("INSERT INTO info (deadline) VALUES (?)", &params![deadline()])
            .unwrap();
        let row = db
            .fetch_one(
                "SELECT deadline FROM info WHERE deadline = ?",
                &params!["2012-12-11"],
            )
            .unwrap()
            .expect("row stored as canonical text");
        assert_eq!(row.get_date("deadline").unwrap(), deadline());

        let rows = db
            .fetch_all("SELECT deadline FROM info WHERE deadline = ?", &params![deadline()])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
