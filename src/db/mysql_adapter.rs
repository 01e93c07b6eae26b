//! # MySQL Database Adapter
//!
//! An implementation of the [`Db`] port using the [`mysql`] driver crate.
//!
//! ## Responsibilities
//! - Convert generic [`Param`] values into [`mysql::Value`]; dates go through
//!   [`Valuer`] and are bound as canonical `YYYY-MM-DD` text
//! - Convert [`mysql::Row`] into a generic [`Row`] whose values [`Date`]
//!   can scan
//! - Implement `fetch_one`, `fetch_all` and `exec` using `mysql::Pool`
//!
//! ## Logging
//! Statements and parameters are logged with `tracing` at `debug`, failures
//! at `error`. With `sql_debug` on, a failure also logs the connected user
//! and database.
//!
//! ## Testing Policy
//! - Unit tests cover the pure conversion functions.
//! - `tests/mysql_date.rs` exercises a live server (ignored by default).
//!
//! [`Date`]: crate::date::Date

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mysql::{Error as MyError, Params, Pool, Value as My, prelude::*};
use tracing::{debug, error};

use crate::db::port::{Db, Param, Row as GRow, Valuer, Value};

#[inline]
fn mysql_err_summary(e: &MyError) -> String {
    match e {
        MyError::MySqlError(me) => format!(
            "code={}, state={}, message={}",
            me.code, me.state, me.message
        ),
        MyError::DriverError(de) => format!("driver={de:?}"),
        MyError::UrlError(ue) => format!("url={ue:?}"),
        MyError::IoError(ioe) => format!("io={ioe}"),
        MyError::CodecError(ce) => format!("codec={ce:?}"),
        MyError::FromValueError(fve) => format!("from_value={fve:?}"),
        MyError::FromRowError(fre) => format!("from_row={fre:?}"),
    }
}

/// MySQL implementation of the [`Db`] port.
///
/// - Wraps a connection pool (`mysql::Pool`) for query execution.
/// - Propagates errors as [`anyhow::Error`].
#[derive(Clone)]
pub struct MySqlDb {
    pool: Arc<Pool>,
    sql_debug: bool,
}

impl MySqlDb {
    /// Creates a new adapter instance using the provided connection pool.
    pub fn new(pool: Arc<Pool>) -> Self {
        Self {
            pool,
            sql_debug: false,
        }
    }

    /// Enables the extra failure diagnostics (`SQL_DEBUG`).
    pub fn with_sql_debug(mut self, on: bool) -> Self {
        self.sql_debug = on;
        self
    }

    /// Converts a single [`Param`] into a [`mysql::Value`].
    ///
    /// Mapping conventions:
    /// - `Bool(true)` → `Int(1)` / `Bool(false)` → `Int(0)`
    /// - `Str` → `Bytes`
    /// - `Date` → its [`Valuer`] value, i.e. `Bytes("YYYY-MM-DD")`
    /// - `Null` → `NULL`
    ///
    /// Fails for dates that have no `YYYY-MM-DD` form.
    #[inline]
    fn to_mysql_value(p: &Param) -> Result<My> {
        Ok(match p {
            Param::I64(x) => My::Int(*x),
            Param::U64(x) => My::UInt(*x),
            Param::Bool(b) => My::Int(if *b { 1 } else { 0 }),
            Param::Str(s) => My::Bytes(s.as_bytes().to_vec()),
            Param::Date(d) => match d.value().with_context(|| format!("cannot bind date {d}"))? {
                Value::Str(s) => My::Bytes(s.into_bytes()),
                other => bail!("date bound as unexpected {} value", other.type_name()),
            },
            Param::Null => My::NULL,
        })
    }

    /// Converts a slice of [`Param`] into a positional [`Params`].
    #[inline]
    fn to_mysql_params(params_in: &[Param]) -> Result<Params> {
        if params_in.is_empty() {
            return Ok(Params::Empty);
        }
        let v = params_in
            .iter()
            .map(Self::to_mysql_value)
            .collect::<Result<Vec<My>>>()?;
        Ok(Params::Positional(v))
    }

    /// Converts one [`mysql::Value`] into a generic [`Value`].
    ///
    /// `DATE`/`DATETIME` arrive as `Value::DateTime` (binary protocol) or as
    /// text bytes (text protocol); both scan into a date.
    fn value_from_mysql(v: My) -> Value {
        match v {
            My::NULL => Value::Null,
            My::Int(i) => Value::I64(i),
            My::UInt(u) => Value::U64(u),
            My::Float(f) => Value::F64(f.into()),
            My::Double(f) => Value::F64(f),

            // BLOB/TEXT, and DATE columns over the text protocol
            My::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => Value::Str(s),
                Err(e) => Value::Bin(e.into_bytes()),
            },

            My::Date(y, m, d, hh, mm, ss, micro) => {
                let date = NaiveDate::from_ymd_opt(y.into(), m.into(), d.into());
                let time =
                    NaiveTime::from_hms_micro_opt(hh.into(), mm.into(), ss.into(), micro);
                match (date, time) {
                    (Some(date), Some(time)) => Value::DateTime(NaiveDateTime::new(date, time)),
                    // zero dates such as '0000-00-00'
                    _ => Value::Null,
                }
            }

            My::Time(neg, days, hh, mm, ss, micro) => {
                let sign = if neg { "-" } else { "" };
                let s = if micro > 0 {
                    format!("{sign}{days:03} {hh:02}:{mm:02}:{ss:02}.{micro:06}")
                } else {
                    format!("{sign}{days:03} {hh:02}:{mm:02}:{ss:02}")
                };
                Value::Str(s)
            }
        }
    }

    /// Converts a [`mysql::Row`] into a generic [`Row`].
    fn row_from_mysql(mut r: mysql::Row) -> GRow {
        // copy names first; `take_opt` needs `r` mutably
        let names: Vec<String> = r
            .columns_ref()
            .iter()
            .map(|c| c.name_str().to_string())
            .collect();

        let mut out = GRow::default();
        for (idx, name) in names.into_iter().enumerate() {
            let v = r
                .take_opt::<My, _>(idx)
                .unwrap_or(Ok(My::NULL))
                .unwrap_or(My::NULL);
            out.insert(name, Self::value_from_mysql(v));
        }
        out
    }

    fn log_statement(op: &str, sql: &str, params_in: &[Param]) {
        debug!(op, sql, "about to run");
        for (i, p) in params_in.iter().enumerate() {
            debug!("param[{i}] = {:?}", p);
        }
    }

    fn log_failure(&self, op: &str, e: &MyError, conn: &mut mysql::PooledConn) {
        error!(op, "{} failed: {}", op, mysql_err_summary(e));
        if !self.sql_debug {
            return;
        }
        if let Ok(Some(row)) = conn.query_first::<(String, String, String, String), _>(
            "SELECT CURRENT_USER(), USER(), DATABASE(), @@hostname",
        ) {
            debug!("who/where = {:?}", row);
        }
    }
}

impl Db for MySqlDb {
    fn fetch_one(&self, sql: &str, params_in: &[Param]) -> Result<Option<GRow>> {
        let params = Self::to_mysql_params(params_in)?;
        let mut conn = self.pool.get_conn().context("get_conn failed")?;
        Self::log_statement("exec_first", sql, params_in);

        let res: std::result::Result<Option<mysql::Row>, MyError> = conn.exec_first(sql, params);
        if let Err(ref e) = res {
            self.log_failure("exec_first", e, &mut conn);
        }
        let row_opt = res.context("exec_first failed")?;
        debug!(row_present = row_opt.is_some(), "fetch_one");

        Ok(row_opt.map(Self::row_from_mysql))
    }

    fn fetch_all(&self, sql: &str, params_in: &[Param]) -> Result<Vec<GRow>> {
        let params = Self::to_mysql_params(params_in)?;
        let mut conn = self.pool.get_conn().context("get_conn failed")?;
        Self::log_statement("exec", sql, params_in);

        let res: std::result::Result<Vec<mysql::Row>, MyError> = conn.exec(sql, params);
        if let Err(ref e) = res {
            self.log_failure("exec", e, &mut conn);
        }
        let rows = res.context("exec (fetch_all) failed")?;
        debug!(rows = rows.len(), "fetch_all");

        Ok(rows.into_iter().map(Self::row_from_mysql).collect())
    }

    fn exec(&self, sql: &str, params_in: &[Param]) -> Result<u64> {
        let params = Self::to_mysql_params(params_in)?;
        let mut conn = self.pool.get_conn().context("get_conn failed")?;
        Self::log_statement("exec_drop", sql, params_in);

        let res: std::result::Result<(), MyError> = conn.exec_drop(sql, params);
        if let Err(ref e) = res {
            self.log_failure("exec_drop", e, &mut conn);
        }
        res.context("exec_drop failed")?;

        let n = conn.affected_rows();
        debug!(affected_rows = n, "exec");
        Ok(n)
    }
}
