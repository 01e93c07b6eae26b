//! # Calendar Date Value
//!
//! [`Date`] is a date-time instant truncated to day granularity: the wrapped
//! [`chrono::DateTime`] always sits at midnight of its own [`Zone`].
//!
//! The type is meant to be used as a domain-model field that travels through
//! a relational database (see [`crate::db::port::Scanner`] and
//! [`crate::db::port::Valuer`]), JSON, RFC 3339 text and a compact binary
//! layout.
//!
//! # Normalization
//! Every constructor, arithmetic operation, zone conversion and decoder
//! passes through [`Date::from_instant`], which rewrites the instant to
//! midnight of the same local date in the same zone. There is no lazily
//! initialized state: [`Date::default`] is the normalized zero date
//! `0001-01-01T00:00:00Z`.
//!
//! # Comparison
//! Comparison is by absolute instant. `2012-12-11` in UTC and `2012-12-11` in
//! UTC+2 are two hours apart and therefore not equal.
//!
//! # Example
//! ```
//! use wzs_date::{Date, Zone};
//!
//! let d = Date::new(2012, 12, 31, Zone::Utc).unwrap();
//! assert_eq!(d.add_date(0, 0, 1).unwrap().to_string(), "2013-01-01");
//! ```

mod codec;
mod scan;
pub mod zone;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Sub;
use std::str::FromStr;

use chrono::format::ParseErrorKind;
use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, Months, NaiveDate,
    NaiveDateTime, Offset, TimeDelta, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;

use crate::error::DateError;

pub use zone::{Zone, ZoneOffset};

/// The canonical `YYYY-MM-DD` layout used by [`Display`](fmt::Display),
/// [`FromStr`] and database scans.
pub const CANONICAL_LAYOUT: &str = "%Y-%m-%d";

/// Unix seconds of `0001-01-01T00:00:00Z`.
const ZERO_UNIX_SECONDS: i64 = -62_135_596_800;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A calendar date in a time zone.
#[derive(Clone, Copy, Debug)]
pub struct Date {
    instant: DateTime<Zone>,
}

fn zero_instant() -> DateTime<Zone> {
    DateTime::from_timestamp(ZERO_UNIX_SECONDS, 0)
        .unwrap_or_default()
        .with_timezone(&Zone::Utc)
}

fn parse_error(layout: &str, text: &str, source: chrono::ParseError) -> DateError {
    DateError::Parse {
        layout: layout.to_owned(),
        text: text.to_owned(),
        source,
    }
}

/// Parses `text` with a strftime layout, resolving zone-less input in `zone`.
///
/// Tries, in order: a full date-time with offset, a local date-time, a date.
/// Only "not enough fields" failures fall through to the next form.
fn parse_instant(layout: &str, text: &str, zone: Zone) -> Result<DateTime<Zone>, DateError> {
    match DateTime::parse_from_str(text, layout) {
        Ok(dt) => {
            let in_zone = dt.with_timezone(&zone);
            if in_zone.offset().fix() == *dt.offset() {
                return Ok(in_zone);
            }
            return Ok(dt.with_timezone(&Zone::Fixed(*dt.offset())));
        }
        Err(e) if !matches!(e.kind(), ParseErrorKind::NotEnough) => {
            return Err(parse_error(layout, text, e));
        }
        Err(_) => {}
    }

    match NaiveDateTime::parse_from_str(text, layout) {
        Ok(local) => {
            return zone
                .resolve_local(local)
                .ok_or_else(|| DateError::OutOfRange(text.to_owned()));
        }
        Err(e) if !matches!(e.kind(), ParseErrorKind::NotEnough) => {
            return Err(parse_error(layout, text, e));
        }
        Err(_) => {}
    }

    let date = NaiveDate::parse_from_str(text, layout).map_err(|e| parse_error(layout, text, e))?;
    zone.midnight(date)
        .ok_or_else(|| DateError::OutOfRange(text.to_owned()))
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let n = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(n)
    } else {
        date.checked_sub_months(n)
    }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let n = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(n)
    } else {
        date.checked_sub_days(n)
    }
}

/// Snaps `instant` to a multiple of `step` counted from the zero date, in
/// `i128` nanoseconds so every representable year works. Halfway values round
/// up.
fn quantize(instant: &DateTime<Zone>, step: TimeDelta, round: bool) -> Option<DateTime<Zone>> {
    let nanos = i128::from(NANOS_PER_SECOND);
    let step = i128::from(step.num_seconds()) * nanos + i128::from(step.subsec_nanos());
    if step <= 0 {
        return None;
    }
    let since_zero = i128::from(instant.timestamp() - ZERO_UNIX_SECONDS) * nanos
        + i128::from(instant.timestamp_subsec_nanos());
    let rem = since_zero.rem_euclid(step);
    let mut snapped = since_zero - rem;
    if round && rem * 2 >= step {
        snapped += step;
    }
    let unix = snapped + i128::from(ZERO_UNIX_SECONDS) * nanos;
    let secs = i64::try_from(unix.div_euclid(nanos)).ok()?;
    let subsec = u32::try_from(unix.rem_euclid(nanos)).ok()?;
    let utc = DateTime::from_timestamp(secs, subsec)?;
    Some(utc.with_timezone(&instant.timezone()))
}

impl Date {
    /// The zero date, `0001-01-01` in UTC.
    pub fn zero() -> Self {
        Self {
            instant: zero_instant(),
        }
    }

    /// Today in the local zone.
    pub fn now() -> Self {
        Self::now_in(Zone::Local)
    }

    /// Today in `zone`.
    pub fn now_in(zone: Zone) -> Self {
        Self::from_instant(Utc::now().with_timezone(&zone))
    }

    /// Builds `year-month-day` at midnight in `zone`.
    ///
    /// # Errors
    /// [`DateError::OutOfRange`] if the calendar date does not exist.
    ///
    /// # Example
    /// ```
    /// use wzs_date::{Date, Zone};
    ///
    /// let d = Date::new(2012, 12, 11, Zone::Utc).unwrap();
    /// assert_eq!(d.ymd(), (2012, 12, 11));
    /// assert_eq!(d.clock(), (0, 0, 0));
    /// assert!(Date::new(2013, 2, 29, Zone::Utc).is_err());
    /// ```
    pub fn new(year: i32, month: u32, day: u32, zone: Zone) -> Result<Self, DateError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DateError::OutOfRange(format!("{year:04}-{month:02}-{day:02}")))?;
        let instant = zone
            .midnight(date)
            .ok_or_else(|| DateError::OutOfRange(format!("{date} in {zone}")))?;
        Ok(Self { instant })
    }

    /// Truncates an arbitrary instant to midnight of its local date, keeping
    /// its zone.
    ///
    /// Idempotent. Midnight is unrepresentable only at the very edges of
    /// chrono's range; the instant is kept as-is there.
    pub fn from_instant(instant: DateTime<Zone>) -> Self {
        let zone = instant.timezone();
        let instant = zone.midnight(instant.date_naive()).unwrap_or(instant);
        Self { instant }
    }

    /// Parses `text` against a strftime `layout`. Input without an offset is
    /// interpreted in UTC.
    ///
    /// # Example
    /// ```
    /// use wzs_date::Date;
    ///
    /// let d = Date::parse("%d/%m/%Y", "11/12/2012").unwrap();
    /// assert_eq!(d.to_string(), "2012-12-11");
    /// ```
    pub fn parse(layout: &str, text: &str) -> Result<Self, DateError> {
        Self::parse_in_zone(layout, text, Zone::Utc)
    }

    /// Like [`Date::parse`], but input without an offset is interpreted in
    /// `zone`. Input with an offset keeps `zone` when the offset matches it.
    pub fn parse_in_zone(layout: &str, text: &str, zone: Zone) -> Result<Self, DateError> {
        parse_instant(layout, text, zone).map(Self::from_instant)
    }

    /// Builds the date of a Unix timestamp in the local zone.
    ///
    /// `nanos` outside `0..1_000_000_000` carries into `secs`.
    pub fn from_unix(secs: i64, nanos: i64) -> Result<Self, DateError> {
        let out_of_range = || DateError::OutOfRange(format!("unix {secs}s {nanos}ns"));
        let secs = secs
            .checked_add(nanos.div_euclid(NANOS_PER_SECOND))
            .ok_or_else(out_of_range)?;
        let nanos = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND)).map_err(|_| out_of_range())?;
        let utc = DateTime::from_timestamp(secs, nanos).ok_or_else(out_of_range)?;
        Ok(Self::from_instant(utc.with_timezone(&Zone::Local)))
    }

    // ------------------------------
    // Comparison
    // ------------------------------

    pub fn before(&self, other: &Date) -> bool {
        self.instant < other.instant
    }

    pub fn after(&self, other: &Date) -> bool {
        self.instant > other.instant
    }

    /// Same absolute instant, regardless of zone.
    pub fn equal(&self, other: &Date) -> bool {
        self.instant == other.instant
    }

    pub fn is_zero(&self) -> bool {
        self.instant == zero_instant()
    }

    // ------------------------------
    // Arithmetic
    // ------------------------------

    /// Adds an exact duration and truncates the result to its date.
    pub fn add(&self, delta: TimeDelta) -> Result<Self, DateError> {
        self.instant
            .checked_add_signed(delta)
            .map(Self::from_instant)
            .ok_or_else(|| DateError::OutOfRange(format!("{self} + {delta}")))
    }

    /// Calendar arithmetic: shifts by `years * 12 + months` months (clamping
    /// to the end of shorter months), then by `days` days.
    ///
    /// Clamping means Jan 31 plus one month is the last day of February; the
    /// excess days do not overflow into March.
    ///
    /// # Example
    /// ```
    /// use wzs_date::{Date, Zone};
    ///
    /// let d = Date::new(2024, 1, 31, Zone::Utc).unwrap();
    /// assert_eq!(d.add_date(0, 1, 0).unwrap().to_string(), "2024-02-29");
    /// ```
    pub fn add_date(&self, years: i32, months: i32, days: i32) -> Result<Self, DateError> {
        let total_months = i64::from(years) * 12 + i64::from(months);
        let out_of_range =
            || DateError::OutOfRange(format!("{self} + {years}y {months}m {days}d"));
        let date = shift_months(self.naive_date(), total_months)
            .and_then(|d| shift_days(d, i64::from(days)))
            .ok_or_else(out_of_range)?;
        let instant = self.location().midnight(date).ok_or_else(out_of_range)?;
        Ok(Self { instant })
    }

    /// Signed duration `self - other`.
    pub fn duration_since(&self, other: &Date) -> TimeDelta {
        self.instant.signed_duration_since(other.instant)
    }

    /// Rounds the instant to a multiple of `delta` since the zero date
    /// (halfway rounds up), then truncates to the date. A non-positive
    /// `delta` returns the date unchanged.
    ///
    /// Multiples are counted from `0001-01-01T00:00:00Z`, a Monday, so
    /// weekly steps land on Mondays in UTC.
    ///
    /// # Errors
    /// [`DateError::OutOfRange`] if the rounded instant leaves chrono's range.
    pub fn round(&self, delta: TimeDelta) -> Result<Self, DateError> {
        self.snap(delta, true)
    }

    /// Truncates the instant to a multiple of `delta` since the zero date,
    /// then to the date. A non-positive `delta` returns the date unchanged.
    ///
    /// # Example
    /// ```
    /// use chrono::TimeDelta;
    /// use wzs_date::{Date, Zone};
    ///
    /// let tuesday = Date::new(2012, 12, 11, Zone::Utc).unwrap();
    /// let monday = tuesday.truncate(TimeDelta::weeks(1)).unwrap();
    /// assert_eq!(monday.to_string(), "2012-12-10");
    /// ```
    pub fn truncate(&self, delta: TimeDelta) -> Result<Self, DateError> {
        self.snap(delta, false)
    }

    fn snap(&self, delta: TimeDelta, round: bool) -> Result<Self, DateError> {
        if delta <= TimeDelta::zero() {
            return Ok(*self);
        }
        quantize(&self.instant, delta, round)
            .map(Self::from_instant)
            .ok_or_else(|| DateError::OutOfRange(format!("{self} quantized by {delta}")))
    }

    // ------------------------------
    // Zone conversion
    // ------------------------------

    pub fn to_utc(&self) -> Self {
        self.in_zone(Zone::Utc)
    }

    pub fn to_local(&self) -> Self {
        self.in_zone(Zone::Local)
    }

    /// The date of this instant as seen in `zone`.
    ///
    /// Changing zone can move the wall-clock date.
    pub fn in_zone(&self, zone: Zone) -> Self {
        Self::from_instant(self.instant.with_timezone(&zone))
    }

    // ------------------------------
    // Accessors
    // ------------------------------

    pub fn year(&self) -> i32 {
        self.instant.year()
    }

    pub fn month(&self) -> u32 {
        self.instant.month()
    }

    pub fn day(&self) -> u32 {
        self.instant.day()
    }

    pub fn hour(&self) -> u32 {
        self.instant.hour()
    }

    pub fn minute(&self) -> u32 {
        self.instant.minute()
    }

    pub fn second(&self) -> u32 {
        self.instant.second()
    }

    pub fn nanosecond(&self) -> u32 {
        self.instant.nanosecond()
    }

    pub fn weekday(&self) -> Weekday {
        self.instant.weekday()
    }

    /// Day of the year, starting at 1.
    pub fn year_day(&self) -> u32 {
        self.instant.ordinal()
    }

    /// ISO 8601 `(year, week)`.
    pub fn iso_week(&self) -> (i32, u32) {
        let week = self.instant.iso_week();
        (week.year(), week.week())
    }

    /// `(hour, minute, second)`; `(0, 0, 0)` for every normalized date.
    pub fn clock(&self) -> (u32, u32, u32) {
        (self.hour(), self.minute(), self.second())
    }

    /// `(year, month, day)`.
    pub fn ymd(&self) -> (i32, u32, u32) {
        (self.year(), self.month(), self.day())
    }

    /// Zone name and offset east of UTC in seconds.
    pub fn zone(&self) -> (String, i32) {
        (self.location().to_string(), self.offset_seconds())
    }

    pub fn location(&self) -> Zone {
        self.instant.timezone()
    }

    pub(crate) fn offset_seconds(&self) -> i32 {
        self.instant.offset().fix().local_minus_utc()
    }

    pub fn unix(&self) -> i64 {
        self.instant.timestamp()
    }

    /// Nanoseconds since the Unix epoch, `None` outside roughly 1677..2262.
    pub fn unix_nano(&self) -> Option<i64> {
        self.instant.timestamp_nanos_opt()
    }

    pub fn naive_date(&self) -> NaiveDate {
        self.instant.date_naive()
    }

    pub fn as_datetime(&self) -> &DateTime<Zone> {
        &self.instant
    }

    // ------------------------------
    // Formatting
    // ------------------------------

    /// Formats with a strftime `layout`.
    ///
    /// # Example
    /// ```
    /// use wzs_date::{Date, Zone};
    ///
    /// let d = Date::new(2012, 12, 11, Zone::Utc).unwrap();
    /// assert_eq!(d.format("%a %d %b %Y").unwrap(), "Tue 11 Dec 2012");
    /// ```
    pub fn format(&self, layout: &str) -> Result<String, DateError> {
        let mut out = String::new();
        self.append_format(&mut out, layout)?;
        Ok(out)
    }

    /// Appends the formatted date to `buf`. On error `buf` is left as it was.
    pub fn append_format(&self, buf: &mut String, layout: &str) -> Result<(), DateError> {
        use std::fmt::Write;

        let len = buf.len();
        if write!(buf, "{}", self.instant.format(layout)).is_err() {
            buf.truncate(len);
            return Err(DateError::Layout(layout.to_owned()));
        }
        Ok(())
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::zero()
    }
}

/// Canonical `YYYY-MM-DD`. Years outside `0..=9999` render with a sign
/// (`+10000-01-01`, `-0001-01-01`); [`Valuer`](crate::db::port::Valuer)
/// refuses those years.
impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instant.format(CANONICAL_LAYOUT))
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(CANONICAL_LAYOUT, s)
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for Date {}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

impl Hash for Date {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.timestamp().hash(state);
        self.instant.timestamp_subsec_nanos().hash(state);
    }
}

impl Sub for Date {
    type Output = TimeDelta;

    fn sub(self, rhs: Date) -> TimeDelta {
        self.duration_since(&rhs)
    }
}

// ------------------------------
// From host instants
// ------------------------------

impl From<DateTime<Zone>> for Date {
    fn from(instant: DateTime<Zone>) -> Self {
        Self::from_instant(instant)
    }
}

impl From<&DateTime<Zone>> for Date {
    fn from(instant: &DateTime<Zone>) -> Self {
        Self::from_instant(*instant)
    }
}

impl From<DateTime<Utc>> for Date {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_instant(instant.with_timezone(&Zone::Utc))
    }
}

impl From<DateTime<Local>> for Date {
    fn from(instant: DateTime<Local>) -> Self {
        Self::from_instant(instant.with_timezone(&Zone::Local))
    }
}

impl From<DateTime<FixedOffset>> for Date {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::from_instant(instant.with_timezone(&Zone::Fixed(*instant.offset())))
    }
}

impl From<DateTime<Tz>> for Date {
    fn from(instant: DateTime<Tz>) -> Self {
        Self::from_instant(instant.with_timezone(&Zone::Named(instant.timezone())))
    }
}
