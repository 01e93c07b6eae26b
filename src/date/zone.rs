//! # Time Zone Context
//!
//! [`Zone`] is the zone a [`Date`](super::Date) lives in. It implements
//! [`chrono::TimeZone`], so the wrapped instant is a `DateTime<Zone>` and the
//! zone identity (not only its offset) survives arithmetic and conversions.
//!
//! # Accepted names
//! - `"UTC"` / `"Z"` → [`Zone::Utc`]
//! - `"Local"` → [`Zone::Local`] (the process's local zone)
//! - `"+09:00"`, `"-0330"`, `"+02"` → [`Zone::Fixed`]
//! - IANA names such as `"Asia/Tokyo"` → [`Zone::Named`]

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Days, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::DateError;

/// A time-zone context for an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    Utc,
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

/// The offset of a [`Zone`] at a particular instant.
///
/// Carries the zone itself so that [`TimeZone::from_offset`] can restore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneOffset {
    zone: Zone,
    fixed: FixedOffset,
}

impl ZoneOffset {
    pub fn zone(&self) -> Zone {
        self.zone
    }
}

impl Offset for ZoneOffset {
    fn fix(&self) -> FixedOffset {
        self.fixed
    }
}

impl fmt::Display for ZoneOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fixed, f)
    }
}

impl Zone {
    /// Builds a zone from a fixed offset; a zero offset is [`Zone::Utc`].
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        if seconds == 0 {
            return Some(Zone::Utc);
        }
        FixedOffset::east_opt(seconds).map(Zone::Fixed)
    }

    fn offset_at_utc(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Zone::Utc => Utc.fix(),
            Zone::Local => Local.offset_from_utc_datetime(utc),
            Zone::Fixed(offset) => *offset,
            Zone::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
        }
    }

    fn offset_at_local(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        match self {
            Zone::Utc => LocalResult::Single(Utc.fix()),
            Zone::Local => Local.offset_from_local_datetime(local),
            Zone::Fixed(offset) => LocalResult::Single(*offset),
            Zone::Named(tz) => tz.offset_from_local_datetime(local).map(|o| o.fix()),
        }
    }

    fn with_fixed(&self, fixed: FixedOffset) -> ZoneOffset {
        ZoneOffset { zone: *self, fixed }
    }

    /// Resolves a wall-clock date-time in this zone.
    ///
    /// An ambiguous time (DST fold) resolves to the earlier instant. A time
    /// inside a DST gap resolves using the offset in force before the gap,
    /// which lands on the first valid wall-clock time after it.
    pub(crate) fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Zone>> {
        match self.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => {
                let before = self.offset_at_utc(&local.checked_sub_days(Days::new(1))?);
                let utc = local.checked_sub_signed(chrono::TimeDelta::seconds(
                    before.local_minus_utc().into(),
                ))?;
                Some(self.from_utc_datetime(&utc))
            }
        }
    }

    /// Midnight of `date` in this zone.
    pub(crate) fn midnight(&self, date: NaiveDate) -> Option<DateTime<Zone>> {
        self.resolve_local(date.and_time(NaiveTime::MIN))
    }
}

impl TimeZone for Zone {
    type Offset = ZoneOffset;

    fn from_offset(offset: &ZoneOffset) -> Self {
        offset.zone
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<ZoneOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<ZoneOffset> {
        self.offset_at_local(local).map(|fixed| self.with_fixed(fixed))
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> ZoneOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> ZoneOffset {
        self.with_fixed(self.offset_at_utc(utc))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => f.write_str("UTC"),
            Zone::Local => f.write_str("Local"),
            Zone::Fixed(offset) => fmt::Display::fmt(offset, f),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl FromStr for Zone {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        match name {
            "UTC" | "utc" | "Z" => return Ok(Zone::Utc),
            "Local" | "local" => return Ok(Zone::Local),
            _ => {}
        }
        if name.starts_with(['+', '-']) {
            return parse_fixed(name)
                .map(Zone::Fixed)
                .ok_or_else(|| DateError::Zone(s.to_owned()));
        }
        Tz::from_str(name)
            .map(Zone::Named)
            .map_err(|_| DateError::Zone(s.to_owned()))
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

/// Parses `±HH`, `±HHMM` or `±HH:MM`.
fn parse_fixed(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !matches!(digits.len(), 2 | 4) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().ok()?
    } else {
        0
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
