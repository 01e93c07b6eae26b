//! Local time utilities based on `chrono` and `chrono-tz`.
//!
//! This module provides helper functions for reading the current time and
//! date in a zone given by name.
//!
//! # Provided Functions
//! - [`zone_named`]: Resolves a zone name into a [`Zone`].
//! - [`today_in_zone`]: Returns the current [`Date`] in the given zone.
//! - [`now_in_zone`]: Returns the current instant (`DateTime<Zone>`).
//!
//! # Zone Format
//! - IANA names such as `"Asia/Tokyo"` or `"Australia/Melbourne"`
//! - `"UTC"`, `"Local"` or a fixed offset such as `"+09:00"`
//! - Any other name is an error.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::date::{Date, Zone};

/// Resolves `tz_name` into a [`Zone`].
///
/// ## Example
/// ```
/// use wzs_date::time::local::zone_named;
/// use wzs_date::Zone;
///
/// assert_eq!(zone_named("UTC").unwrap(), Zone::Utc);
/// assert!(zone_named("Invalid/Timezone").is_err());
/// ```
pub fn zone_named(tz_name: &str) -> Result<Zone> {
    tz_name
        .parse::<Zone>()
        .with_context(|| format!("Invalid timezone name: {tz_name}"))
}

/// # today_in_zone
///
/// Returns **today's date** in the named zone.
///
/// ## Returns
/// - `Ok(Date)`: midnight of the current local date in that zone.
/// - `Err`: if the zone name is invalid.
///
/// ## Example
/// ```
/// use wzs_date::time::local::today_in_zone;
/// let date = today_in_zone("Asia/Tokyo").unwrap();
/// println!("Tokyo today = {}", date);
/// ```
pub fn today_in_zone(tz_name: &str) -> Result<Date> {
    Ok(Date::now_in(zone_named(tz_name)?))
}

/// # now_in_zone
///
/// Returns the **current instant** in the named zone, not truncated.
///
/// ## Example
/// ```
/// use wzs_date::time::local::now_in_zone;
/// let now_tokyo = now_in_zone("Asia/Tokyo").unwrap();
/// println!("Tokyo now = {}", now_tokyo);
/// ```
pub fn now_in_zone(tz_name: &str) -> Result<DateTime<Zone>> {
    let zone = zone_named(tz_name)?;
    Ok(Utc::now().with_timezone(&zone))
}
