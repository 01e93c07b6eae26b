//! # Environment Variable Utilities
//!
//! Provides helpers for reading environment variables with common type conversions.
//! Includes parsing for boolean flags, numeric values and zones with fallback defaults.
//!
//! These functions are typically used in configuration loading (e.g. `AppConfig`).
//!
//! # Examples
//! ```rust,no_run
//! use wzs_date::config::env::{read_flag, read_u32_opt, read_zone};
//! use wzs_date::Zone;
//!
//! let debug = read_flag("SQL_DEBUG", false);
//! let max_conn = read_u32_opt("DATABASE_MAX_CONN");
//! let zone = read_zone("APP_TIMEZONE", Zone::Local);
//! ```

use tracing::warn;

use crate::date::Zone;

/// Reads a boolean flag from an environment variable.
///
/// Returns `true` for any of the following case-insensitive values:
/// `"1"`, `"true"`, `"yes"`, `"on"`.
pub fn read_flag(name: &str, default: bool) -> bool {
    read_flag_from(|k| std::env::var(k).ok(), name, default)
}

/// Reads a boolean flag using a custom provider function.
///
/// Useful for testing or mocking environment sources.
///
/// # Example
/// ```rust
/// use wzs_date::config::env::read_flag_from;
///
/// let val = read_flag_from(|_| Some("true".into()), "SQL_DEBUG", false);
/// assert!(val);
/// ```
pub fn read_flag_from<F>(provider: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match provider(name) {
        Some(v) => {
            let s = unquote(&v);
            matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
        }
        None => default,
    }
}

/// Reads an unsigned integer (`u32`) from an environment variable.
///
/// Returns `None` if the variable is missing or not a number.
pub fn read_u32_opt(name: &str) -> Option<u32> {
    read_u32_opt_from(|k| std::env::var(k).ok(), name)
}

/// Reads an optional `u32` using a custom provider function.
///
/// # Example
/// ```rust
/// use wzs_date::config::env::read_u32_opt_from;
///
/// assert_eq!(read_u32_opt_from(|_| Some(" 20 ".into()), "DATABASE_MAX_CONN"), Some(20));
/// assert_eq!(read_u32_opt_from(|_| Some("many".into()), "DATABASE_MAX_CONN"), None);
/// ```
pub fn read_u32_opt_from<F>(provider: F, name: &str) -> Option<u32>
where
    F: Fn(&str) -> Option<String>,
{
    provider(name).and_then(|s| unquote(&s).parse::<u32>().ok())
}

/// Reads a [`Zone`] from an environment variable.
///
/// See [`read_zone_from`].
pub fn read_zone(name: &str, default: Zone) -> Zone {
    read_zone_from(|k| std::env::var(k).ok(), name, default)
}

/// Reads a [`Zone`] using a custom provider function.
///
/// Accepts `UTC`, `Local`, fixed offsets (`+09:00`) and IANA names. A missing
/// or blank value yields `default`; an unparsable one logs a warning and also
/// yields `default`.
///
/// # Example
/// ```rust
/// use wzs_date::config::env::read_zone_from;
/// use wzs_date::Zone;
///
/// let zone = read_zone_from(|_| Some("UTC".into()), "APP_TIMEZONE", Zone::Local);
/// assert_eq!(zone, Zone::Utc);
/// ```
pub fn read_zone_from<F>(provider: F, name: &str, default: Zone) -> Zone
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = provider(name) else {
        return default;
    };
    let s = unquote(&raw);
    if s.is_empty() {
        return default;
    }
    match s.parse::<Zone>() {
        Ok(zone) => zone,
        Err(e) => {
            warn!(var = name, value = s, "{e}; falling back to {default}");
            default
        }
    }
}

fn unquote(v: &str) -> &str {
    v.trim().trim_matches(|c| c == '"' || c == '\'')
}
