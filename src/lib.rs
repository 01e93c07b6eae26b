//! # wzs_date
//!
//! A calendar-date value type for domain models, with the infrastructure
//! needed to carry it through a MySQL database, JSON and text.
//!
//! This crate provides:
//! - [`Date`]: a zone-aware date normalized to local midnight (`date`)
//! - Database binding through the [`db::port::Scanner`] and
//!   [`db::port::Valuer`] traits, and a MySQL adapter (`db`)
//! - A [`time::Clock`] port for "today" (`time`)
//! - Environment-driven configuration (`config`)
//! - Re-exports of frequently used utility crates (`chrono`, `mysql`, etc.)
//!
//! ## Example usage (in another crate)
//!
//! ```rust
//! use wzs_date::anyhow::Result;
//! use wzs_date::db::port::Row;
//! use wzs_date::{Date, Zone};
//!
//! fn deadline(row: &Row) -> Result<Date> {
//!     row.get_date("deadline")
//! }
//!
//! let mut row = Row::default();
//! row.insert("deadline", "2012-12-11".into());
//! assert_eq!(deadline(&row).unwrap(), Date::new(2012, 12, 11, Zone::Utc).unwrap());
//! ```

// ===============================
// Re-exports of external crates
// ===============================

pub use anyhow;
pub use chrono;
pub use chrono_tz;
pub use dotenvy;
pub use mysql;
pub use serde;
pub use serde_json;

// ===============================
// Public modules
// ===============================
pub mod config;
pub mod date;
pub mod db;
pub mod error;
pub mod time;

pub use date::{CANONICAL_LAYOUT, Date, Zone};
pub use error::DateError;
