//! # Time Configuration
//!
//! Selects the zone in which the application's [`Clock`] reports "today".
//!
//! | Variable | Description | Default |
//! |-----------|-------------|----------|
//! | `APP_TIMEZONE` | `UTC`, `Local`, a fixed offset or an IANA name | `Local` |
//!
//! [`Clock`]: crate::time::Clock

use crate::config::env::read_zone;
use crate::date::Zone;
use crate::time::SystemClock;

/// Zone used for the system clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeConfig {
    pub zone: Zone,
}

impl TimeConfig {
    /// Builds a [`TimeConfig`] from `APP_TIMEZONE`.
    pub fn from_env() -> Self {
        Self {
            zone: read_zone("APP_TIMEZONE", Zone::Local),
        }
    }

    /// A [`SystemClock`] in the configured zone.
    pub fn clock(&self) -> SystemClock {
        SystemClock::new(self.zone)
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self { zone: Zone::Local }
    }
}
