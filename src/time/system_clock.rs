use anyhow::Result;

use crate::date::{Date, Zone};
use crate::time::clock::Clock;
use crate::time::local::zone_named;

/// A [`Clock`] implementation backed by the system clock.
///
/// # Overview
/// `SystemClock` provides the current date based on the operating system's
/// current time and a configured [`Zone`].
///
/// # Design Notes
/// - The zone is resolved at construction time, so an invalid zone name is
///   reported by [`SystemClock::from_name`] and [`Clock::today`] cannot fail.
///
/// # Responsibility
/// - Selecting the zone is the responsibility of the **composition root**
///   (e.g. `main.rs`, usually through `TimeConfig`).
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    /// Creates a new [`SystemClock`] in `zone`.
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    /// Creates a new [`SystemClock`] from a zone name such as `"Asia/Tokyo"`,
    /// `"UTC"` or `"+09:00"`.
    ///
    /// # Errors
    /// Returns an error if the name cannot be resolved.
    pub fn from_name(tz_name: &str) -> Result<Self> {
        Ok(Self::new(zone_named(tz_name)?))
    }

    /// The configured zone.
    pub fn zone(&self) -> Zone {
        self.zone
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Zone::Local)
    }
}

impl Clock for SystemClock {
    /// Returns today's date in the configured zone.
    fn today(&self) -> Date {
        Date::now_in(self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn system_clock_returns_a_date_for_valid_timezone() {
        let clock = SystemClock::from_name("Asia/Tokyo").unwrap();

        let today = clock.today();

        // Basic sanity checks
        assert!(today.year() >= 2000);
        assert!((1..=12).contains(&today.month()));
        assert!((1..=31).contains(&today.day()));
        assert_eq!(today.clock(), (0, 0, 0));
        assert_eq!(today.location(), Zone::Named(Tz::Asia__Tokyo));
    }

    #[test]
    fn system_clock_rejects_invalid_timezone() {
        assert!(SystemClock::from_name("Invalid/Timezone").is_err());
    }

    #[test]
    fn default_system_clock_is_local() {
        assert_eq!(SystemClock::default().zone(), Zone::Local);
        assert_eq!(SystemClock::default().today().location(), Zone::Local);
    }
}
