use crate::date::Date;

/// A port that provides the **current date** for the application.
///
/// # Purpose
/// This trait abstracts access to "today" so that:
///
/// - Application and domain logic do **not** depend on system time
/// - Implementations can be swapped (system clock, fixed clock, mock, etc.)
/// - Tests can be deterministic and time-independent
///
/// # Design Notes
/// - The zone is chosen by the implementation; the returned [`Date`] carries it.
/// - This trait represents an **external capability**, similar to a Repository.
///
/// # Typical Implementations
/// - `SystemClock`: Uses the OS clock in a configured zone
/// - `FixedClock`: Returns a constant date (for testing)
pub trait Clock: Send + Sync {
    /// Returns today's date, at midnight of the implementation's zone.
    fn today(&self) -> Date;
}
