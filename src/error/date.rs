use thiserror::Error;

/// Errors produced by [`Date`](crate::date::Date) construction, parsing and
/// decoding.
///
/// Empty or absent input is never an error: scanning `NULL`, an empty string
/// or empty bytes, and decoding JSON `null`, all succeed without touching the
/// target value.
///
/// # Example
/// ```
/// use wzs_date::{Date, DateError};
///
/// let err = Date::parse("%Y-%m-%d", "2012/12/11").unwrap_err();
/// assert!(matches!(err, DateError::Parse { .. }));
/// ```
#[derive(Debug, Error)]
pub enum DateError {
    /// Input text does not match the layout.
    #[error("cannot parse {text:?} with layout {layout:?}: {source}")]
    Parse {
        layout: String,
        text: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A scan received a column value of a type that cannot hold a date.
    #[error("unsupported scan source type `{0}`")]
    Type(&'static str),

    /// Malformed bytes given to a binary, JSON, text or scan decoder.
    #[error("malformed {format} date encoding: {reason}")]
    Decode {
        format: &'static str,
        reason: String,
    },

    /// The calendar date does not exist or falls outside the supported range.
    #[error("date out of range: {0}")]
    OutOfRange(String),

    /// The strftime layout contains an unknown specifier.
    #[error("invalid layout {0:?}")]
    Layout(String),

    /// Unknown time zone name.
    #[error("unknown time zone {0:?}")]
    Zone(String),
}

impl DateError {
    pub(crate) fn decode(format: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            format,
            reason: reason.to_string(),
        }
    }
}
