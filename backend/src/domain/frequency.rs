//! Calendar interval between two occurrences of a recurring expense.
//!
//! A frequency is stored as text (`"1 month"`, `"2 weeks"`) and added to a
//! calendar date to compute the next due date. Month and year arithmetic is
//! calendar aware: adding one month to 2026-01-31 lands on 2026-02-28, the
//! same way PostgreSQL interval addition clamps month-end dates.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar unit of a [`Frequency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyUnit {
    /// Plain day offset.
    Day,
    /// Seven-day offset.
    Week,
    /// Calendar month offset with month-end clamping.
    Month,
    /// Calendar year offset (twelve months).
    Year,
}

impl FrequencyUnit {
    fn label(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Errors raised when parsing a frequency from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrequencyParseError {
    /// Input did not match `"<count> <unit>"`.
    #[error("frequency must look like '1 month' or '2 weeks', got '{input}'")]
    Malformed { input: String },
    /// The count was zero or not a positive integer.
    #[error("frequency count must be a positive integer, got '{count}'")]
    InvalidCount { count: String },
    /// The unit was not one of day, week, month, year.
    #[error("unknown frequency unit '{unit}'")]
    UnknownUnit { unit: String },
}

/// A positive calendar interval, e.g. "1 month" or "2 weeks".
///
/// ## Invariants
/// - The count is at least 1.
///
/// Serialises to and from its textual form so it can be stored in the
/// `frequency` column and carried in JSON payloads unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Frequency {
    count: u32,
    unit: FrequencyUnit,
}

impl Frequency {
    /// Construct a frequency from a count and unit.
    ///
    /// Returns `None` when `count` is zero.
    pub fn new(count: u32, unit: FrequencyUnit) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Self { count, unit })
    }

    /// Interval count in units of [`Frequency::unit`].
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Calendar unit of this interval.
    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// Add this interval to `date`, respecting calendar units.
    ///
    /// Month and year additions clamp to the last day of the target month
    /// when the source day does not exist there (Jan 31 + 1 month =
    /// Feb 28/29). Returns `None` only when the result would overflow the
    /// supported date range.
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.unit {
            FrequencyUnit::Day => date.checked_add_days(Days::new(u64::from(self.count))),
            FrequencyUnit::Week => date.checked_add_days(Days::new(u64::from(self.count) * 7)),
            FrequencyUnit::Month => date.checked_add_months(Months::new(self.count)),
            FrequencyUnit::Year => {
                let months = self.count.checked_mul(12)?;
                date.checked_add_months(Months::new(months))
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 1 {
            write!(f, "{} {}", self.count, self.unit.label())
        } else {
            write!(f, "{} {}s", self.count, self.unit.label())
        }
    }
}

impl FromStr for Frequency {
    type Err = FrequencyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split_whitespace();
        let (Some(raw_count), Some(raw_unit), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(FrequencyParseError::Malformed {
                input: input.to_owned(),
            });
        };

        let count: u32 = raw_count
            .parse()
            .map_err(|_| FrequencyParseError::InvalidCount {
                count: raw_count.to_owned(),
            })?;

        let unit = match raw_unit.trim_end_matches('s') {
            "day" => FrequencyUnit::Day,
            "week" => FrequencyUnit::Week,
            "month" => FrequencyUnit::Month,
            "year" => FrequencyUnit::Year,
            other => {
                return Err(FrequencyParseError::UnknownUnit {
                    unit: other.to_owned(),
                })
            }
        };

        Self::new(count, unit).ok_or(FrequencyParseError::InvalidCount {
            count: raw_count.to_owned(),
        })
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Frequency {
    type Error = FrequencyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
