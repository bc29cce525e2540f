//! Recurring expense definitions and materialised occurrences.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::frequency::Frequency;
use super::user::UserId;

/// Validation errors returned by expense value-type constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    /// Identifier was zero or negative.
    #[error("expense id must be a positive integer")]
    InvalidId,
    /// Amount was negative.
    #[error("amount must be non-negative")]
    NegativeAmount,
    /// Name was empty after trimming.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeded the stored column width.
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    /// Range end preceded its start.
    #[error("end date must not be before start date")]
    InvertedDateRange,
}

/// Stable identifier of a recurring expense definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegularExpenseId(i64);

impl RegularExpenseId {
    /// Validate and construct a [`RegularExpenseId`] from a raw value.
    pub fn new(raw: i64) -> Result<Self, ExpenseValidationError> {
        if raw <= 0 {
            return Err(ExpenseValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Access the raw integer value.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RegularExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative amount in integer currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Validate and construct an [`Amount`].
    pub fn new(raw: i64) -> Result<Self, ExpenseValidationError> {
        if raw < 0 {
            return Err(ExpenseValidationError::NegativeAmount);
        }
        Ok(Self(raw))
    }

    /// Access the raw integer value.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = ExpenseValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

const EXPENSE_NAME_MAX_LEN: usize = 50;

/// Validate an expense name against the stored column constraints.
pub fn validate_expense_name(name: &str) -> Result<(), ExpenseValidationError> {
    if name.trim().is_empty() {
        return Err(ExpenseValidationError::EmptyName);
    }
    if name.len() > EXPENSE_NAME_MAX_LEN {
        return Err(ExpenseValidationError::NameTooLong {
            max: EXPENSE_NAME_MAX_LEN,
        });
    }
    Ok(())
}

/// A recurring payment obligation owned by one user.
///
/// ## Invariants
/// - `next_date == None` means the definition is soft-deleted: excluded from
///   rollover, notification, and active listings. Rows are never physically
///   removed.
/// - `next_date` is only ever advanced by the rollover engine or nulled by a
///   delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringExpense {
    /// Primary key.
    pub id: RegularExpenseId,
    /// Owning user.
    pub user_id: UserId,
    /// Short label, e.g. "rent".
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Interval between occurrences.
    pub frequency: Frequency,
    /// Charge per occurrence.
    pub amount: Amount,
    /// Next due date; `None` when soft-deleted.
    pub next_date: Option<NaiveDate>,
}

/// Payload for creating a definition; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurringExpense {
    /// Owning user.
    pub user_id: UserId,
    /// Short label, e.g. "rent".
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Interval between occurrences.
    pub frequency: Frequency,
    /// Charge per occurrence.
    pub amount: Amount,
    /// First due date.
    pub next_date: NaiveDate,
}

impl NewRecurringExpense {
    /// Validate and construct a [`NewRecurringExpense`].
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        description: Option<String>,
        frequency: Frequency,
        amount: Amount,
        next_date: NaiveDate,
    ) -> Result<Self, ExpenseValidationError> {
        let name = name.into();
        validate_expense_name(&name)?;
        Ok(Self {
            user_id,
            name,
            description,
            frequency,
            amount,
            next_date,
        })
    }
}

/// One concrete, dated charge materialised from a definition.
///
/// Immutable history: created exclusively by the rollover engine, never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseOccurrence {
    /// Primary key.
    pub id: i64,
    /// Owning user, matching the definition's owner at creation time.
    pub user_id: UserId,
    /// Definition this occurrence was materialised from.
    pub regular_expense_id: RegularExpenseId,
    /// Date the charge fell due.
    pub date: NaiveDate,
}

/// Inclusive calendar date range with `start <= end` enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Construct a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ExpenseValidationError> {
        if end < start {
            return Err(ExpenseValidationError::InvertedDateRange);
        }
        Ok(Self { start, end })
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Inclusive upper bound.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
