//! Domain entities, value types, ports, and services.
//!
//! Purpose: define the strongly typed core of the expense tracker —
//! recurring definitions, their materialised occurrences, the rollover and
//! reminder engines — independent of HTTP, SQL, or SMTP. Adapters implement
//! the traits in [`ports`] and map their failures into each port's typed
//! error enum.

pub mod auth;
pub mod error;
pub mod expense;
pub mod frequency;
pub mod ports;
pub mod reminders;
pub mod rollover;
pub mod scheduler;
pub mod user;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::expense::{
    Amount, DateRange, ExpenseOccurrence, ExpenseValidationError, NewRecurringExpense,
    RecurringExpense, RegularExpenseId,
};
pub use self::frequency::{Frequency, FrequencyParseError, FrequencyUnit};
pub use self::user::{EmailAddress, NewUser, User, UserId, UserValidationError};
