//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (database, SMTP relay). Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants instead of
//! returning `anyhow::Result`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::expense::{Amount, DateRange, ExpenseOccurrence, NewRecurringExpense, RecurringExpense, RegularExpenseId};
use super::user::{EmailAddress, NewUser, User, UserId};

/// Errors surfaced by the user persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRepositoryError {
    /// Database connectivity failures.
    #[error("user store connection failed: {message}")]
    Connection { message: String },
    /// Query or write failures that bubble up from the adapter.
    #[error("user store query failed: {message}")]
    Query { message: String },
    /// Unique-email constraint violation.
    #[error("a user with email '{email}' already exists")]
    DuplicateEmail { email: String },
    /// The targeted row does not exist.
    #[error("user {id} not found")]
    NotFound { id: i64 },
}

impl UserRepositoryError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-email violations.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Persistence port for user identities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored record.
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Replace every field of an existing user.
    async fn update(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Physically delete a user row.
    async fn delete(&self, id: UserId) -> Result<(), UserRepositoryError>;

    /// Look up a user by email, for login.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;
}

/// Errors surfaced by the expense persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpenseRepositoryError {
    /// Database connectivity failures.
    #[error("expense store connection failed: {message}")]
    Connection { message: String },
    /// Query or write failures that bubble up from the adapter.
    #[error("expense store query failed: {message}")]
    Query { message: String },
    /// The targeted definition does not exist.
    #[error("regular expense {id} not found")]
    NotFound { id: i64 },
}

impl ExpenseRepositoryError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence port for recurring-expense definitions and their occurrences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Insert a new definition and return the stored record.
    async fn create_definition(
        &self,
        definition: &NewRecurringExpense,
    ) -> Result<RecurringExpense, ExpenseRepositoryError>;

    /// Soft-delete one of `user_id`'s definitions by nulling its next due
    /// date.
    ///
    /// The row is retained so historical occurrences keep a valid parent.
    /// A definition owned by another user is reported as [`NotFound`]
    /// rather than revealing its existence.
    ///
    /// [`NotFound`]: ExpenseRepositoryError::NotFound
    async fn deactivate_definition(
        &self,
        user_id: UserId,
        id: RegularExpenseId,
    ) -> Result<(), ExpenseRepositoryError>;

    /// List a user's active (non-null next date) definitions.
    async fn active_definitions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecurringExpense>, ExpenseRepositoryError>;

    /// List a user's occurrences within an inclusive date range.
    async fn occurrences_in_range(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<ExpenseOccurrence>, ExpenseRepositoryError>;
}

/// Errors surfaced by the rollover persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RolloverRepositoryError {
    /// Database connectivity failures.
    #[error("rollover store connection failed: {message}")]
    Connection { message: String },
    /// Transaction failures; the whole run was rolled back.
    #[error("rollover transaction failed: {message}")]
    Transaction { message: String },
}

impl RolloverRepositoryError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for transaction failures.
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }
}

/// Outcome of one transactional rollover attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverReport {
    /// The watermark row was taken and due definitions were advanced.
    Completed {
        /// Number of definitions advanced (and occurrences inserted).
        rolled_over: usize,
    },
    /// A previous run already committed this date; nothing was changed.
    AlreadyRun,
}

/// Transactional port for the rollover engine.
///
/// Implementations must guarantee that taking the watermark, advancing the
/// due definitions, and inserting their occurrences commit atomically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RolloverRepository: Send + Sync {
    /// Atomically roll over every definition due on `date`.
    async fn roll_over(&self, date: NaiveDate) -> Result<RolloverReport, RolloverRepositoryError>;
}

/// One reminder to send: a definition due on the queried date joined with
/// its owning user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    /// Recipient address.
    pub email: EmailAddress,
    /// Recipient display name.
    pub user_name: String,
    /// Definition label, e.g. "rent".
    pub expense_name: String,
    /// Charge amount.
    pub amount: Amount,
}

/// Errors surfaced by the reminder lookup adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReminderQueryError {
    /// Database connectivity failures.
    #[error("reminder query connection failed: {message}")]
    Connection { message: String },
    /// Query failures that bubble up from the adapter.
    #[error("reminder query failed: {message}")]
    Query { message: String },
}

impl ReminderQueryError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Read port for the notification engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderQuery: Send + Sync {
    /// List every active definition due on `date`, joined with its owner.
    async fn due_reminders(&self, date: NaiveDate)
        -> Result<Vec<DueReminder>, ReminderQueryError>;
}

/// A composed reminder ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    /// Recipient address.
    pub to: EmailAddress,
    /// Message subject line.
    pub subject: String,
    /// Plain-text message body.
    pub body: String,
}

/// Errors surfaced by the mail adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailerError {
    /// The relay rejected the connection or the send.
    #[error("mail transport failed: {message}")]
    Transport { message: String },
    /// The message could not be constructed (bad address, etc.).
    #[error("invalid mail message: {message}")]
    InvalidMessage { message: String },
}

impl MailerError {
    /// Helper for transport level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for message construction failures.
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
        }
    }
}

/// Outbound port for reminder delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one reminder message.
    async fn send(&self, message: &ReminderMessage) -> Result<(), MailerError>;
}
