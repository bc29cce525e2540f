//! Notification engine: email users about expenses due tomorrow.
//!
//! Delivery is best-effort per recipient. A failed send is logged and
//! counted, never aborting the rest of the batch; only a failure of the
//! due-reminder query itself surfaces as an error.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::ports::{
    DueReminder, Mailer, ReminderMessage, ReminderQuery, ReminderQueryError,
};
use crate::domain::Error;

/// Subject line used for every reminder.
const REMINDER_SUBJECT: &str = "Regular expense is coming";

/// Summary of one notification invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderOutcome {
    /// Date the reminders were keyed on.
    pub date: NaiveDate,
    /// Messages delivered.
    pub sent: usize,
    /// Messages that failed to deliver.
    pub failed: usize,
}

/// Sends one reminder per definition due on the queried date.
#[derive(Clone)]
pub struct ReminderService<Q, M> {
    query: Arc<Q>,
    mailer: Arc<M>,
}

impl<Q, M> ReminderService<Q, M> {
    /// Create a new service with the given query and mailer.
    pub fn new(query: Arc<Q>, mailer: Arc<M>) -> Self {
        Self { query, mailer }
    }
}

/// Compose the reminder body for one due definition.
fn compose(reminder: &DueReminder) -> ReminderMessage {
    ReminderMessage {
        to: reminder.email.clone(),
        subject: REMINDER_SUBJECT.to_owned(),
        body: format!(
            "Dear {}! Please, don't forget about your {} payment of {}, it is due tomorrow.",
            reminder.user_name, reminder.expense_name, reminder.amount,
        ),
    }
}

impl<Q, M> ReminderService<Q, M>
where
    Q: ReminderQuery,
    M: Mailer,
{
    /// Notify every user with a definition due on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the due-reminder lookup fails; individual
    /// send failures are recorded in the outcome.
    pub async fn run(&self, date: NaiveDate) -> Result<ReminderOutcome, Error> {
        let due = self
            .query
            .due_reminders(date)
            .await
            .map_err(map_query_error)?;

        let mut outcome = ReminderOutcome {
            date,
            sent: 0,
            failed: 0,
        };

        for reminder in &due {
            let message = compose(reminder);
            match self.mailer.send(&message).await {
                Ok(()) => outcome.sent += 1,
                Err(error) => {
                    outcome.failed += 1;
                    warn!(
                        recipient = %reminder.email,
                        expense = %reminder.expense_name,
                        error = %error,
                        "reminder delivery failed"
                    );
                }
            }
        }

        info!(
            date = %outcome.date,
            sent = outcome.sent,
            failed = outcome.failed,
            "reminder run finished"
        );
        Ok(outcome)
    }
}

fn map_query_error(error: ReminderQueryError) -> Error {
    match error {
        ReminderQueryError::Connection { message } => {
            Error::service_unavailable(format!("reminder store unavailable: {message}"))
        }
        ReminderQueryError::Query { message } => {
            Error::internal(format!("reminder lookup failed: {message}"))
        }
    }
}
