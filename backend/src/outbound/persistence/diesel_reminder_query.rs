//! PostgreSQL-backed read model for upcoming-payment reminders.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DueReminder, ReminderQuery, ReminderQueryError};
use crate::domain::{Amount, EmailAddress};

use super::diesel_helpers::{map_diesel_error_message, map_pool_error_message};
use super::pool::{DbPool, PoolError};
use super::schema::{regular_expenses, users};

/// Diesel-backed implementation of the [`ReminderQuery`] port.
#[derive(Clone)]
pub struct DieselReminderQuery {
    pool: DbPool,
}

impl DieselReminderQuery {
    /// Create a new reminder query with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReminderQueryError {
    ReminderQueryError::connection(map_pool_error_message(error))
}

type ReminderTuple = (String, String, String, i64);

fn tuple_to_reminder(
    (user_name, email, expense_name, amount): ReminderTuple,
) -> Result<DueReminder, ReminderQueryError> {
    let email = EmailAddress::new(email)
        .map_err(|err| ReminderQueryError::query(format!("invalid stored email: {err}")))?;
    let amount = Amount::new(amount)
        .map_err(|err| ReminderQueryError::query(format!("invalid stored amount: {err}")))?;
    Ok(DueReminder {
        email,
        user_name,
        expense_name,
        amount,
    })
}

#[async_trait]
impl ReminderQuery for DieselReminderQuery {
    async fn due_reminders(&self, date: NaiveDate) -> Result<Vec<DueReminder>, ReminderQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReminderTuple> = regular_expenses::table
            .inner_join(users::table)
            .filter(regular_expenses::next_date.eq(date))
            .order_by(regular_expenses::id)
            .select((
                users::name,
                users::email,
                regular_expenses::name,
                regular_expenses::amount,
            ))
            .load(&mut conn)
            .await
            .map_err(|err| {
                ReminderQueryError::query(map_diesel_error_message(&err, "due reminder query"))
            })?;

        rows.into_iter().map(tuple_to_reminder).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn converts_valid_tuple() {
        let reminder = tuple_to_reminder((
            "Ada".into(),
            "ada@example.com".into(),
            "rent".into(),
            50_000,
        ))
        .expect("converts");
        assert_eq!(reminder.email.as_str(), "ada@example.com");
        assert_eq!(reminder.user_name, "Ada");
        assert_eq!(reminder.expense_name, "rent");
        assert_eq!(reminder.amount.as_i64(), 50_000);
    }

    #[rstest]
    fn rejects_corrupt_email() {
        let err = tuple_to_reminder(("Ada".into(), "not-an-address".into(), "rent".into(), 1))
            .expect_err("rejected");
        assert!(matches!(err, ReminderQueryError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, ReminderQueryError::Connection { .. }));
    }
}
