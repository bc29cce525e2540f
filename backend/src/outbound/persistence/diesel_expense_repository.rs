//! PostgreSQL-backed [`ExpenseRepository`] implementation using Diesel.
//!
//! Covers definition CRUD and occurrence reads. Deletion is a soft-delete:
//! the definition's `next_date` is nulled, the row stays so historical
//! occurrences keep a valid parent.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ExpenseRepository, ExpenseRepositoryError};
use crate::domain::{
    Amount, DateRange, ExpenseOccurrence, NewRecurringExpense, RecurringExpense, RegularExpenseId,
    UserId,
};

use super::diesel_helpers::{map_diesel_error_message, map_pool_error_message};
use super::models::{ExpenseRow, NewRegularExpenseRow, RegularExpenseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{expenses, regular_expenses};

/// Diesel-backed implementation of the [`ExpenseRepository`] port.
#[derive(Clone)]
pub struct DieselExpenseRepository {
    pool: DbPool,
}

impl DieselExpenseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ExpenseRepositoryError {
    ExpenseRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: &diesel::result::Error, operation: &str) -> ExpenseRepositoryError {
    ExpenseRepositoryError::query(map_diesel_error_message(error, operation))
}

/// Convert a database row into a domain definition.
pub(crate) fn row_to_definition(
    row: RegularExpenseRow,
) -> Result<RecurringExpense, ExpenseRepositoryError> {
    let id = RegularExpenseId::new(row.id)
        .map_err(|err| ExpenseRepositoryError::query(format!("invalid stored id: {err}")))?;
    let user_id = UserId::new(row.user_id)
        .map_err(|err| ExpenseRepositoryError::query(format!("invalid stored owner: {err}")))?;
    let frequency = row.frequency.parse().map_err(|err| {
        ExpenseRepositoryError::query(format!(
            "invalid stored frequency for definition {}: {err}",
            row.id
        ))
    })?;
    let amount = Amount::new(row.amount)
        .map_err(|err| ExpenseRepositoryError::query(format!("invalid stored amount: {err}")))?;

    Ok(RecurringExpense {
        id,
        user_id,
        name: row.name,
        description: row.description,
        frequency,
        amount,
        next_date: row.next_date,
    })
}

fn row_to_occurrence(row: ExpenseRow) -> Result<ExpenseOccurrence, ExpenseRepositoryError> {
    let user_id = UserId::new(row.user_id)
        .map_err(|err| ExpenseRepositoryError::query(format!("invalid stored owner: {err}")))?;
    let regular_expense_id = RegularExpenseId::new(row.regular_expense_id)
        .map_err(|err| ExpenseRepositoryError::query(format!("invalid stored parent: {err}")))?;
    Ok(ExpenseOccurrence {
        id: row.id,
        user_id,
        regular_expense_id,
        date: row.date,
    })
}

#[async_trait]
impl ExpenseRepository for DieselExpenseRepository {
    async fn create_definition(
        &self,
        definition: &NewRecurringExpense,
    ) -> Result<RecurringExpense, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewRegularExpenseRow {
            user_id: definition.user_id.as_i64(),
            name: &definition.name,
            description: definition.description.as_deref(),
            next_date: Some(definition.next_date),
            frequency: definition.frequency.to_string(),
            amount: definition.amount.as_i64(),
        };

        let row: RegularExpenseRow = diesel::insert_into(regular_expenses::table)
            .values(&new_row)
            .returning(RegularExpenseRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "definition insert"))?;

        row_to_definition(row)
    }

    async fn deactivate_definition(
        &self,
        user_id: UserId,
        id: RegularExpenseId,
    ) -> Result<(), ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Scoping by owner makes a foreign definition indistinguishable
        // from a missing one.
        let target = regular_expenses::table
            .find(id.as_i64())
            .filter(regular_expenses::user_id.eq(user_id.as_i64()));
        let updated_rows = diesel::update(target)
            .set(regular_expenses::next_date.eq(Option::<chrono::NaiveDate>::None))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "definition soft-delete"))?;

        if updated_rows == 0 {
            return Err(ExpenseRepositoryError::NotFound { id: id.as_i64() });
        }
        Ok(())
    }

    async fn active_definitions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecurringExpense>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RegularExpenseRow> = regular_expenses::table
            .filter(regular_expenses::user_id.eq(user_id.as_i64()))
            .filter(regular_expenses::next_date.is_not_null())
            .order_by(regular_expenses::id)
            .select(RegularExpenseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "active definition list"))?;

        rows.into_iter().map(row_to_definition).collect()
    }

    async fn occurrences_in_range(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<ExpenseOccurrence>, ExpenseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ExpenseRow> = expenses::table
            .filter(expenses::user_id.eq(user_id.as_i64()))
            .filter(expenses::date.ge(range.start()))
            .filter(expenses::date.le(range.end()))
            .order_by((expenses::date, expenses::id))
            .select(ExpenseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "occurrence range query"))?;

        rows.into_iter().map(row_to_occurrence).collect()
    }
}
