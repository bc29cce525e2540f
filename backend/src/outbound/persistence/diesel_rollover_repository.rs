//! PostgreSQL-backed rollover adapter.
//!
//! This adapter implements the `RolloverRepository` port. A rollover run
//! executes in a single transaction: it claims the run date in
//! `rollover_runs`, locks the due definitions, advances each definition's
//! `next_date` by its frequency, and records one expense occurrence per
//! definition. Claiming the date first makes reruns for the same date
//! no-ops, so a restarted scheduler never double-bills a day.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RolloverReport, RolloverRepository, RolloverRepositoryError};
use crate::domain::Frequency;

use super::models::{NewExpenseRow, NewRolloverRunRow, RegularExpenseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{expenses, regular_expenses, rollover_runs};

/// Diesel-backed implementation of the [`RolloverRepository`] port.
#[derive(Clone)]
pub struct DieselRolloverRepository {
    pool: DbPool,
}

impl DieselRolloverRepository {
    /// Create a new rollover repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the rollover transaction.
///
/// Diesel's async transaction helper rolls back on any error type that
/// converts from [`diesel::result::Error`], so corrupt row data aborts the
/// whole run rather than leaving a partial day applied.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    CorruptRow { id: i64, message: String },
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> RolloverRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RolloverRepositoryError::connection(message)
        }
    }
}

fn map_tx_error(error: TxError) -> RolloverRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        TxError::Diesel(DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info)) => {
            RolloverRepositoryError::connection(info.message().to_owned())
        }
        TxError::Diesel(diesel_error) => {
            debug!(error = %diesel_error, "rollover transaction failed");
            RolloverRepositoryError::transaction(diesel_error.to_string())
        }
        TxError::CorruptRow { id, message } => RolloverRepositoryError::transaction(format!(
            "definition {id} could not be rolled over: {message}"
        )),
    }
}

/// Compute the advanced `next_date` for a due definition.
fn advance_definition(row: &RegularExpenseRow, date: NaiveDate) -> Result<NaiveDate, TxError> {
    let frequency: Frequency = row.frequency.parse().map_err(|err| TxError::CorruptRow {
        id: row.id,
        message: format!("unparseable frequency {:?}: {err}", row.frequency),
    })?;
    frequency.advance(date).ok_or_else(|| TxError::CorruptRow {
        id: row.id,
        message: format!("advancing {date} by {frequency} overflows the calendar"),
    })
}

#[async_trait]
impl RolloverRepository for DieselRolloverRepository {
    async fn roll_over(&self, date: NaiveDate) -> Result<RolloverReport, RolloverRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let report = conn
            .transaction(|conn| {
                async move {
                    let claim = NewRolloverRunRow { run_date: date };
                    let claimed_rows = diesel::insert_into(rollover_runs::table)
                        .values(&claim)
                        .on_conflict(rollover_runs::run_date)
                        .do_nothing()
                        .execute(conn)
                        .await?;

                    if claimed_rows == 0 {
                        return Ok(RolloverReport::AlreadyRun);
                    }

                    let due: Vec<RegularExpenseRow> = regular_expenses::table
                        .filter(regular_expenses::next_date.eq(date))
                        .order_by(regular_expenses::id)
                        .for_update()
                        .select(RegularExpenseRow::as_select())
                        .load(conn)
                        .await?;

                    let mut occurrence_rows = Vec::with_capacity(due.len());
                    for row in &due {
                        let advanced = advance_definition(row, date)?;
                        diesel::update(regular_expenses::table.find(row.id))
                            .set(regular_expenses::next_date.eq(Some(advanced)))
                            .execute(conn)
                            .await?;
                        occurrence_rows.push(NewExpenseRow {
                            user_id: row.user_id,
                            regular_expense_id: row.id,
                            date,
                        });
                    }

                    if !occurrence_rows.is_empty() {
                        diesel::insert_into(expenses::table)
                            .values(&occurrence_rows)
                            .execute(conn)
                            .await?;
                    }

                    Ok(RolloverReport::Completed {
                        rolled_over: due.len(),
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(report)
    }
}
