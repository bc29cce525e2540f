//! Rollover engine: materialise due recurring expenses for one date.
//!
//! The heavy lifting is transactional and lives behind the
//! [`RolloverRepository`] port: taking the per-date watermark, advancing
//! every due definition by its frequency, and inserting one occurrence per
//! advanced definition commit atomically. This service orchestrates a run,
//! maps port errors into domain errors, and reports the outcome.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::ports::{RolloverReport, RolloverRepository, RolloverRepositoryError};
use crate::domain::Error;

/// Summary of one rollover invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverOutcome {
    /// Date the run was keyed on.
    pub date: NaiveDate,
    /// True when the watermark showed the date was already processed.
    pub skipped: bool,
    /// Definitions advanced (zero when skipped).
    pub rolled_over: usize,
}

/// Drives one transactional rollover per calendar date.
#[derive(Clone)]
pub struct RolloverService<R> {
    repository: Arc<R>,
}

impl<R> RolloverService<R> {
    /// Create a new service with the given repository.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R> RolloverService<R>
where
    R: RolloverRepository,
{
    /// Roll over every definition due on `date`.
    ///
    /// Re-running for an already-processed date is a no-op: the watermark
    /// taken inside the repository transaction reports it as skipped, so a
    /// restarted or overlapping scheduler cannot double-advance definitions.
    ///
    /// # Errors
    ///
    /// Propagates repository failures; the transaction guarantees nothing
    /// was committed when an error is returned.
    pub async fn run(&self, date: NaiveDate) -> Result<RolloverOutcome, Error> {
        let report = self
            .repository
            .roll_over(date)
            .await
            .map_err(map_rollover_error)?;

        let outcome = match report {
            RolloverReport::Completed { rolled_over } => RolloverOutcome {
                date,
                skipped: false,
                rolled_over,
            },
            RolloverReport::AlreadyRun => RolloverOutcome {
                date,
                skipped: true,
                rolled_over: 0,
            },
        };

        info!(
            date = %outcome.date,
            skipped = outcome.skipped,
            rolled_over = outcome.rolled_over,
            "rollover run finished"
        );
        Ok(outcome)
    }
}

fn map_rollover_error(error: RolloverRepositoryError) -> Error {
    match error {
        RolloverRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rollover store unavailable: {message}"))
        }
        RolloverRepositoryError::Transaction { message } => {
            Error::internal(format!("rollover transaction failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockRolloverRepository;
    use crate::domain::ErrorCode;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[tokio::test]
    async fn reports_completed_run() {
        let mut repo = MockRolloverRepository::new();
        let run_date = date(2026, 1, 1);
        repo.expect_roll_over()
            .withf(move |d| *d == run_date)
            .times(1)
            .return_once(|_| Ok(RolloverReport::Completed { rolled_over: 3 }));

        let service = RolloverService::new(Arc::new(repo));
        let outcome = service.run(run_date).await.expect("run succeeds");

        assert_eq!(
            outcome,
            RolloverOutcome {
                date: run_date,
                skipped: false,
                rolled_over: 3,
            }
        );
    }

    #[tokio::test]
    async fn reports_skip_when_date_already_processed() {
        let mut repo = MockRolloverRepository::new();
        repo.expect_roll_over()
            .times(1)
            .return_once(|_| Ok(RolloverReport::AlreadyRun));

        let service = RolloverService::new(Arc::new(repo));
        let outcome = service.run(date(2026, 1, 1)).await.expect("run succeeds");

        assert!(outcome.skipped);
        assert_eq!(outcome.rolled_over, 0);
    }

    #[tokio::test]
    async fn propagates_transaction_failure() {
        let mut repo = MockRolloverRepository::new();
        repo.expect_roll_over()
            .times(1)
            .return_once(|_| Err(RolloverRepositoryError::transaction("insert failed")));

        let service = RolloverService::new(Arc::new(repo));
        let error = service.run(date(2026, 1, 1)).await.expect_err("fails");

        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(error.message().contains("insert failed"));
    }

    #[tokio::test]
    async fn maps_connection_failure_to_service_unavailable() {
        let mut repo = MockRolloverRepository::new();
        repo.expect_roll_over()
            .times(1)
            .return_once(|_| Err(RolloverRepositoryError::connection("pool exhausted")));

        let service = RolloverService::new(Arc::new(repo));
        let error = service.run(date(2026, 1, 1)).await.expect_err("fails");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
