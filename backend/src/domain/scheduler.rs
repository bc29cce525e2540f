//! Daily scheduler driving the rollover and notification engines.
//!
//! On each tick the scheduler reads "today" from an injectable clock, rolls
//! over today's due definitions, then sends reminders for tomorrow's. Engine
//! errors are logged and swallowed; nothing upstream observes them. Ticks
//! are strictly sequential within one process, and the rollover watermark
//! makes cross-process or post-restart double-runs harmless.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use tracing::error;

use crate::domain::ports::{Mailer, ReminderQuery, RolloverRepository};
use crate::domain::reminders::ReminderService;
use crate::domain::rollover::RolloverService;

/// Async sleep abstraction so tests can drive ticks without real time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Tick cadence of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Production cadence: once per day at midnight UTC.
    DailyAtMidnight,
    /// Fixed short interval, used for smoke testing deployments.
    Every(Duration),
}

impl Cadence {
    /// Time to wait from `now` until the next tick.
    fn delay_from(self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::Every(interval) => interval,
            Self::DailyAtMidnight => {
                let next_midnight = now
                    .date_naive()
                    .checked_add_days(Days::new(1))
                    .map(|date| date.and_time(NaiveTime::MIN))
                    .and_then(|naive| Utc.from_local_datetime(&naive).single());
                match next_midnight {
                    Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO),
                    // Unreachable within the supported date range; waiting a
                    // day keeps the loop alive rather than spinning.
                    None => Duration::from_secs(86_400),
                }
            }
        }
    }
}

/// Background loop owning the rollover and reminder services.
pub struct Scheduler<R, Q, M> {
    rollover: RolloverService<R>,
    reminders: ReminderService<Q, M>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    cadence: Cadence,
}

impl<R, Q, M> Scheduler<R, Q, M>
where
    R: RolloverRepository,
    Q: ReminderQuery,
    M: Mailer,
{
    /// Create a scheduler with explicit clock and sleeper implementations.
    pub fn new(
        rollover: RolloverService<R>,
        reminders: ReminderService<Q, M>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
        cadence: Cadence,
    ) -> Self {
        Self {
            rollover,
            reminders,
            clock,
            sleeper,
            cadence,
        }
    }

    /// Run ticks forever. Spawn this on the runtime; it never returns.
    pub async fn run_forever(self) {
        loop {
            let delay = self.cadence.delay_from(self.clock.utc());
            self.sleeper.sleep(delay).await;
            self.tick().await;
        }
    }

    /// Execute one scheduler tick: rollover for today, reminders for
    /// tomorrow.
    pub async fn tick(&self) {
        let today = self.clock.utc().date_naive();

        if let Err(err) = self.rollover.run(today).await {
            error!(date = %today, error = %err, "scheduled rollover failed");
        }

        let Some(tomorrow) = today.checked_add_days(Days::new(1)) else {
            error!(date = %today, "cannot compute tomorrow; skipping reminders");
            return;
        };
        if let Err(err) = self.reminders.run(tomorrow).await {
            error!(date = %tomorrow, error = %err, "scheduled reminders failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockMailer, MockReminderQuery, MockRolloverRepository, RolloverReport,
    };
    use chrono::NaiveDate;
    use mockable::MockClock;

    fn fixed_clock(y: i32, m: u32, d: u32, h: u32) -> MockClock {
        let mut clock = MockClock::new();
        let at = NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 30, 0))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .expect("valid test datetime");
        clock.expect_utc().returning(move || at);
        clock
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[rstest::rstest]
    fn daily_cadence_waits_until_next_midnight() {
        let now = Utc
            .from_utc_datetime(
                &date(2026, 1, 1)
                    .and_hms_opt(22, 0, 0)
                    .expect("valid test datetime"),
            );
        let delay = Cadence::DailyAtMidnight.delay_from(now);
        assert_eq!(delay, Duration::from_secs(2 * 3600));
    }

    #[rstest::rstest]
    fn fixed_cadence_returns_its_interval() {
        let now = Utc::now();
        let delay = Cadence::Every(Duration::from_secs(5)).delay_from(now);
        assert_eq!(delay, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn tick_rolls_over_today_and_reminds_tomorrow() {
        let mut repo = MockRolloverRepository::new();
        repo.expect_roll_over()
            .withf(|d| *d == date(2026, 1, 31))
            .times(1)
            .return_once(|_| Ok(RolloverReport::Completed { rolled_over: 1 }));

        let mut query = MockReminderQuery::new();
        query
            .expect_due_reminders()
            .withf(|d| *d == date(2026, 2, 1))
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let scheduler = Scheduler::new(
            RolloverService::new(Arc::new(repo)),
            ReminderService::new(Arc::new(query), Arc::new(MockMailer::new())),
            Arc::new(fixed_clock(2026, 1, 31, 0)),
            Arc::new(TokioSleeper),
            Cadence::DailyAtMidnight,
        );
        scheduler.tick().await;
    }

    #[tokio::test]
    async fn tick_swallows_engine_errors() {
        let mut repo = MockRolloverRepository::new();
        repo.expect_roll_over().times(1).return_once(|_| {
            Err(crate::domain::ports::RolloverRepositoryError::transaction(
                "boom",
            ))
        });

        // Reminders still run after a rollover failure.
        let mut query = MockReminderQuery::new();
        query
            .expect_due_reminders()
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let scheduler = Scheduler::new(
            RolloverService::new(Arc::new(repo)),
            ReminderService::new(Arc::new(query), Arc::new(MockMailer::new())),
            Arc::new(fixed_clock(2026, 1, 1, 12)),
            Arc::new(TokioSleeper),
            Cadence::Every(Duration::from_secs(5)),
        );
        scheduler.tick().await;
    }
}
