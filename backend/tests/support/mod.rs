//! In-memory port implementations backing the behavioural test suites.
//!
//! The store mimics the PostgreSQL schema (unique emails, soft-deleted
//! definitions, a rollover watermark) so the domain services can be exercised
//! end to end without a database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use expenses_backend::domain::ports::{
    DueReminder, ExpenseRepository, ExpenseRepositoryError, Mailer, MailerError, ReminderMessage,
    ReminderQuery, ReminderQueryError, RolloverReport, RolloverRepository, RolloverRepositoryError,
    UserRepository, UserRepositoryError,
};
use expenses_backend::domain::{
    DateRange, EmailAddress, ExpenseOccurrence, NewRecurringExpense, NewUser, RecurringExpense,
    RegularExpenseId, User, UserId,
};

/// Shared in-memory database standing in for PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    definitions: Mutex<Vec<RecurringExpense>>,
    occurrences: Mutex<Vec<ExpenseOccurrence>>,
    rollover_runs: Mutex<HashSet<NaiveDate>>,
    rollover_fault: Mutex<Option<String>>,
    next_user_id: AtomicI64,
    next_definition_id: AtomicI64,
    next_occurrence_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_user_id: AtomicI64::new(1),
            next_definition_id: AtomicI64::new(1),
            next_occurrence_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    pub fn occurrences(&self) -> Vec<ExpenseOccurrence> {
        self.occurrences.lock().expect("store poisoned").clone()
    }

    /// Make the next rollover run fail while processing the named
    /// definition, as if its occurrence insert were rejected mid
    /// transaction. The fault is consumed by the failing run.
    pub fn fail_rollover_at(&self, definition_name: impl Into<String>) {
        *self.rollover_fault.lock().expect("store poisoned") = Some(definition_name.into());
    }

    pub fn definition(&self, id: RegularExpenseId) -> Option<RecurringExpense> {
        self.definitions
            .lock()
            .expect("store poisoned")
            .iter()
            .find(|definition| definition.id == id)
            .cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut users = self.users.lock().expect("store poisoned");
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email.as_str()));
        }
        let id = UserId::new(self.next_user_id.fetch_add(1, Ordering::SeqCst))
            .expect("generated ids are positive");
        let stored = User {
            id,
            email: user.email.clone(),
            name: user.name.clone(),
            password_hash: user.password_hash.clone(),
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.lock().expect("store poisoned");
        match users.iter_mut().find(|existing| existing.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(UserRepositoryError::NotFound {
                id: user.id.as_i64(),
            }),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), UserRepositoryError> {
        let mut users = self.users.lock().expect("store poisoned");
        let before = users.len();
        users.retain(|existing| existing.id != id);
        if users.len() == before {
            return Err(UserRepositoryError::NotFound { id: id.as_i64() });
        }
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        let users = self.users.lock().expect("store poisoned");
        Ok(users.iter().find(|user| &user.email == email).cloned())
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn create_definition(
        &self,
        definition: &NewRecurringExpense,
    ) -> Result<RecurringExpense, ExpenseRepositoryError> {
        let id = RegularExpenseId::new(self.next_definition_id.fetch_add(1, Ordering::SeqCst))
            .expect("generated ids are positive");
        let stored = RecurringExpense {
            id,
            user_id: definition.user_id,
            name: definition.name.clone(),
            description: definition.description.clone(),
            frequency: definition.frequency,
            amount: definition.amount,
            next_date: Some(definition.next_date),
        };
        self.definitions
            .lock()
            .expect("store poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn deactivate_definition(
        &self,
        user_id: UserId,
        id: RegularExpenseId,
    ) -> Result<(), ExpenseRepositoryError> {
        let mut definitions = self.definitions.lock().expect("store poisoned");
        match definitions
            .iter_mut()
            .find(|definition| definition.id == id && definition.user_id == user_id)
        {
            Some(definition) => {
                definition.next_date = None;
                Ok(())
            }
            None => Err(ExpenseRepositoryError::NotFound { id: id.as_i64() }),
        }
    }

    async fn active_definitions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RecurringExpense>, ExpenseRepositoryError> {
        let definitions = self.definitions.lock().expect("store poisoned");
        Ok(definitions
            .iter()
            .filter(|definition| definition.user_id == user_id && definition.next_date.is_some())
            .cloned()
            .collect())
    }

    async fn occurrences_in_range(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<ExpenseOccurrence>, ExpenseRepositoryError> {
        let occurrences = self.occurrences.lock().expect("store poisoned");
        Ok(occurrences
            .iter()
            .filter(|occurrence| {
                occurrence.user_id == user_id && range.contains(occurrence.date)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RolloverRepository for MemoryStore {
    /// All-or-nothing, matching the port contract: every mutation is
    /// staged locally and applied only once the whole run has succeeded,
    /// so a failure leaves the definitions, occurrences, and watermark
    /// exactly as they were.
    async fn roll_over(&self, date: NaiveDate) -> Result<RolloverReport, RolloverRepositoryError> {
        let mut runs = self.rollover_runs.lock().expect("store poisoned");
        if runs.contains(&date) {
            return Ok(RolloverReport::AlreadyRun);
        }

        let mut definitions = self.definitions.lock().expect("store poisoned");
        let mut fault = self.rollover_fault.lock().expect("store poisoned");

        let mut staged: Vec<(RegularExpenseId, NaiveDate, UserId)> = Vec::new();
        for definition in definitions
            .iter()
            .filter(|definition| definition.next_date == Some(date))
        {
            if fault.as_deref() == Some(definition.name.as_str()) {
                fault.take();
                return Err(RolloverRepositoryError::transaction(
                    "occurrence insert rejected",
                ));
            }
            let advanced = definition.frequency.advance(date).ok_or_else(|| {
                RolloverRepositoryError::transaction("calendar overflow advancing next date")
            })?;
            staged.push((definition.id, advanced, definition.user_id));
        }

        let mut occurrences = self.occurrences.lock().expect("store poisoned");
        for (id, advanced, user_id) in &staged {
            if let Some(definition) = definitions
                .iter_mut()
                .find(|definition| definition.id == *id)
            {
                definition.next_date = Some(*advanced);
            }
            occurrences.push(ExpenseOccurrence {
                id: self.next_occurrence_id.fetch_add(1, Ordering::SeqCst),
                user_id: *user_id,
                regular_expense_id: *id,
                date,
            });
        }
        runs.insert(date);
        Ok(RolloverReport::Completed {
            rolled_over: staged.len(),
        })
    }
}

#[async_trait]
impl ReminderQuery for MemoryStore {
    async fn due_reminders(&self, date: NaiveDate) -> Result<Vec<DueReminder>, ReminderQueryError> {
        let users = self.users.lock().expect("store poisoned");
        let definitions = self.definitions.lock().expect("store poisoned");
        Ok(definitions
            .iter()
            .filter(|definition| definition.next_date == Some(date))
            .filter_map(|definition| {
                users
                    .iter()
                    .find(|user| user.id == definition.user_id)
                    .map(|user| DueReminder {
                        email: user.email.clone(),
                        user_name: user.name.clone(),
                        expense_name: definition.name.clone(),
                        amount: definition.amount,
                    })
            })
            .collect())
    }
}

/// Recording mailer; optionally fails for one recipient address.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<ReminderMessage>>,
    fail_for: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(address: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: Some(address.into()),
        }
    }

    pub fn sent(&self) -> Vec<ReminderMessage> {
        self.sent.lock().expect("mailer poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &ReminderMessage) -> Result<(), MailerError> {
        if self.fail_for.as_deref() == Some(message.to.as_str()) {
            return Err(MailerError::transport("relay rejected recipient"));
        }
        self.sent
            .lock()
            .expect("mailer poisoned")
            .push(message.clone());
        Ok(())
    }
}
