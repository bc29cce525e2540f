//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! The adapters are thin: they translate between Diesel row structs
//! (`models.rs`, `schema.rs` — internal details, never exposed to the
//! domain) and domain types, and map database failures into the ports'
//! strongly typed errors. Business logic stays in the domain layer.

pub(crate) mod diesel_helpers;
mod diesel_expense_repository;
mod diesel_reminder_query;
mod diesel_rollover_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_expense_repository::DieselExpenseRepository;
pub use diesel_reminder_query::DieselReminderQuery;
pub use diesel_rollover_repository::DieselRolloverRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{run_migrations, MigrationError};
pub use pool::{DbPool, PoolConfig, PoolError};
