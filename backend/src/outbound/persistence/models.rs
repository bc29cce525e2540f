//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDate;
use diesel::prelude::*;

use super::schema::{expenses, regular_expenses, rollover_runs, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
}

/// Changeset struct for full-replace user updates.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading from the regular_expenses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = regular_expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegularExpenseRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub next_date: Option<NaiveDate>,
    pub frequency: String,
    pub amount: i64,
}

/// Insertable struct for creating new definitions.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = regular_expenses)]
pub(crate) struct NewRegularExpenseRow<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub next_date: Option<NaiveDate>,
    pub frequency: String,
    pub amount: i64,
}

/// Row struct for reading from the expenses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseRow {
    pub id: i64,
    pub user_id: i64,
    pub regular_expense_id: i64,
    pub date: NaiveDate,
}

/// Insertable struct for materialising occurrences during rollover.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expenses)]
pub(crate) struct NewExpenseRow {
    pub user_id: i64,
    pub regular_expense_id: i64,
    pub date: NaiveDate,
}

/// Insertable struct for the rollover watermark.
///
/// `completed_at` is filled by the database default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rollover_runs)]
pub(crate) struct NewRolloverRunRow {
    pub run_date: NaiveDate,
}
