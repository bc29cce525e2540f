//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the embedded migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Primary key (bigserial).
        id -> Int8,
        /// Unique login and notification address.
        #[max_length = 255]
        email -> Varchar,
        /// Display name used in reminder messages.
        #[max_length = 255]
        name -> Varchar,
        /// Argon2 PHC-format password hash.
        #[max_length = 255]
        password_hash -> Varchar,
    }
}

diesel::table! {
    /// Recurring expense definitions.
    regular_expenses (id) {
        /// Primary key (bigserial).
        id -> Int8,
        /// Owning user.
        user_id -> Int8,
        /// Short label, e.g. "rent" (max 50 characters).
        #[max_length = 50]
        name -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Next due date; NULL means soft-deleted.
        next_date -> Nullable<Date>,
        /// Textual interval, e.g. "1 month".
        frequency -> Varchar,
        /// Non-negative charge in integer currency units.
        amount -> Int8,
    }
}

diesel::table! {
    /// Materialised expense occurrences (immutable history).
    expenses (id) {
        /// Primary key (bigserial).
        id -> Int8,
        /// Owning user at materialisation time.
        user_id -> Int8,
        /// Definition the occurrence was materialised from.
        regular_expense_id -> Int8,
        /// Date the charge fell due.
        date -> Date,
    }
}

diesel::table! {
    /// Per-date rollover watermark: one row per processed calendar date.
    rollover_runs (run_date) {
        /// Date the rollover committed for.
        run_date -> Date,
        /// Commit timestamp, for operator forensics.
        completed_at -> Timestamptz,
    }
}

diesel::joinable!(regular_expenses -> users (user_id));
diesel::joinable!(expenses -> users (user_id));
diesel::joinable!(expenses -> regular_expenses (regular_expense_id));

diesel::allow_tables_to_appear_in_same_query!(users, regular_expenses, expenses, rollover_runs);
