//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ExpenseRepository, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
}

impl HttpState {
    /// Construct state from port implementations.
    pub fn new(users: Arc<dyn UserRepository>, expenses: Arc<dyn ExpenseRepository>) -> Self {
        Self { users, expenses }
    }
}
