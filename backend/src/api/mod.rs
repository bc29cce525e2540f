//! Operational API surface shared across inbound adapters.

pub mod health;
