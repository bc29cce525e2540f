//! Backend library modules.
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod api;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
