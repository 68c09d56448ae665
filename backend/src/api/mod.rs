//! HTTP API module.
//!
//! This module provides the HTTP server, API types and the live log
//! stream for the camconv backend.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server, AppState};
pub use types::*;
