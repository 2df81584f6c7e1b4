//! Carta Cap Table API module
//!
//! HTTP access to `transform` and `inspect` for callers holding local paths.
//! Run with `carta-captable-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server};
