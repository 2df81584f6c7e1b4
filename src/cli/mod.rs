//! CLI command handlers

pub mod commands;

pub use commands::{init_template, inspect, inspect_export, show_config, transform};
