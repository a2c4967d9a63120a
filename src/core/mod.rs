//! # Core Module
//!
//! Configuration and message utilities shared by the bot binary and the
//! transport.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add response module with message chunking
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod response;

pub use config::{Config, ReminderSettings};
pub use response::{chunk_for_message, chunk_text, MESSAGE_LIMIT};
