//! # Reminders Feature
//!
//! Per-user reminder lists, one timer task per pending reminder, and the
//! conversation that walks a user through adding, listing and deleting them.
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Timer task per reminder with cancel handles, replacing polling
//! - 1.0.0: Initial add/list/delete flow

pub mod command;
pub mod conversation;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod store;
pub mod time;

pub use command::Command;
pub use conversation::{Action, ConversationState, ConversationStateMachine};
pub use error::{ReminderError, Result};
pub use model::{DraftHandle, Reminder, ReminderId, ReminderStatus, UserId};
pub use scheduler::{notification_text, CancelHandle, Rejection, ReminderScheduler, ScheduleResult};
pub use store::ReminderStore;
pub use time::{format_duration, format_fire_time, parse_fire_time, TIME_FORMAT_HINT};
