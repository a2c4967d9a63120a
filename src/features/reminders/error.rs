//! Error types for reminder operations

use chrono::{DateTime, Local};
use thiserror::Error;

/// Result type alias for reminder operations
pub type Result<T> = std::result::Result<T, ReminderError>;

/// Failures surfaced to the acting user
///
/// None of these are fatal; each is recovered at the operation boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReminderError {
    #[error("Reminder text must not be empty")]
    InvalidInput,

    #[error("Could not read '{input}' as a date and time")]
    TimeParseError { input: String },

    #[error("Fire time {} is not in the future", .fire_time.format("%Y-%m-%d %H:%M"))]
    TimeAlreadyPassed { fire_time: DateTime<Local> },

    #[error("Reminder #{index} does not exist ({count} reminders)")]
    IndexOutOfRange { index: i64, count: usize },

    #[error("'{input}' is not a reminder number")]
    InvalidIndex { input: String },

    #[error("Reminder limit of {limit} reached")]
    TooManyReminders { limit: usize },

    #[error("No reminder draft in progress")]
    DraftNotFound,

    #[error("Could not schedule reminder: {reason}")]
    SchedulingFailure { reason: String },

    #[error("Could not deliver reminder: {reason}")]
    NotificationDeliveryFailure { reason: String },
}

impl ReminderError {
    /// Whether the error came from a deletion request
    pub fn is_bad_index(&self) -> bool {
        matches!(
            self,
            ReminderError::IndexOutOfRange { .. } | ReminderError::InvalidIndex { .. }
        )
    }
}
