//! Reminder domain types

use chrono::{DateTime, Local};
use std::fmt;
use uuid::Uuid;

/// Chat identifier of the user a reminder belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier assigned when a reminder is created
///
/// List positions shift on every deletion; this id never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderId(Uuid);

impl ReminderId {
    pub fn new() -> Self {
        ReminderId(Uuid::new_v4())
    }
}

impl Default for ReminderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderStatus {
    /// Text entered, fire time not yet resolved
    Pending,
    /// Fire time resolved and a delivery task registered
    Scheduled,
    /// Removed before it fired
    Cancelled,
    /// Notification attempted
    Fired,
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderStatus::Pending => write!(f, "pending"),
            ReminderStatus::Scheduled => write!(f, "scheduled"),
            ReminderStatus::Cancelled => write!(f, "cancelled"),
            ReminderStatus::Fired => write!(f, "fired"),
        }
    }
}

/// A single reminder record
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    /// Stable identifier
    pub id: ReminderId,

    /// Owner of the reminder
    pub user_id: UserId,

    /// Reminder text, trimmed and never empty
    pub text: String,

    /// When the notification is due (None while the reminder is a draft)
    pub fire_time: Option<DateTime<Local>>,

    /// Current lifecycle status
    pub status: ReminderStatus,

    /// When the reminder was created
    pub created_at: DateTime<Local>,
}

impl Reminder {
    /// Create a draft reminder with no fire time
    pub(crate) fn draft(user_id: UserId, text: &str) -> Self {
        Self {
            id: ReminderId::new(),
            user_id,
            text: text.to_string(),
            fire_time: None,
            status: ReminderStatus::Pending,
            created_at: Local::now(),
        }
    }

    /// Whether the fire time is still unresolved
    pub fn is_draft(&self) -> bool {
        self.status == ReminderStatus::Pending && self.fire_time.is_none()
    }

    /// Whether a notification may still be delivered for this reminder
    pub fn is_due_for_delivery(&self) -> bool {
        matches!(
            self.status,
            ReminderStatus::Pending | ReminderStatus::Scheduled
        ) && self.fire_time.is_some()
    }
}

/// Reference to a draft reminder awaiting its fire time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftHandle {
    pub user_id: UserId,
    pub reminder_id: ReminderId,
}
