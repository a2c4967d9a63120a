pub mod reminders;

pub use reminders::{ConversationStateMachine, ReminderScheduler, ReminderStore};
