// Core layer - configuration and message utilities
pub mod core;

// Features layer - reminders and the conversation around them
pub mod features;

// Transport layer - sink/input interfaces and the Discord adapter
pub mod transport;

// Application layer
pub mod dispatcher;

pub use core::Config;
pub use dispatcher::Dispatcher;
pub use features::reminders::{
    Action, Command, ConversationState, ConversationStateMachine, Reminder, ReminderError,
    ReminderScheduler, ReminderStatus, ReminderStore,
};
pub use transport::{InputEvent, Keyboard, NotificationSink};
