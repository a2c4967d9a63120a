//! # Transport
//!
//! Interfaces between the reminder core and a chat platform. The core only
//! ever talks to a [`NotificationSink`] and receives [`InputEvent`]s; the
//! Discord adapter in [`discord`] implements both ends.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod discord;

use anyhow::Result;
use async_trait::async_trait;

use crate::features::reminders::{Command, UserId};

/// Buttons attached to an outgoing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Add reminder / View reminders
    MainMenu,
    /// Back / Delete reminder, shown under a listing
    ReminderList,
}

impl Keyboard {
    /// Commands offered by this keyboard, in display order
    pub fn commands(&self) -> &'static [Command] {
        match self {
            Keyboard::MainMenu => &[Command::AddReminder, Command::ListReminders],
            Keyboard::ReminderList => &[Command::Back, Command::DeleteReminder],
        }
    }
}

/// Outgoing side of the chat platform
///
/// Must be callable from scheduled tasks, independently of the input loop.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send plain text to a user
    async fn send(&self, user_id: UserId, text: &str) -> Result<()>;

    /// Send text with buttons; platforms without buttons fall back to text
    async fn send_with_keyboard(&self, user_id: UserId, text: &str, keyboard: Keyboard) -> Result<()> {
        let _ = keyboard;
        self.send(user_id, text).await
    }
}

/// Incoming user input, as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Free text typed by the user
    Text { user_id: UserId, text: String },
    /// A button press
    Selection { user_id: UserId, command: Command },
}

impl InputEvent {
    pub fn user_id(&self) -> UserId {
        match self {
            InputEvent::Text { user_id, .. } | InputEvent::Selection { user_id, .. } => *user_id,
        }
    }
}
