//! Routes transport input through the conversation and sends the reply
//!
//! The dispatcher is the only place that turns an [`Action`] into user-facing
//! text. The transport hands it [`InputEvent`]s and never looks at reminder
//! state directly.

use chrono::{DateTime, Local};
use log::{debug, error};
use std::sync::Arc;

use crate::features::reminders::{
    format_duration, format_fire_time, Action, ConversationStateMachine, Reminder, ReminderError,
    ReminderStatus, TIME_FORMAT_HINT,
};
use crate::transport::{InputEvent, Keyboard, NotificationSink};

/// Rendered reply for one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            keyboard: None,
        }
    }

    fn with_menu(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            keyboard: Some(Keyboard::MainMenu),
        }
    }
}

pub struct Dispatcher {
    machine: ConversationStateMachine,
    sink: Arc<dyn NotificationSink>,
}

impl Dispatcher {
    pub fn new(machine: ConversationStateMachine, sink: Arc<dyn NotificationSink>) -> Self {
        Dispatcher { machine, sink }
    }

    pub fn machine(&self) -> &ConversationStateMachine {
        &self.machine
    }

    /// Handle one input and deliver the reply to its user
    ///
    /// Reply delivery failures are logged; the state change has already
    /// happened by then and is not rolled back.
    pub async fn dispatch(&self, event: InputEvent) -> Action {
        let user_id = event.user_id();
        let action = match event {
            InputEvent::Text { user_id, text } => self.machine.handle_input(user_id, &text),
            InputEvent::Selection { user_id, command } => {
                self.machine.handle_command(user_id, command)
            }
        };
        debug!("User {user_id}: {action:?}");

        let reply = render(&action);
        let sent = match reply.keyboard {
            Some(keyboard) => {
                self.sink
                    .send_with_keyboard(user_id, &reply.text, keyboard)
                    .await
            }
            None => self.sink.send(user_id, &reply.text).await,
        };
        if let Err(e) = sent {
            error!("Failed to send reply to user {user_id}: {e}");
        }

        action
    }
}

/// Render an action as of now
pub fn render(action: &Action) -> Reply {
    render_at(action, Local::now())
}

pub fn render_at(action: &Action, now: DateTime<Local>) -> Reply {
    match action {
        Action::ShowMenu => Reply::with_menu("Choose an action:"),
        Action::PromptReminderText { rejected: None } => Reply::plain("Enter the reminder text:"),
        Action::PromptReminderText { rejected: Some(_) } => {
            Reply::plain("The reminder text can't be empty. Enter the reminder text:")
        }
        Action::PromptReminderTime { rejected: None } => Reply::plain(format!(
            "When should I remind you? Enter the date and time as '{TIME_FORMAT_HINT}'."
        )),
        Action::PromptReminderTime { rejected: Some(_) } => Reply::plain(format!(
            "Invalid date and time format. Please try again using '{TIME_FORMAT_HINT}'."
        )),
        Action::PromptDeletionIndex => {
            Reply::plain("Enter the number of the reminder to delete:")
        }
        Action::ShowReminders(reminders) if reminders.is_empty() => {
            Reply::with_menu("You have no active reminders.")
        }
        Action::ShowReminders(reminders) => Reply {
            text: render_list(reminders, now),
            keyboard: Some(Keyboard::ReminderList),
        },
        Action::ReminderAdded(reminder) => {
            let when = reminder
                .fire_time
                .map(|t| format!(" for {} ({})", format_fire_time(&t), relative(t, now)))
                .unwrap_or_default();
            Reply::with_menu(format!("Reminder added{when}!"))
        }
        Action::ReminderRejected(error) => Reply::with_menu(rejection_text(error)),
        Action::ReminderDeleted(Ok(_)) => Reply::with_menu("Reminder deleted."),
        Action::ReminderDeleted(Err(e)) if e.is_bad_index() => {
            Reply::with_menu("Invalid reminder number. Please try again.")
        }
        Action::ReminderDeleted(Err(e)) => Reply::with_menu(rejection_text(e)),
        Action::Unrecognized => Reply::with_menu("Please use the buttons to interact."),
    }
}

fn rejection_text(error: &ReminderError) -> String {
    match error {
        ReminderError::TimeAlreadyPassed { .. } => {
            "That time has already passed. Reminder not added.".to_string()
        }
        ReminderError::TooManyReminders { limit } => format!(
            "You already have {limit} reminders. Delete one before adding another."
        ),
        ReminderError::SchedulingFailure { .. } => {
            "I can't schedule more reminders right now. Please try again later.".to_string()
        }
        other => format!("Something went wrong: {other}"),
    }
}

fn render_list(reminders: &[Reminder], now: DateTime<Local>) -> String {
    let mut text = String::from("Your reminders:");
    for (i, reminder) in reminders.iter().enumerate() {
        let time = reminder
            .fire_time
            .map(|t| format_fire_time(&t))
            .unwrap_or_else(|| "not set".to_string());
        let hint = match (reminder.status, reminder.fire_time) {
            (ReminderStatus::Fired, _) => "sent".to_string(),
            (_, Some(t)) => relative(t, now),
            (_, None) => "waiting for time".to_string(),
        };
        text.push_str(&format!(
            "\n{}. Reminder: {}, Time: {} ({})",
            i + 1,
            reminder.text,
            time,
            hint
        ));
    }
    text
}

fn relative(fire_time: DateTime<Local>, now: DateTime<Local>) -> String {
    format!("in {}", format_duration((fire_time - now).num_seconds()))
}
