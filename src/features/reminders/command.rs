//! Menu commands and their button ids
//!
//! A command arrives either as typed text or as a button click. Typed phrases
//! are matched case-insensitively; buttons carry a fixed custom id.

/// Button id for the "Add reminder" menu entry
pub const ADD_REMINDER_BUTTON: &str = "add_reminder";
/// Button id for the "View reminders" menu entry
pub const LIST_REMINDERS_BUTTON: &str = "list_reminders";
/// Button id under a reminder listing that returns to the menu
pub const BACK_BUTTON: &str = "back";
/// Button id under a reminder listing that starts a deletion
pub const DELETE_REMINDER_BUTTON: &str = "deletion";

/// A menu-level request, recognised in every conversation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    AddReminder,
    ListReminders,
    Back,
    DeleteReminder,
}

impl Command {
    /// Match typed text against the command phrases
    pub fn parse(text: &str) -> Option<Command> {
        match text.trim().to_lowercase().as_str() {
            "/start" | "/menu" => Some(Command::Start),
            "add reminder" | "/add" => Some(Command::AddReminder),
            "view reminders" | "/list" | "/reminders" => Some(Command::ListReminders),
            _ => None,
        }
    }

    /// Map a button custom id back to its command
    pub fn from_button_id(id: &str) -> Option<Command> {
        match id {
            ADD_REMINDER_BUTTON => Some(Command::AddReminder),
            LIST_REMINDERS_BUTTON => Some(Command::ListReminders),
            BACK_BUTTON => Some(Command::Back),
            DELETE_REMINDER_BUTTON => Some(Command::DeleteReminder),
            _ => None,
        }
    }

    /// Custom id of the button for this command, if it has one
    pub fn button_id(&self) -> Option<&'static str> {
        match self {
            Command::Start => None,
            Command::AddReminder => Some(ADD_REMINDER_BUTTON),
            Command::ListReminders => Some(LIST_REMINDERS_BUTTON),
            Command::Back => Some(BACK_BUTTON),
            Command::DeleteReminder => Some(DELETE_REMINDER_BUTTON),
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Command::Start => "Menu",
            Command::AddReminder => "Add reminder",
            Command::ListReminders => "View reminders",
            Command::Back => "Back",
            Command::DeleteReminder => "Delete reminder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_phrases() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("Add reminder"), Some(Command::AddReminder));
        assert_eq!(Command::parse("  ADD REMINDER "), Some(Command::AddReminder));
        assert_eq!(Command::parse("View reminders"), Some(Command::ListReminders));
        assert_eq!(Command::parse("/list"), Some(Command::ListReminders));
        assert_eq!(Command::parse("Buy milk"), None);
        assert_eq!(Command::parse("back"), None);
    }

    #[test]
    fn test_button_ids_round_trip() {
        for command in [
            Command::AddReminder,
            Command::ListReminders,
            Command::Back,
            Command::DeleteReminder,
        ] {
            let id = command.button_id().unwrap();
            assert_eq!(Command::from_button_id(id), Some(command));
        }
        assert_eq!(Command::Start.button_id(), None);
        assert_eq!(Command::from_button_id("speaker_council_1"), None);
    }

    #[test]
    fn test_labels_parse_as_commands() {
        assert_eq!(
            Command::parse(Command::AddReminder.label()),
            Some(Command::AddReminder)
        );
        assert_eq!(
            Command::parse(Command::ListReminders.label()),
            Some(Command::ListReminders)
        );
    }
}
