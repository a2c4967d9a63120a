//! # Conversation State Machine
//!
//! Tracks, per user, which input the bot expects next and turns each input
//! into an [`Action`] for the dispatcher to render. The whole transition for a
//! user runs under that user's state entry guard, so two inputs from the same
//! user are handled one after the other.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Bad time input keeps the draft and re-prompts
//! - 1.0.0: Initial add/list/delete flow

use chrono::{DateTime, Local};
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

use super::command::Command;
use super::error::{ReminderError, Result};
use super::model::{DraftHandle, Reminder, UserId};
use super::scheduler::{ReminderScheduler, ScheduleResult};
use super::store::ReminderStore;
use super::time::parse_fire_time;

/// What the bot expects from a user next
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingReminderText,
    AwaitingReminderTime {
        draft: DraftHandle,
    },
    AwaitingDeletionIndex,
}

/// Result of handling one input
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShowMenu,
    PromptReminderText { rejected: Option<ReminderError> },
    PromptReminderTime { rejected: Option<ReminderError> },
    PromptDeletionIndex,
    ShowReminders(Vec<Reminder>),
    ReminderAdded(Reminder),
    /// The draft was dropped and the user is back at the menu
    ReminderRejected(ReminderError),
    ReminderDeleted(Result<Reminder>),
    Unrecognized,
}

/// Per-user conversation routing
#[derive(Clone)]
pub struct ConversationStateMachine {
    states: Arc<DashMap<UserId, ConversationState>>,
    store: ReminderStore,
    scheduler: ReminderScheduler,
}

impl ConversationStateMachine {
    pub fn new(store: ReminderStore, scheduler: ReminderScheduler) -> Self {
        ConversationStateMachine {
            states: Arc::new(DashMap::new()),
            store,
            scheduler,
        }
    }

    /// Current state of a user; no entry means idle
    pub fn state(&self, user_id: UserId) -> ConversationState {
        self.states
            .get(&user_id)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// Handle typed text
    ///
    /// Command phrases win in every state; anything else is interpreted
    /// according to the current state.
    pub fn handle_input(&self, user_id: UserId, text: &str) -> Action {
        if let Some(command) = Command::parse(text) {
            return self.handle_command(user_id, command);
        }

        self.transition(user_id, |state| match state {
            ConversationState::Idle => (Action::Unrecognized, ConversationState::Idle),
            ConversationState::AwaitingReminderText => self.on_reminder_text(user_id, text),
            ConversationState::AwaitingReminderTime { draft } => self.on_reminder_time(*draft, text),
            ConversationState::AwaitingDeletionIndex => self.on_deletion_index(user_id, text),
        })
    }

    /// Handle a menu command or button press
    pub fn handle_command(&self, user_id: UserId, command: Command) -> Action {
        self.transition(user_id, |state| match command {
            Command::Start | Command::Back => {
                self.abandon_draft(state);
                (Action::ShowMenu, ConversationState::Idle)
            }
            Command::AddReminder => {
                // A second "add" overwrites the draft in progress
                self.abandon_draft(state);
                (
                    Action::PromptReminderText { rejected: None },
                    ConversationState::AwaitingReminderText,
                )
            }
            Command::ListReminders => (
                Action::ShowReminders(self.store.list(user_id)),
                state.clone(),
            ),
            Command::DeleteReminder => {
                self.abandon_draft(state);
                (
                    Action::PromptDeletionIndex,
                    ConversationState::AwaitingDeletionIndex,
                )
            }
        })
    }

    /// Run one transition under the user's state guard
    fn transition(
        &self,
        user_id: UserId,
        step: impl FnOnce(&ConversationState) -> (Action, ConversationState),
    ) -> Action {
        let action = {
            let mut state = self.states.entry(user_id).or_default();
            let (action, next) = step(&*state);
            if *state != next {
                debug!("User {user_id}: {:?} -> {:?}", *state, next);
            }
            *state = next;
            action
        };
        self.states
            .remove_if(&user_id, |_, state| *state == ConversationState::Idle);
        action
    }

    fn abandon_draft(&self, state: &ConversationState) {
        if let ConversationState::AwaitingReminderTime { draft } = state {
            if self.store.discard_unresolved(draft) {
                debug!(
                    "User {}: abandoned draft reminder {}",
                    draft.user_id, draft.reminder_id
                );
            }
        }
    }

    fn on_reminder_text(&self, user_id: UserId, text: &str) -> (Action, ConversationState) {
        match self.store.add(user_id, text) {
            Ok(draft) => (
                Action::PromptReminderTime { rejected: None },
                ConversationState::AwaitingReminderTime { draft },
            ),
            Err(e @ ReminderError::InvalidInput) => (
                Action::PromptReminderText { rejected: Some(e) },
                ConversationState::AwaitingReminderText,
            ),
            Err(e) => (Action::ReminderRejected(e), ConversationState::Idle),
        }
    }

    fn on_reminder_time(&self, draft: DraftHandle, text: &str) -> (Action, ConversationState) {
        let fire_time = match parse_fire_time(text) {
            Ok(fire_time) => fire_time,
            Err(e) => {
                return (
                    Action::PromptReminderTime { rejected: Some(e) },
                    ConversationState::AwaitingReminderTime { draft },
                )
            }
        };

        match self.schedule_draft(&draft, fire_time) {
            Ok(reminder) => (Action::ReminderAdded(reminder), ConversationState::Idle),
            Err(e) => (Action::ReminderRejected(e), ConversationState::Idle),
        }
    }

    fn schedule_draft(
        &self,
        draft: &DraftHandle,
        fire_time: DateTime<Local>,
    ) -> Result<Reminder> {
        let reminder = self.store.resolve_time(draft, fire_time)?;

        match self.scheduler.schedule(&reminder) {
            Ok(ScheduleResult::Scheduled(handle)) => {
                if !self
                    .store
                    .attach_schedule(draft.user_id, reminder.id, handle.clone())
                {
                    self.scheduler.cancel(&handle);
                    return Err(ReminderError::DraftNotFound);
                }
                Ok(reminder)
            }
            Ok(ScheduleResult::Rejected(_)) => {
                self.store.discard(draft);
                Err(ReminderError::TimeAlreadyPassed { fire_time })
            }
            Err(e) => {
                self.store.discard(draft);
                Err(e)
            }
        }
    }

    fn on_deletion_index(&self, user_id: UserId, text: &str) -> (Action, ConversationState) {
        let input = text.trim();
        let result = input
            .parse::<i64>()
            .map_err(|_| ReminderError::InvalidIndex {
                input: input.to_string(),
            })
            .and_then(|index| self.store.delete_at(user_id, index));
        (Action::ReminderDeleted(result), ConversationState::Idle)
    }
}
