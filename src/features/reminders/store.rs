//! # Reminder Store
//!
//! Per-user ordered reminder lists. Every mutation for one user runs under that
//! user's DashMap entry guard, so add/delete/fire never interleave for the same
//! list. Different users only contend when they share a shard.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Stable reminder ids, cancel handles stored with each entry
//! - 1.0.0: Initial in-memory store

use chrono::{DateTime, Local};
use dashmap::DashMap;
use log::{debug, info};
use std::sync::Arc;

use super::error::{ReminderError, Result};
use super::model::{DraftHandle, Reminder, ReminderId, ReminderStatus, UserId};
use super::scheduler::CancelHandle;

/// A reminder plus the handle of its delivery task, if one is registered
#[derive(Debug)]
struct Entry {
    reminder: Reminder,
    cancel: Option<CancelHandle>,
}

/// In-memory reminder storage keyed by user
#[derive(Clone)]
pub struct ReminderStore {
    users: Arc<DashMap<UserId, Vec<Entry>>>,
    max_per_user: usize,
}

impl ReminderStore {
    /// Create an empty store allowing at most `max_per_user` reminders per user
    pub fn new(max_per_user: usize) -> Self {
        ReminderStore {
            users: Arc::new(DashMap::new()),
            max_per_user,
        }
    }

    /// Per-user reminder bound
    pub fn max_per_user(&self) -> usize {
        self.max_per_user
    }

    /// Append a draft reminder with no fire time
    pub fn add(&self, user_id: UserId, text: &str) -> Result<DraftHandle> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReminderError::InvalidInput);
        }

        let mut entries = self.users.entry(user_id).or_default();
        if entries.len() >= self.max_per_user {
            return Err(ReminderError::TooManyReminders {
                limit: self.max_per_user,
            });
        }

        let reminder = Reminder::draft(user_id, text);
        let draft = DraftHandle {
            user_id,
            reminder_id: reminder.id,
        };
        debug!("Added draft reminder {} for user {}", reminder.id, user_id);
        entries.push(Entry {
            reminder,
            cancel: None,
        });

        Ok(draft)
    }

    /// Set the fire time of a draft and mark it scheduled
    ///
    /// A fire time that is not in the future removes the draft.
    pub fn resolve_time(&self, draft: &DraftHandle, fire_time: DateTime<Local>) -> Result<Reminder> {
        self.resolve_time_at(draft, fire_time, Local::now())
    }

    fn resolve_time_at(
        &self,
        draft: &DraftHandle,
        fire_time: DateTime<Local>,
        now: DateTime<Local>,
    ) -> Result<Reminder> {
        let mut entries = self
            .users
            .get_mut(&draft.user_id)
            .ok_or(ReminderError::DraftNotFound)?;
        let pos = entries
            .iter()
            .position(|e| e.reminder.id == draft.reminder_id && e.reminder.is_draft())
            .ok_or(ReminderError::DraftNotFound)?;

        if fire_time <= now {
            let dropped = entries.remove(pos);
            info!(
                "Dropped reminder {} for user {}: fire time already passed",
                dropped.reminder.id, draft.user_id
            );
            return Err(ReminderError::TimeAlreadyPassed { fire_time });
        }

        let reminder = &mut entries[pos].reminder;
        reminder.fire_time = Some(fire_time);
        reminder.status = ReminderStatus::Scheduled;
        Ok(reminder.clone())
    }

    /// Store the cancel handle of a reminder's delivery task
    ///
    /// Returns false when the reminder no longer exists or was never
    /// resolved; the caller still owns the handle then and must cancel it.
    /// A reminder that already fired accepts the handle and drops it, since
    /// its task has finished and there is nothing left to cancel.
    pub fn attach_schedule(&self, user_id: UserId, id: ReminderId, handle: CancelHandle) -> bool {
        let Some(mut entries) = self.users.get_mut(&user_id) else {
            return false;
        };
        let Some(entry) = entries.iter_mut().find(|e| e.reminder.id == id) else {
            return false;
        };
        match entry.reminder.status {
            ReminderStatus::Scheduled => {
                entry.cancel = Some(handle);
                true
            }
            ReminderStatus::Fired => {
                debug!("Reminder {id} fired before its handle was attached");
                true
            }
            ReminderStatus::Pending | ReminderStatus::Cancelled => false,
        }
    }

    /// All reminders of a user in insertion order
    pub fn list(&self, user_id: UserId) -> Vec<Reminder> {
        self.users
            .get(&user_id)
            .map(|entries| entries.iter().map(|e| e.reminder.clone()).collect())
            .unwrap_or_default()
    }

    /// Number of reminders a user has
    pub fn count(&self, user_id: UserId) -> usize {
        self.users.get(&user_id).map(|e| e.len()).unwrap_or(0)
    }

    /// Remove the reminder at a 1-based position and cancel its delivery
    ///
    /// The position is resolved and the task cancelled under the same guard
    /// that performs the removal, so a deleted reminder can never fire.
    pub fn delete_at(&self, user_id: UserId, index: i64) -> Result<Reminder> {
        let removed = {
            let Some(mut entries) = self.users.get_mut(&user_id) else {
                return Err(ReminderError::IndexOutOfRange { index, count: 0 });
            };
            let count = entries.len();
            let pos = match usize::try_from(index) {
                Ok(i) if i >= 1 && i <= count => i - 1,
                _ => return Err(ReminderError::IndexOutOfRange { index, count }),
            };

            let Entry {
                mut reminder,
                cancel,
            } = entries.remove(pos);

            if reminder.status != ReminderStatus::Fired {
                if let Some(handle) = cancel {
                    handle.cancel();
                }
                reminder.status = ReminderStatus::Cancelled;
            }
            reminder
        };
        self.users.remove_if(&user_id, |_, entries| entries.is_empty());

        info!(
            "Deleted reminder {} (#{}) for user {}",
            removed.id, index, user_id
        );
        Ok(removed)
    }

    /// Mark a reminder fired if it is still waiting for delivery
    ///
    /// Returns the reminder only when this call made the transition, which is
    /// what entitles the caller to notify.
    pub fn mark_fired(&self, user_id: UserId, id: ReminderId) -> Option<Reminder> {
        let mut entries = self.users.get_mut(&user_id)?;
        let entry = entries.iter_mut().find(|e| e.reminder.id == id)?;
        if !entry.reminder.is_due_for_delivery() {
            return None;
        }
        entry.reminder.status = ReminderStatus::Fired;
        entry.cancel = None;
        Some(entry.reminder.clone())
    }

    /// Remove a draft that never got a fire time
    ///
    /// Resolved reminders are left alone. Returns whether anything was removed.
    pub fn discard_unresolved(&self, draft: &DraftHandle) -> bool {
        self.remove_where(draft, |reminder| reminder.is_draft())
    }

    /// Remove a reminder that could not be scheduled
    pub fn discard(&self, draft: &DraftHandle) -> bool {
        self.remove_where(draft, |reminder| reminder.status != ReminderStatus::Fired)
    }

    fn remove_where(&self, draft: &DraftHandle, pred: impl Fn(&Reminder) -> bool) -> bool {
        let removed = {
            let Some(mut entries) = self.users.get_mut(&draft.user_id) else {
                return false;
            };
            match entries
                .iter()
                .position(|e| e.reminder.id == draft.reminder_id && pred(&e.reminder))
            {
                Some(pos) => {
                    if let Some(handle) = entries.remove(pos).cancel {
                        handle.cancel();
                    }
                    true
                }
                None => false,
            }
        };
        if removed {
            self.users.remove_if(&draft.user_id, |_, entries| entries.is_empty());
            debug!(
                "Discarded reminder {} for user {}",
                draft.reminder_id, draft.user_id
            );
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const USER: UserId = UserId(42);

    fn in_minutes(minutes: i64) -> DateTime<Local> {
        Local::now() + Duration::minutes(minutes)
    }

    fn scheduled(store: &ReminderStore, user: UserId, text: &str) -> Reminder {
        let draft = store.add(user, text).unwrap();
        store.resolve_time(&draft, in_minutes(5)).unwrap()
    }

    fn texts(store: &ReminderStore, user: UserId) -> Vec<String> {
        store.list(user).into_iter().map(|r| r.text).collect()
    }

    #[test]
    fn test_add_resolve_list() {
        let store = ReminderStore::new(10);
        let fire_time = in_minutes(5);

        let draft = store.add(USER, "  Buy milk ").unwrap();
        let reminder = store.resolve_time(&draft, fire_time).unwrap();

        let listed = store.list(USER);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], reminder);
        assert_eq!(listed[0].text, "Buy milk");
        assert_eq!(listed[0].fire_time, Some(fire_time));
        assert_eq!(listed[0].status, ReminderStatus::Scheduled);
    }

    #[test]
    fn test_draft_is_listed() {
        let store = ReminderStore::new(10);
        store.add(USER, "Call mom").unwrap();

        let listed = store.list(USER);
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_draft());
    }

    #[test]
    fn test_empty_text_rejected() {
        let store = ReminderStore::new(10);
        assert_eq!(store.add(USER, "   "), Err(ReminderError::InvalidInput));
        assert_eq!(store.add(USER, ""), Err(ReminderError::InvalidInput));
        assert_eq!(store.count(USER), 0);
    }

    #[test]
    fn test_past_time_leaves_nothing_behind() {
        let store = ReminderStore::new(10);
        scheduled(&store, USER, "Keep me");
        let before = store.count(USER);

        let draft = store.add(USER, "Too late").unwrap();
        let past = in_minutes(-1);
        assert_eq!(
            store.resolve_time(&draft, past),
            Err(ReminderError::TimeAlreadyPassed { fire_time: past })
        );
        assert_eq!(store.count(USER), before);
        assert_eq!(texts(&store, USER), vec!["Keep me"]);
    }

    #[test]
    fn test_fire_time_equal_to_now_rejected() {
        let store = ReminderStore::new(10);
        let now = Local::now();
        let draft = store.add(USER, "Now").unwrap();
        assert!(matches!(
            store.resolve_time_at(&draft, now, now),
            Err(ReminderError::TimeAlreadyPassed { .. })
        ));
        assert_eq!(store.count(USER), 0);
    }

    #[test]
    fn test_resolve_twice_fails() {
        let store = ReminderStore::new(10);
        let draft = store.add(USER, "Once").unwrap();
        store.resolve_time(&draft, in_minutes(5)).unwrap();
        assert_eq!(
            store.resolve_time(&draft, in_minutes(10)),
            Err(ReminderError::DraftNotFound)
        );
    }

    #[test]
    fn test_delete_middle_keeps_order() {
        let store = ReminderStore::new(10);
        for text in ["A", "B", "C"] {
            scheduled(&store, USER, text);
        }

        let removed = store.delete_at(USER, 2).unwrap();
        assert_eq!(removed.text, "B");
        assert_eq!(removed.status, ReminderStatus::Cancelled);
        assert_eq!(texts(&store, USER), vec!["A", "C"]);
    }

    #[test]
    fn test_delete_every_position() {
        for k in 1..=4 {
            let store = ReminderStore::new(10);
            let names = ["w", "x", "y", "z"];
            for text in names {
                scheduled(&store, USER, text);
            }

            store.delete_at(USER, k).unwrap();

            let mut expected: Vec<&str> = names.to_vec();
            expected.remove((k - 1) as usize);
            assert_eq!(texts(&store, USER), expected);
        }
    }

    #[test]
    fn test_delete_out_of_range_leaves_list() {
        let store = ReminderStore::new(10);
        scheduled(&store, USER, "A");
        scheduled(&store, USER, "B");

        for index in [0, -1, 3, i64::MAX] {
            assert_eq!(
                store.delete_at(USER, index),
                Err(ReminderError::IndexOutOfRange { index, count: 2 })
            );
        }
        assert_eq!(texts(&store, USER), vec!["A", "B"]);
    }

    #[test]
    fn test_delete_for_unknown_user() {
        let store = ReminderStore::new(10);
        assert_eq!(
            store.delete_at(UserId(1), 1),
            Err(ReminderError::IndexOutOfRange { index: 1, count: 0 })
        );
    }

    #[test]
    fn test_users_are_isolated() {
        let store = ReminderStore::new(10);
        scheduled(&store, UserId(1), "mine");
        scheduled(&store, UserId(2), "yours");

        store.delete_at(UserId(1), 1).unwrap();
        assert!(store.list(UserId(1)).is_empty());
        assert_eq!(texts(&store, UserId(2)), vec!["yours"]);
    }

    #[test]
    fn test_limit_per_user() {
        let store = ReminderStore::new(2);
        store.add(USER, "one").unwrap();
        store.add(USER, "two").unwrap();
        assert_eq!(
            store.add(USER, "three"),
            Err(ReminderError::TooManyReminders { limit: 2 })
        );
        assert!(store.add(UserId(99), "other user").is_ok());
    }

    #[test]
    fn test_mark_fired_once() {
        let store = ReminderStore::new(10);
        let reminder = scheduled(&store, USER, "ping");

        let fired = store.mark_fired(USER, reminder.id).unwrap();
        assert_eq!(fired.status, ReminderStatus::Fired);
        assert!(store.mark_fired(USER, reminder.id).is_none());
        assert_eq!(store.list(USER)[0].status, ReminderStatus::Fired);
    }

    #[test]
    fn test_mark_fired_after_delete() {
        let store = ReminderStore::new(10);
        let reminder = scheduled(&store, USER, "ghost");
        store.delete_at(USER, 1).unwrap();
        assert!(store.mark_fired(USER, reminder.id).is_none());
    }

    #[test]
    fn test_mark_fired_ignores_drafts() {
        let store = ReminderStore::new(10);
        let draft = store.add(USER, "draft").unwrap();
        assert!(store.mark_fired(USER, draft.reminder_id).is_none());
    }

    #[test]
    fn test_delete_fired_keeps_status() {
        let store = ReminderStore::new(10);
        let reminder = scheduled(&store, USER, "done");
        store.mark_fired(USER, reminder.id).unwrap();

        let removed = store.delete_at(USER, 1).unwrap();
        assert_eq!(removed.status, ReminderStatus::Fired);
    }

    #[test]
    fn test_discard_unresolved_only_touches_drafts() {
        let store = ReminderStore::new(10);
        let resolved = store.add(USER, "resolved").unwrap();
        store.resolve_time(&resolved, in_minutes(5)).unwrap();
        let draft = store.add(USER, "draft").unwrap();

        assert!(!store.discard_unresolved(&resolved));
        assert!(store.discard_unresolved(&draft));
        assert_eq!(texts(&store, USER), vec!["resolved"]);

        assert!(store.discard(&resolved));
        assert_eq!(store.count(USER), 0);
    }

    #[test]
    fn test_ids_unique_within_user() {
        let store = ReminderStore::new(50);
        for i in 0..20 {
            store.add(USER, &format!("r{i}")).unwrap();
        }
        let mut ids: Vec<_> = store.list(USER).into_iter().map(|r| r.id).collect();
        let total = ids.len();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
