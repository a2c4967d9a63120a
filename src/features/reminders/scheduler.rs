//! # Reminder Scheduler
//!
//! One tokio task per scheduled reminder. Each task sleeps until the fire time,
//! asks the store to mark the reminder fired, and only then notifies the user.
//! Tasks are registered with a [`CancelHandle`] that the store keeps next to the
//! reminder, so deleting a reminder stops its task.
//!
//! - **Version**: 2.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.1.0: Pending slots reserved atomically, plain "Reminder:" text
//! - 2.0.0: Cancellable tasks, global pending bound, delivery failures isolated
//! - 1.0.0: Fire-and-forget delayed delivery

use chrono::{DateTime, Local};
use dashmap::DashMap;
use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, OwnedSemaphorePermit, Semaphore};
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};

use super::error::{ReminderError, Result};
use super::model::{Reminder, ReminderId, UserId};
use super::store::ReminderStore;
use crate::transport::NotificationSink;

/// Registry of live delivery tasks
type TaskRegistry = Arc<DashMap<ReminderId, RegisteredTask>>;

/// Registry entry; holding the permit keeps one pending slot taken
struct RegisteredTask {
    task: ScheduledTask,
    _slot: OwnedSemaphorePermit,
}

/// A registered delivery task
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub reminder_id: ReminderId,
    pub user_id: UserId,
    pub fire_time: DateTime<Local>,
    pub cancel_handle: CancelHandle,
}

/// Why a reminder was not scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fire time is missing or not in the future
    PastDue,
}

/// Outcome of [`ReminderScheduler::schedule`]
#[derive(Debug)]
pub enum ScheduleResult {
    Scheduled(CancelHandle),
    Rejected(Rejection),
}

/// Cancels one delivery task
///
/// Cancelling is idempotent: a fired or already cancelled task is left alone.
#[derive(Clone)]
pub struct CancelHandle {
    reminder_id: ReminderId,
    abort: AbortHandle,
    tasks: TaskRegistry,
}

impl CancelHandle {
    pub fn reminder_id(&self) -> ReminderId {
        self.reminder_id
    }

    /// Stop the task and drop it from the registry
    pub fn cancel(&self) {
        if self.tasks.remove(&self.reminder_id).is_some() {
            debug!("Cancelled delivery task for reminder {}", self.reminder_id);
        }
        self.abort.abort();
    }

    /// Whether the task is still waiting to fire
    pub fn is_active(&self) -> bool {
        self.tasks.contains_key(&self.reminder_id)
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("reminder_id", &self.reminder_id)
            .finish()
    }
}

/// Schedules deferred reminder notifications
#[derive(Clone)]
pub struct ReminderScheduler {
    store: ReminderStore,
    sink: Arc<dyn NotificationSink>,
    tasks: TaskRegistry,
    slots: Arc<Semaphore>,
    max_pending: usize,
}

impl ReminderScheduler {
    /// Create a scheduler delivering through `sink`, with at most
    /// `max_pending` tasks alive at once
    pub fn new(store: ReminderStore, sink: Arc<dyn NotificationSink>, max_pending: usize) -> Self {
        ReminderScheduler {
            store,
            sink,
            tasks: Arc::new(DashMap::new()),
            slots: Arc::new(Semaphore::new(max_pending.min(Semaphore::MAX_PERMITS))),
            max_pending,
        }
    }

    /// Register a delivery task for a reminder with a resolved fire time
    ///
    /// Must be called from within a tokio runtime; outside one the result is
    /// [`ReminderError::SchedulingFailure`].
    pub fn schedule(&self, reminder: &Reminder) -> Result<ScheduleResult> {
        let Some(fire_time) = reminder.fire_time else {
            return Ok(ScheduleResult::Rejected(Rejection::PastDue));
        };
        let delay = match (fire_time - Local::now()).to_std() {
            Ok(delay) if !delay.is_zero() => delay,
            _ => return Ok(ScheduleResult::Rejected(Rejection::PastDue)),
        };

        // Released when the registry entry goes away (fired or cancelled)
        let slot = Arc::clone(&self.slots).try_acquire_owned().map_err(|_| {
            ReminderError::SchedulingFailure {
                reason: format!("{} reminders already pending", self.max_pending),
            }
        })?;
        let runtime = Handle::try_current().map_err(|e| ReminderError::SchedulingFailure {
            reason: e.to_string(),
        })?;

        let deadline = Instant::now() + delay;
        let (armed_tx, armed_rx) = oneshot::channel::<()>();
        let user_id = reminder.user_id;
        let reminder_id = reminder.id;
        let store = self.store.clone();
        let sink = Arc::clone(&self.sink);
        let tasks = Arc::clone(&self.tasks);

        let join = runtime.spawn(async move {
            // Wait until the task is registered so firing can deregister it
            if armed_rx.await.is_err() {
                return;
            }
            sleep_until(deadline).await;
            if tasks.remove(&reminder_id).is_none() {
                return;
            }
            deliver(&store, sink.as_ref(), user_id, reminder_id).await;
        });

        let handle = CancelHandle {
            reminder_id,
            abort: join.abort_handle(),
            tasks: Arc::clone(&self.tasks),
        };
        self.tasks.insert(
            reminder_id,
            RegisteredTask {
                task: ScheduledTask {
                    reminder_id,
                    user_id,
                    fire_time,
                    cancel_handle: handle.clone(),
                },
                _slot: slot,
            },
        );
        let _ = armed_tx.send(());

        info!(
            "Scheduled reminder {} for user {} in {}s",
            reminder_id,
            user_id,
            delay.as_secs()
        );
        Ok(ScheduleResult::Scheduled(handle))
    }

    /// Cancel a scheduled task; a no-op if it already fired or was cancelled
    pub fn cancel(&self, handle: &CancelHandle) {
        handle.cancel();
    }

    /// Number of tasks waiting to fire
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Snapshot of the registered task for a reminder
    pub fn task(&self, reminder_id: ReminderId) -> Option<ScheduledTask> {
        self.tasks.get(&reminder_id).map(|t| t.task.clone())
    }
}

/// Notification text for a fired reminder
pub fn notification_text(reminder: &Reminder) -> String {
    format!("Reminder: {}", reminder.text)
}

async fn deliver(
    store: &ReminderStore,
    sink: &dyn NotificationSink,
    user_id: UserId,
    reminder_id: ReminderId,
) {
    // Deleted before the lock was reached: nothing to say
    let Some(reminder) = store.mark_fired(user_id, reminder_id) else {
        debug!("Reminder {reminder_id} for user {user_id} is gone, skipping delivery");
        return;
    };

    match sink.send(user_id, &notification_text(&reminder)).await {
        Ok(()) => info!("Delivered reminder {reminder_id} to user {user_id}"),
        Err(e) => {
            let err = ReminderError::NotificationDeliveryFailure {
                reason: e.to_string(),
            };
            warn!("Reminder {reminder_id} for user {user_id}: {err}");
        }
    }
}
