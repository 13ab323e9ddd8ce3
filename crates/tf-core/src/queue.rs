//! Queue mutations and the re-anchoring rule.
//!
//! The timeline is anchored on the head task's `created_at`. Whenever a
//! different task becomes the head, its anchor is reset to the mutation time
//! so it does not inherit the time it joined the queue. Mutations that keep
//! the same head never touch its anchor.

use chrono::{DateTime, Local, Utc};
use thiserror::Error;

use crate::history::HistoryItem;
use crate::task::Task;
use crate::timeline::{TimelineTask, compute_timeline};
use crate::types::{Minutes, TaskId};

/// Errors from queue mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// No queued task has this ID.
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// A reorder that is not a permutation of the current queue.
    #[error("reorder must list every queued task exactly once")]
    InvalidOrder,
}

/// Minutes added or removed by a single duration step.
///
/// Long sessions move in half hours, short ones in five minutes.
pub const fn duration_step(current: Minutes) -> u32 {
    if current.get() >= 60 { 30 } else { 5 }
}

/// The ordered queue of pending sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    /// Wraps an already-ordered list of tasks.
    pub const fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The active task.
    pub fn head(&self) -> Option<&Task> {
        self.tasks.first()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Computes the current timeline.
    pub fn timeline(&self) -> Vec<TimelineTask> {
        compute_timeline(&self.tasks)
    }

    /// Appends a task. A task entering an empty queue starts at `now`.
    pub fn push(&mut self, mut task: Task, now: DateTime<Utc>) {
        if self.tasks.is_empty() {
            task.created_at = now;
            tracing::debug!(head = %task.id, "queue head anchored");
        }
        self.tasks.push(task);
    }

    /// Replaces the order with `order`, which must be a permutation of the
    /// current IDs.
    pub fn reorder(&mut self, order: &[TaskId], now: DateTime<Utc>) -> Result<(), QueueError> {
        if order.len() != self.tasks.len() {
            return Err(QueueError::InvalidOrder);
        }

        let mut reordered: Vec<Task> = Vec::with_capacity(order.len());
        for id in order {
            let task = self.get(id).ok_or(QueueError::InvalidOrder)?;
            if reordered.iter().any(|t| &t.id == id) {
                return Err(QueueError::InvalidOrder);
            }
            reordered.push(task.clone());
        }

        let previous_head = self.head().map(|t| t.id.clone());
        self.tasks = reordered;
        self.reanchor_if_head_changed(previous_head.as_ref(), now);
        Ok(())
    }

    /// Moves one task to `to_index` (clamped to the queue end).
    pub fn move_task(
        &mut self,
        id: &TaskId,
        to_index: usize,
        now: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let from = self.position(id)?;
        let previous_head = self.head().map(|t| t.id.clone());

        let task = self.tasks.remove(from);
        let to_index = to_index.min(self.tasks.len());
        self.tasks.insert(to_index, task);

        self.reanchor_if_head_changed(previous_head.as_ref(), now);
        Ok(())
    }

    /// Deletes a task without archiving it.
    pub fn remove(&mut self, id: &TaskId, now: DateTime<Utc>) -> Result<Task, QueueError> {
        let pos = self.position(id)?;
        let removed = self.tasks.remove(pos);
        if pos == 0 {
            self.reanchor_head(now);
        }
        Ok(removed)
    }

    /// Removes a finished task and turns it into a history record.
    ///
    /// The record's date and times are expressed in the local timezone.
    pub fn complete(
        &mut self,
        id: &TaskId,
        note: &str,
        now: DateTime<Utc>,
    ) -> Result<HistoryItem, QueueError> {
        self.complete_in(id, note, &now.with_timezone(&Local))
    }

    /// [`TaskQueue::complete`] with an explicit timezone for the record.
    pub fn complete_in<Tz: chrono::TimeZone>(
        &mut self,
        id: &TaskId,
        note: &str,
        now: &DateTime<Tz>,
    ) -> Result<HistoryItem, QueueError> {
        let pos = self.position(id)?;
        let task = self.tasks.remove(pos);
        if pos == 0 {
            self.reanchor_head(now.with_timezone(&Utc));
        }
        Ok(HistoryItem::archive(task, note, now))
    }

    /// Sets a task's planned length, floored at one minute.
    pub fn set_duration(&mut self, id: &TaskId, minutes: i64) -> Result<Minutes, QueueError> {
        let pos = self.position(id)?;
        let duration = Minutes::clamped(minutes);
        self.tasks[pos].duration = duration;
        Ok(duration)
    }

    /// Adds `delta` minutes (negative to shorten), floored at one minute.
    pub fn adjust_duration(&mut self, id: &TaskId, delta: i64) -> Result<Minutes, QueueError> {
        let pos = self.position(id)?;
        let current = i64::from(self.tasks[pos].duration.get());
        self.set_duration(id, current.saturating_add(delta))
    }

    fn position(&self, id: &TaskId) -> Result<usize, QueueError> {
        self.tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| QueueError::TaskNotFound {
                id: id.to_string(),
            })
    }

    fn reanchor_if_head_changed(&mut self, previous_head: Option<&TaskId>, now: DateTime<Utc>) {
        if self.head().map(|t| &t.id) != previous_head {
            self.reanchor_head(now);
        }
    }

    fn reanchor_head(&mut self, now: DateTime<Utc>) {
        if let Some(head) = self.tasks.first_mut() {
            head.created_at = now;
            tracing::debug!(head = %head.id, "queue head re-anchored");
        }
    }
}
