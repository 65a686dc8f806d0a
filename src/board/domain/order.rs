//! Ordered per-user, per-category task lists and their move arithmetic.
//!
//! A [`TaskOrder`] is the canonical display order of one board column. The
//! list is array-backed; every reposition is expressed as index arithmetic
//! over the backing vector so that the relative order of untouched elements
//! is preserved.

use super::{Category, InvalidMove, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// Ordered sequence of task identifiers for one (user, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOrder {
    user_id: UserId,
    category: Category,
    task_ids: Vec<TaskId>,
}

impl TaskOrder {
    /// Creates an empty list.
    #[must_use]
    pub const fn empty(user_id: UserId, category: Category) -> Self {
        Self {
            user_id,
            category,
            task_ids: Vec::new(),
        }
    }

    /// Reconstructs a list from persisted storage.
    ///
    /// The sequence is taken as-is; stores do not validate membership or
    /// uniqueness.
    #[must_use]
    pub const fn from_persisted(user_id: UserId, category: Category, task_ids: Vec<TaskId>) -> Self {
        Self {
            user_id,
            category,
            task_ids,
        }
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the column this list orders.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the ordered identifiers.
    #[must_use]
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    /// Returns the number of tasks in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.task_ids.len()
    }

    /// Returns `true` when the list holds no tasks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }

    /// Returns the position of a task, if present.
    #[must_use]
    pub fn position(&self, task_id: TaskId) -> Option<usize> {
        self.task_ids.iter().position(|id| *id == task_id)
    }

    /// Returns `true` when the task is present.
    #[must_use]
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.task_ids.contains(&task_id)
    }

    /// Appends a task at the end of the list.
    pub fn push(&mut self, task_id: TaskId) {
        self.task_ids.push(task_id);
    }

    /// Repositions a task inside this list.
    ///
    /// The task must currently sit at exactly `source_index`, and
    /// `destination_index` must address an existing slot
    /// (`0..=len - 1`). Elements between the two positions shift by one
    /// towards the vacated slot.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove`] without modifying the list when either index
    /// check fails.
    pub fn move_within(
        &mut self,
        task_id: TaskId,
        source_index: usize,
        destination_index: usize,
    ) -> Result<(), InvalidMove> {
        self.ensure_at(task_id, source_index)?;
        // Non-empty: the task was found above.
        let max = self.task_ids.len().saturating_sub(1);
        if destination_index > max {
            return Err(InvalidMove::DestinationOutOfBounds {
                category: self.category,
                destination_index,
                max,
            });
        }

        if source_index < destination_index {
            if let Some(window) = self.task_ids.get_mut(source_index..=destination_index) {
                window.rotate_left(1);
            }
        } else if let Some(window) = self.task_ids.get_mut(destination_index..=source_index) {
            window.rotate_right(1);
        }
        Ok(())
    }

    /// Removes a task that the caller observed at `source_index`.
    ///
    /// After the index check the task is removed by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove::SourceMismatch`] without modifying the list
    /// when the task is not at `source_index`.
    pub fn take(&mut self, task_id: TaskId, source_index: usize) -> Result<(), InvalidMove> {
        self.ensure_at(task_id, source_index)?;
        self.task_ids.retain(|id| *id != task_id);
        Ok(())
    }

    /// Inserts a task at `destination_index`, shifting later tasks down.
    ///
    /// `destination_index` may equal the list length, which appends.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMove::DestinationOutOfBounds`] without modifying the
    /// list when `destination_index` exceeds the length.
    pub fn insert_at(&mut self, task_id: TaskId, destination_index: usize) -> Result<(), InvalidMove> {
        let max = self.task_ids.len();
        if destination_index > max {
            return Err(InvalidMove::DestinationOutOfBounds {
                category: self.category,
                destination_index,
                max,
            });
        }
        self.task_ids.insert(destination_index, task_id);
        Ok(())
    }

    fn ensure_at(&self, task_id: TaskId, source_index: usize) -> Result<(), InvalidMove> {
        let actual = self.position(task_id);
        if actual == Some(source_index) {
            return Ok(());
        }
        Err(InvalidMove::SourceMismatch {
            task_id,
            category: self.category,
            source_index,
            actual,
        })
    }
}
