//! Task records and their validated content.

use super::{BoardDomainError, Category, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-text task body, non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskContent(String);

impl TaskContent {
    /// Creates validated task content.
    ///
    /// Surrounding whitespace is preserved; only blank content is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTaskContent`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, BoardDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(BoardDomainError::EmptyTaskContent);
        }
        Ok(Self(raw))
    }

    /// Returns the content as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskContent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A task owned by one user and placed in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    user_id: UserId,
    category: Category,
    content: TaskContent,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning user.
    pub user_id: UserId,
    /// Persisted category.
    pub category: Category,
    /// Persisted content.
    pub content: TaskContent,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in [`Category::DEFAULT`].
    #[must_use]
    pub fn new(user_id: UserId, content: TaskContent, clock: &impl Clock) -> Self {
        Self {
            id: TaskId::new(),
            user_id,
            category: Category::DEFAULT,
            content,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            category: data.category,
            content: data.content,
            created_at: data.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the current category.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns the task content.
    #[must_use]
    pub const fn content(&self) -> &TaskContent {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Records that the task now lives in another column.
    ///
    /// Only stores call this, inside the unit of work that also moves the
    /// identifier between ordered lists.
    pub const fn set_category(&mut self, category: Category) {
        self.category = category;
    }
}
