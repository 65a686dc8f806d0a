//! Store ports for users, tasks, and ordered category lists.
//!
//! Store methods are synchronous and always run inside a unit opened by
//! [`BoardStore::atomically`] or [`BoardStore::snapshot`]. Adapters decide
//! how a unit is isolated (a database transaction with row locks, or a
//! serialized in-memory copy); callers only rely on all-or-nothing
//! visibility for writes and one consistent view for reads.

use crate::board::domain::{Category, Email, Task, TaskId, TaskOrder, User, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type BoardStoreResult<T> = Result<T, BoardStoreError>;

/// Reads available in both snapshots and atomic units.
pub trait BoardReader {
    /// Finds a user by email address.
    ///
    /// Returns `None` when no user has the address.
    fn find_user_by_email(&mut self, email: &Email) -> BoardStoreResult<Option<User>>;

    /// Returns every task owned by the user, keyed by identifier.
    fn tasks_by_user(&mut self, user_id: UserId) -> BoardStoreResult<HashMap<TaskId, Task>>;

    /// Finds one task owned by the user.
    fn find_task(&mut self, user_id: UserId, task_id: TaskId) -> BoardStoreResult<Option<Task>>;

    /// Returns the list for (user, category), empty when no row exists.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::UserNotFound`] when the user does not exist.
    fn order(&mut self, user_id: UserId, category: Category) -> BoardStoreResult<TaskOrder>;
}

/// User persistence contract.
pub trait UserStore {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::DuplicateEmail`] when the email address is
    /// already registered.
    fn insert_user(&mut self, user: &User) -> BoardStoreResult<()>;
}

/// Task record persistence contract.
pub trait TaskStore {
    /// Stores a newly created task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::UserNotFound`] when the owning user does
    /// not exist.
    fn create_task(&mut self, task: &Task) -> BoardStoreResult<()>;

    /// Updates the category field of a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::TaskNotFound`] when the task does not exist.
    fn set_task_category(&mut self, task_id: TaskId, category: Category) -> BoardStoreResult<()>;
}

/// Ordered category list persistence contract.
pub trait OrderStore {
    /// Creates one empty list per category for a new user.
    fn initialize_orders(&mut self, user_id: UserId) -> BoardStoreResult<()>;

    /// Same as [`BoardReader::order`], but also holds an exclusive lock on the
    /// list until the enclosing unit ends.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::UserNotFound`] when the user does not exist.
    fn order_for_update(
        &mut self,
        user_id: UserId,
        category: Category,
    ) -> BoardStoreResult<TaskOrder>;

    /// Overwrites the stored sequence with the given list.
    ///
    /// The list is stored as given, without any uniqueness or membership
    /// checks.
    fn replace_order(&mut self, order: &TaskOrder) -> BoardStoreResult<()>;

    /// Appends one identifier to the end of a list.
    fn append_to_order(
        &mut self,
        user_id: UserId,
        category: Category,
        task_id: TaskId,
    ) -> BoardStoreResult<()>;
}

/// Every store available inside one atomic unit.
pub trait BoardUnit: BoardReader + UserStore + TaskStore + OrderStore {}

impl<T> BoardUnit for T where T: BoardReader + UserStore + TaskStore + OrderStore {}

/// Opens atomic units over the board stores.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Runs `work` as one all-or-nothing unit.
    ///
    /// Changes made through the unit become visible only if `work` returns
    /// `Ok`. Any error rolls every change back.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or a converted
    /// [`BoardStoreError`] when the unit itself cannot be opened or committed.
    async fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardUnit) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static;

    /// Runs `read` against one consistent view of the stores.
    ///
    /// Every read inside the unit observes the same committed state, so a
    /// concurrent move is seen either entirely or not at all. No writes are
    /// possible.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `read`, or a converted
    /// [`BoardStoreError`] when the view cannot be opened.
    async fn snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum BoardStoreError {
    /// A user with the same email address already exists.
    #[error("duplicate email: {0}")]
    DuplicateEmail(Email),

    /// The user was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BoardStoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
