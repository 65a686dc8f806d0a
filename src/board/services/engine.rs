//! Ordering engine: the only writer of task categories and ordered lists.

use crate::board::{
    domain::{
        BoardDomainError, BoardView, Category, Email, InvalidMove, PasswordHash, Task,
        TaskContent, TaskId, TaskOrder, User, UserId, Username,
    },
    ports::{BoardStore, BoardStoreError, BoardStoreResult, OrderStore},
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    username: String,
    email: String,
    password_hash: String,
}

impl CreateUserRequest {
    /// Creates a request from raw fields.
    ///
    /// `password_hash` must already be a salted hash; the engine never sees
    /// plaintext credentials.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Drag-and-drop reposition request as sent by board clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTaskRequest {
    /// Task being moved.
    pub task_id: TaskId,
    /// Column the client saw the task in.
    pub source_category: Category,
    /// Position the client saw the task at.
    pub source_index: usize,
    /// Column the task is dropped into.
    pub destination_category: Category,
    /// Position the task is dropped at.
    pub destination_index: usize,
}

/// Service-level errors for board operations.
#[derive(Debug, Clone, Error)]
pub enum OrderingError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),

    /// The move does not match the current list state.
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),

    /// The email address is already registered.
    #[error("email already registered: {0}")]
    DuplicateEmail(Email),

    /// The user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(BoardStoreError),
}

impl OrderingError {
    /// Returns `true` when re-reading the board and retrying with fresh
    /// indices may succeed.
    #[must_use]
    pub const fn is_retryable_after_refresh(&self) -> bool {
        matches!(self, Self::InvalidMove(_))
    }
}

impl From<BoardStoreError> for OrderingError {
    fn from(err: BoardStoreError) -> Self {
        match err {
            BoardStoreError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            BoardStoreError::UserNotFound(user_id) => Self::UserNotFound(user_id),
            BoardStoreError::TaskNotFound(task_id) => Self::TaskNotFound(task_id),
            BoardStoreError::InvalidPersistedData(_) | BoardStoreError::Persistence(_) => {
                Self::Storage(err)
            }
        }
    }
}

/// Result type for ordering engine operations.
pub type OrderingResult<T> = Result<T, OrderingError>;

/// Stateless coordinator of task records and their ordered lists.
///
/// Every write runs as one atomic unit on the store and every read as one
/// snapshot. Lists are re-read (and locked for writes) on every call;
/// nothing is cached between calls.
#[derive(Clone)]
pub struct OrderingEngine<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> OrderingEngine<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a new ordering engine.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers a user together with their four empty category lists.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Domain`] for malformed fields,
    /// [`OrderingError::DuplicateEmail`] when the address is taken, and
    /// [`OrderingError::Storage`] on backend failure. No lists are created
    /// when the user is rejected.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_user(&self, request: CreateUserRequest) -> OrderingResult<User> {
        let user = User::new(
            Username::new(request.username)?,
            Email::new(request.email)?,
            PasswordHash::new(request.password_hash)?,
            &*self.clock,
        );
        let stored = user.clone();
        self.store
            .atomically(move |unit| -> OrderingResult<()> {
                unit.insert_user(&stored)?;
                unit.initialize_orders(stored.id())?;
                Ok(())
            })
            .await
            .inspect_err(log_failure)?;
        tracing::info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    /// Creates a task in the default category and appends it to that list.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Domain`] for empty content,
    /// [`OrderingError::UserNotFound`] when the user does not exist, and
    /// [`OrderingError::Storage`] on backend failure.
    #[tracing::instrument(skip(self, content), fields(user_id = %user_id))]
    pub async fn create_task(
        &self,
        user_id: UserId,
        content: impl Into<String> + Send,
    ) -> OrderingResult<Task> {
        let task = Task::new(user_id, TaskContent::new(content)?, &*self.clock);
        let stored = task.clone();
        self.store
            .atomically(move |unit| -> OrderingResult<()> {
                unit.create_task(&stored)?;
                unit.append_to_order(user_id, stored.category(), stored.id())?;
                Ok(())
            })
            .await
            .inspect_err(log_failure)?;
        tracing::debug!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Returns the user's board with every category in list order.
    ///
    /// All four lists and the task records come from one snapshot, so a
    /// concurrent cross-category move shows up in exactly one column.
    /// Identifiers without a matching task record are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::UserNotFound`] when the user does not exist
    /// and [`OrderingError::Storage`] on backend failure.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_tasks(&self, user_id: UserId) -> OrderingResult<BoardView> {
        let (orders, tasks) = self
            .store
            .snapshot(move |unit| -> OrderingResult<(Vec<TaskOrder>, HashMap<TaskId, Task>)> {
                let orders = Category::ALL
                    .into_iter()
                    .map(|category| unit.order(user_id, category))
                    .collect::<BoardStoreResult<Vec<_>>>()?;
                let tasks = unit.tasks_by_user(user_id)?;
                Ok((orders, tasks))
            })
            .await
            .inspect_err(log_failure)?;

        let mut board = BoardView::empty();
        for order in orders {
            let category = order.category();
            let column = order
                .task_ids()
                .iter()
                .filter_map(|task_id| {
                    let task = tasks.get(task_id).cloned();
                    if task.is_none() {
                        tracing::warn!(
                            %task_id,
                            %category,
                            "ordered list references a missing task record"
                        );
                    }
                    task
                })
                .collect();
            board.set_column(category, column);
        }
        Ok(board)
    }

    /// Moves a task to another position inside one category.
    ///
    /// `source_index` must be the task's current position and
    /// `destination_index` must be an existing slot (`0..=len - 1`).
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::InvalidMove`] when either index check fails
    /// (the list is left unchanged), [`OrderingError::UserNotFound`] when the
    /// user does not exist, and [`OrderingError::Storage`] on backend
    /// failure.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, task_id = %task_id))]
    pub async fn move_within_category(
        &self,
        user_id: UserId,
        task_id: TaskId,
        source_index: usize,
        destination_index: usize,
        category: Category,
    ) -> OrderingResult<()> {
        self.store
            .atomically(move |unit| -> OrderingResult<()> {
                let mut order = unit.order_for_update(user_id, category)?;
                order.move_within(task_id, source_index, destination_index)?;
                unit.replace_order(&order)?;
                Ok(())
            })
            .await
            .inspect_err(log_failure)
    }

    /// Moves a task from one category into another.
    ///
    /// `source_index` must be the task's current position in the source
    /// list; `destination_index` may be anything in `0..=len` of the
    /// destination list, where `len` appends. The task's category field is
    /// updated in the same unit.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::InvalidMove`] when the categories are equal
    /// or either index check fails (nothing is changed),
    /// [`OrderingError::UserNotFound`] or [`OrderingError::TaskNotFound`]
    /// for missing records, and [`OrderingError::Storage`] on backend
    /// failure.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, task_id = %task_id))]
    pub async fn move_across_categories(
        &self,
        user_id: UserId,
        task_id: TaskId,
        source_index: usize,
        destination_index: usize,
        source_category: Category,
        destination_category: Category,
    ) -> OrderingResult<()> {
        if source_category == destination_category {
            let err = OrderingError::from(InvalidMove::SameCategory(source_category));
            log_failure(&err);
            return Err(err);
        }
        self.store
            .atomically(move |unit| -> OrderingResult<()> {
                let (mut source, mut destination) =
                    lock_pair(unit, user_id, source_category, destination_category)?;

                source.take(task_id, source_index)?;
                unit.replace_order(&source)?;

                destination.insert_at(task_id, destination_index)?;
                unit.replace_order(&destination)?;

                unit.set_task_category(task_id, destination_category)?;
                Ok(())
            })
            .await
            .inspect_err(log_failure)
    }

    /// Applies a client reposition request.
    ///
    /// Requests naming one category on both sides are moves within that
    /// category; all others are cross-category moves.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Self::move_within_category`] or
    /// [`Self::move_across_categories`].
    pub async fn sort_task(&self, user_id: UserId, request: MoveTaskRequest) -> OrderingResult<()> {
        if request.source_category == request.destination_category {
            self.move_within_category(
                user_id,
                request.task_id,
                request.source_index,
                request.destination_index,
                request.source_category,
            )
            .await
        } else {
            self.move_across_categories(
                user_id,
                request.task_id,
                request.source_index,
                request.destination_index,
                request.source_category,
                request.destination_category,
            )
            .await
        }
    }

    /// Looks up a user by email address.
    ///
    /// Returns `Ok(None)` when no user has the address.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Domain`] for a malformed address and
    /// [`OrderingError::Storage`] on backend failure.
    #[tracing::instrument(skip(self, email))]
    pub async fn find_user_by_email(&self, email: &str) -> OrderingResult<Option<User>> {
        let address = Email::new(email)?;
        self.store
            .snapshot(move |unit| -> OrderingResult<Option<User>> {
                Ok(unit.find_user_by_email(&address)?)
            })
            .await
            .inspect_err(log_failure)
    }

    /// Looks up one task owned by the user.
    ///
    /// Returns `Ok(None)` when the user owns no such task.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Storage`] on backend failure.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, task_id = %task_id))]
    pub async fn find_task(&self, user_id: UserId, task_id: TaskId) -> OrderingResult<Option<Task>> {
        self.store
            .snapshot(move |unit| -> OrderingResult<Option<Task>> {
                Ok(unit.find_task(user_id, task_id)?)
            })
            .await
            .inspect_err(log_failure)
    }
}

/// Locks both lists of a cross-category move in board order.
///
/// Returns `(source, destination)` regardless of locking order.
fn lock_pair<U>(
    unit: &mut U,
    user_id: UserId,
    source_category: Category,
    destination_category: Category,
) -> BoardStoreResult<(TaskOrder, TaskOrder)>
where
    U: OrderStore + ?Sized,
{
    if source_category < destination_category {
        let source = unit.order_for_update(user_id, source_category)?;
        let destination = unit.order_for_update(user_id, destination_category)?;
        Ok((source, destination))
    } else {
        let destination = unit.order_for_update(user_id, destination_category)?;
        let source = unit.order_for_update(user_id, source_category)?;
        Ok((source, destination))
    }
}

fn log_failure(err: &OrderingError) {
    match err {
        OrderingError::Storage(_) => tracing::error!(error = %err, "board storage failure"),
        OrderingError::InvalidMove(_) => tracing::debug!(error = %err, "move rejected"),
        OrderingError::Domain(_)
        | OrderingError::DuplicateEmail(_)
        | OrderingError::UserNotFound(_)
        | OrderingError::TaskNotFound(_) => tracing::debug!(error = %err, "request rejected"),
    }
}
