//! In-memory board store for tests and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::board::{
    domain::{Category, Email, Task, TaskId, TaskOrder, User, UserId},
    ports::{
        BoardReader, BoardStore, BoardStoreError, BoardStoreResult, BoardUnit, OrderStore,
        TaskStore, UserStore,
    },
};

/// Thread-safe in-memory board store.
///
/// Units are serialized on a single mutex. A write unit runs against a copy
/// of the whole state that is published only when the unit succeeds, so its
/// cost grows with everything the store holds. Read units run directly on
/// the locked state. The store is meant for tests and development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardStore {
    state: Arc<Mutex<BoardState>>,
}

#[derive(Debug, Clone, Default)]
struct BoardState {
    users: HashMap<UserId, User>,
    email_index: HashMap<Email, UserId>,
    tasks: HashMap<TaskId, Task>,
    orders: HashMap<(UserId, Category), Vec<TaskId>>,
}

impl InMemoryBoardStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> BoardStoreResult<MutexGuard<'_, BoardState>> {
        self.state.lock().map_err(|err| {
            BoardStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl BoardState {
    fn require_user(&self, user_id: UserId) -> BoardStoreResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(BoardStoreError::UserNotFound(user_id))
        }
    }
}

impl BoardReader for BoardState {
    fn find_user_by_email(&mut self, email: &Email) -> BoardStoreResult<Option<User>> {
        Ok(self
            .email_index
            .get(email)
            .and_then(|user_id| self.users.get(user_id))
            .cloned())
    }

    fn tasks_by_user(&mut self, user_id: UserId) -> BoardStoreResult<HashMap<TaskId, Task>> {
        Ok(self
            .tasks
            .values()
            .filter(|task| task.user_id() == user_id)
            .map(|task| (task.id(), task.clone()))
            .collect())
    }

    fn find_task(&mut self, user_id: UserId, task_id: TaskId) -> BoardStoreResult<Option<Task>> {
        Ok(self
            .tasks
            .get(&task_id)
            .filter(|task| task.user_id() == user_id)
            .cloned())
    }

    fn order(&mut self, user_id: UserId, category: Category) -> BoardStoreResult<TaskOrder> {
        if let Some(task_ids) = self.orders.get(&(user_id, category)) {
            return Ok(TaskOrder::from_persisted(user_id, category, task_ids.clone()));
        }
        self.require_user(user_id)?;
        Ok(TaskOrder::empty(user_id, category))
    }
}

impl UserStore for BoardState {
    fn insert_user(&mut self, user: &User) -> BoardStoreResult<()> {
        if self.email_index.contains_key(user.email()) {
            return Err(BoardStoreError::DuplicateEmail(user.email().clone()));
        }
        self.email_index.insert(user.email().clone(), user.id());
        self.users.insert(user.id(), user.clone());
        Ok(())
    }
}

impl TaskStore for BoardState {
    fn create_task(&mut self, task: &Task) -> BoardStoreResult<()> {
        self.require_user(task.user_id())?;
        self.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn set_task_category(&mut self, task_id: TaskId, category: Category) -> BoardStoreResult<()> {
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(BoardStoreError::TaskNotFound(task_id))?;
        task.set_category(category);
        Ok(())
    }
}

impl OrderStore for BoardState {
    fn initialize_orders(&mut self, user_id: UserId) -> BoardStoreResult<()> {
        for category in Category::ALL {
            self.orders.insert((user_id, category), Vec::new());
        }
        Ok(())
    }

    fn order_for_update(
        &mut self,
        user_id: UserId,
        category: Category,
    ) -> BoardStoreResult<TaskOrder> {
        // The whole unit already holds the store mutex.
        self.order(user_id, category)
    }

    fn replace_order(&mut self, order: &TaskOrder) -> BoardStoreResult<()> {
        self.orders.insert(
            (order.user_id(), order.category()),
            order.task_ids().to_vec(),
        );
        Ok(())
    }

    fn append_to_order(
        &mut self,
        user_id: UserId,
        category: Category,
        task_id: TaskId,
    ) -> BoardStoreResult<()> {
        self.require_user(user_id)?;
        self.orders
            .entry((user_id, category))
            .or_default()
            .push(task_id);
        Ok(())
    }
}

#[async_trait]
impl BoardStore for InMemoryBoardStore {
    async fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardUnit) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static,
    {
        let mut state = self.lock()?;
        let mut draft = state.clone();
        let outcome = work(&mut draft)?;
        *state = draft;
        Ok(outcome)
    }

    async fn snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static,
    {
        let mut state = self.lock()?;
        read(&mut *state)
    }
}
