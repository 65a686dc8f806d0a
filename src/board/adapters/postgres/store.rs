//! `PostgreSQL` board store.
//!
//! Each unit of work is one transaction on a pooled connection, executed on
//! the blocking thread pool. Write units run at `READ COMMITTED`; ordered
//! lists read for mutation are locked with `SELECT ... FOR UPDATE`, so
//! concurrent movers on the same list are serialized and the later one sees
//! the committed result of the earlier one. Snapshot units run as
//! `REPEATABLE READ READ ONLY` transactions, so all of their statements share
//! one view of committed data.

use super::{
    models::{TaskOrderRow, TaskRow, UserRow},
    schema::{task_orders, tasks, users},
};
use crate::board::{
    domain::{
        Category, Email, PasswordHash, PersistedTaskData, PersistedUserData, Task, TaskContent,
        TaskId, TaskOrder, User, UserId, Username,
    },
    ports::{
        BoardReader, BoardStore, BoardStoreError, BoardStoreResult, BoardUnit, OrderStore,
        TaskStore, UserStore,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use diesel::upsert::excluded;
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by board adapters.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// `PostgreSQL`-backed board store.
#[derive(Debug, Clone)]
pub struct PostgresBoardStore {
    pool: BoardPgPool,
}

impl PostgresBoardStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }
}

/// Outcome of a failed transaction body: either the caller's own error or a
/// database failure raised while beginning or committing.
enum UnitFailure<E> {
    Work(E),
    Database(DieselError),
}

impl<E> From<DieselError> for UnitFailure<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

/// Transaction flavour for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitMode {
    ReadWrite,
    Snapshot,
}

/// Runs `work` in one transaction on a pooled connection.
async fn run_unit<T, E, F>(pool: BoardPgPool, mode: UnitMode, work: F) -> Result<T, E>
where
    F: FnOnce(&mut PgBoardUnit<'_>) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<BoardStoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut connection = pool
            .get()
            .map_err(|err| E::from(BoardStoreError::persistence(err)))?;
        let builder = connection.build_transaction();
        let mut builder = match mode {
            UnitMode::ReadWrite => builder.read_committed(),
            UnitMode::Snapshot => builder.repeatable_read().read_only(),
        };
        builder
            .run(|transaction| {
                let mut unit = PgBoardUnit {
                    connection: transaction,
                };
                work(&mut unit).map_err(UnitFailure::Work)
            })
            .map_err(|failure| match failure {
                UnitFailure::Work(err) => err,
                UnitFailure::Database(err) => E::from(BoardStoreError::persistence(err)),
            })
    })
    .await
    .map_err(|err| E::from(BoardStoreError::persistence(err)))?
}

#[async_trait]
impl BoardStore for PostgresBoardStore {
    async fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardUnit) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static,
    {
        run_unit(self.pool.clone(), UnitMode::ReadWrite, move |unit| work(unit)).await
    }

    async fn snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn BoardReader) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<BoardStoreError> + Send + 'static,
    {
        run_unit(self.pool.clone(), UnitMode::Snapshot, move |unit| read(unit)).await
    }
}

/// Store view over one open transaction.
struct PgBoardUnit<'c> {
    connection: &'c mut PgConnection,
}

impl BoardReader for PgBoardUnit<'_> {
    fn find_user_by_email(&mut self, email: &Email) -> BoardStoreResult<Option<User>> {
        let row = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut *self.connection)
            .optional()
            .map_err(BoardStoreError::persistence)?;
        row.map(row_to_user).transpose()
    }

    fn tasks_by_user(&mut self, user_id: UserId) -> BoardStoreResult<HashMap<TaskId, Task>> {
        let rows = tasks::table
            .filter(tasks::user_id.eq(user_id.into_inner()))
            .select(TaskRow::as_select())
            .load::<TaskRow>(&mut *self.connection)
            .map_err(BoardStoreError::persistence)?;
        rows.into_iter()
            .map(|row| row_to_task(row).map(|task| (task.id(), task)))
            .collect()
    }

    fn find_task(&mut self, user_id: UserId, task_id: TaskId) -> BoardStoreResult<Option<Task>> {
        let row = tasks::table
            .filter(tasks::id.eq(task_id.into_inner()))
            .filter(tasks::user_id.eq(user_id.into_inner()))
            .select(TaskRow::as_select())
            .first::<TaskRow>(&mut *self.connection)
            .optional()
            .map_err(BoardStoreError::persistence)?;
        row.map(row_to_task).transpose()
    }

    fn order(&mut self, user_id: UserId, category: Category) -> BoardStoreResult<TaskOrder> {
        load_order(&mut *self.connection, user_id, category, RowLock::Unlocked)
    }
}

impl UserStore for PgBoardUnit<'_> {
    fn insert_user(&mut self, user: &User) -> BoardStoreResult<()> {
        let row = UserRow {
            id: user.id().into_inner(),
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            password_hash: user.password_hash().expose().to_owned(),
            created_at: user.created_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut *self.connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                    if is_email_unique_violation(info.as_ref()) =>
                {
                    BoardStoreError::DuplicateEmail(user.email().clone())
                }
                _ => BoardStoreError::persistence(err),
            })?;
        Ok(())
    }
}

impl TaskStore for PgBoardUnit<'_> {
    fn create_task(&mut self, task: &Task) -> BoardStoreResult<()> {
        let row = TaskRow {
            id: task.id().into_inner(),
            user_id: task.user_id().into_inner(),
            content: task.content().as_str().to_owned(),
            category: task.category().as_str().to_owned(),
            created_at: task.created_at(),
        };
        diesel::insert_into(tasks::table)
            .values(&row)
            .execute(&mut *self.connection)
            .map_err(|err| map_owned_write_error(err, task.user_id()))?;
        Ok(())
    }

    fn set_task_category(&mut self, task_id: TaskId, category: Category) -> BoardStoreResult<()> {
        let updated = diesel::update(tasks::table.find(task_id.into_inner()))
            .set(tasks::category.eq(category.as_str()))
            .execute(&mut *self.connection)
            .map_err(BoardStoreError::persistence)?;
        if updated == 0 {
            return Err(BoardStoreError::TaskNotFound(task_id));
        }
        Ok(())
    }
}

impl OrderStore for PgBoardUnit<'_> {
    fn initialize_orders(&mut self, user_id: UserId) -> BoardStoreResult<()> {
        let rows: Vec<TaskOrderRow> = Category::ALL
            .into_iter()
            .map(|category| TaskOrderRow {
                user_id: user_id.into_inner(),
                category: category.as_str().to_owned(),
                task_ids: Vec::new(),
            })
            .collect();
        diesel::insert_into(task_orders::table)
            .values(&rows)
            .execute(&mut *self.connection)
            .map_err(|err| map_owned_write_error(err, user_id))?;
        Ok(())
    }

    fn order_for_update(
        &mut self,
        user_id: UserId,
        category: Category,
    ) -> BoardStoreResult<TaskOrder> {
        load_order(&mut *self.connection, user_id, category, RowLock::ForUpdate)
    }

    fn replace_order(&mut self, order: &TaskOrder) -> BoardStoreResult<()> {
        let row = TaskOrderRow {
            user_id: order.user_id().into_inner(),
            category: order.category().as_str().to_owned(),
            task_ids: order.task_ids().iter().map(|id| id.into_inner()).collect(),
        };
        diesel::insert_into(task_orders::table)
            .values(&row)
            .on_conflict((task_orders::user_id, task_orders::category))
            .do_update()
            .set(task_orders::task_ids.eq(excluded(task_orders::task_ids)))
            .execute(&mut *self.connection)
            .map_err(|err| map_owned_write_error(err, order.user_id()))?;
        Ok(())
    }

    fn append_to_order(
        &mut self,
        user_id: UserId,
        category: Category,
        task_id: TaskId,
    ) -> BoardStoreResult<()> {
        diesel::sql_query(concat!(
            "INSERT INTO task_orders (user_id, category, task_ids) ",
            "VALUES ($1, $2, ARRAY[$3]::uuid[]) ",
            "ON CONFLICT (user_id, category) ",
            "DO UPDATE SET task_ids = array_append(task_orders.task_ids, $3)",
        ))
        .bind::<diesel::sql_types::Uuid, _>(user_id.into_inner())
        .bind::<diesel::sql_types::Text, _>(category.as_str())
        .bind::<diesel::sql_types::Uuid, _>(task_id.into_inner())
        .execute(&mut *self.connection)
        .map_err(|err| map_owned_write_error(err, user_id))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowLock {
    Unlocked,
    ForUpdate,
}

fn load_order(
    connection: &mut PgConnection,
    user_id: UserId,
    category: Category,
    lock: RowLock,
) -> BoardStoreResult<TaskOrder> {
    let query = task_orders::table
        .filter(task_orders::user_id.eq(user_id.into_inner()))
        .filter(task_orders::category.eq(category.as_str()))
        .select(task_orders::task_ids);
    let task_ids = match lock {
        RowLock::Unlocked => query.first::<Vec<Uuid>>(connection).optional(),
        RowLock::ForUpdate => query.for_update().first::<Vec<Uuid>>(connection).optional(),
    }
    .map_err(BoardStoreError::persistence)?;

    match task_ids {
        Some(ids) => Ok(TaskOrder::from_persisted(
            user_id,
            category,
            ids.into_iter().map(TaskId::from_uuid).collect(),
        )),
        None if user_exists(connection, user_id)? => Ok(TaskOrder::empty(user_id, category)),
        None => Err(BoardStoreError::UserNotFound(user_id)),
    }
}

fn user_exists(connection: &mut PgConnection, user_id: UserId) -> BoardStoreResult<bool> {
    diesel::select(diesel::dsl::exists(
        users::table.filter(users::id.eq(user_id.into_inner())),
    ))
    .get_result::<bool>(connection)
    .map_err(BoardStoreError::persistence)
}

/// Maps write failures on rows that reference `users`.
fn map_owned_write_error(err: DieselError, user_id: UserId) -> BoardStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            BoardStoreError::UserNotFound(user_id)
        }
        _ => BoardStoreError::persistence(err),
    }
}

fn is_email_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == EMAIL_UNIQUE_CONSTRAINT)
}

fn row_to_user(row: UserRow) -> BoardStoreResult<User> {
    let UserRow {
        id,
        username,
        email,
        password_hash,
        created_at,
    } = row;
    let data = PersistedUserData {
        id: UserId::from_uuid(id),
        username: Username::new(username).map_err(BoardStoreError::invalid_persisted_data)?,
        email: Email::new(email).map_err(BoardStoreError::invalid_persisted_data)?,
        password_hash: PasswordHash::new(password_hash)
            .map_err(BoardStoreError::invalid_persisted_data)?,
        created_at,
    };
    Ok(User::from_persisted(data))
}

fn row_to_task(row: TaskRow) -> BoardStoreResult<Task> {
    let TaskRow {
        id,
        user_id,
        content,
        category,
        created_at,
    } = row;
    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        category: Category::try_from(category.as_str())
            .map_err(BoardStoreError::invalid_persisted_data)?,
        content: TaskContent::new(content).map_err(BoardStoreError::invalid_persisted_data)?,
        created_at,
    };
    Ok(Task::from_persisted(data))
}
