//! Shared helpers for integration tests: scoped environment updates and
//! board consistency checks.

use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

use kanban::board::{
    domain::{BoardView, TaskId, UserId},
    ports::BoardStore,
    services::OrderingEngine,
};
use mockable::Clock;

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Guard that applies a scoped environment variable update.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets or clears several environment variables for the guard lifetime.
    pub fn set_many(changes: &[(&str, Option<&str>)]) -> Self {
        let lock = env_lock();
        let mut previous = Vec::with_capacity(changes.len());

        for (key, value) in changes {
            previous.push((OsString::from(*key), env::var_os(key)));
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(new_value) => env::set_var(key, new_value),
                    None => env::remove_var(key),
                }
            }
        }

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(previous) => env::set_var(&key, &previous),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Checks that a board holds exactly `expected` tasks, each listed once, in
/// the column matching the category read in the same listing.
///
/// # Errors
///
/// Returns an error describing the first violation found.
pub async fn ensure_board_consistent<S, C>(
    engine: &OrderingEngine<S, C>,
    user_id: UserId,
    expected: &[TaskId],
) -> Result<BoardView, eyre::Report>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    let board = engine.list_tasks(user_id).await?;
    let mut seen = HashSet::new();
    for (category, tasks) in board.columns() {
        for task in tasks {
            eyre::ensure!(
                seen.insert(task.id()),
                "task {} is listed more than once",
                task.id()
            );
            eyre::ensure!(
                task.category() == category,
                "task {} is listed under {category} but stored as {}",
                task.id(),
                task.category()
            );
        }
    }
    let wanted: HashSet<TaskId> = expected.iter().copied().collect();
    eyre::ensure!(
        seen == wanted,
        "board lists {} tasks, expected {}",
        seen.len(),
        wanted.len()
    );
    Ok(board)
}
