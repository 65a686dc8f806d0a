//! Read model of a user's whole board, grouped by category.

use super::{Category, Task, TaskId};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Every category of one user's board with its tasks in display order.
///
/// All four categories are always present, even when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    columns: BTreeMap<Category, Vec<Task>>,
}

impl BoardView {
    /// Creates a board with every category empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            columns: Category::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        }
    }

    /// Replaces the tasks of one column.
    pub fn set_column(&mut self, category: Category, tasks: Vec<Task>) {
        self.columns.insert(category, tasks);
    }

    /// Returns the tasks of one column in display order.
    #[must_use]
    pub fn column(&self, category: Category) -> &[Task] {
        self.columns.get(&category).map_or(&[], Vec::as_slice)
    }

    /// Returns the task identifiers of one column in display order.
    #[must_use]
    pub fn task_ids(&self, category: Category) -> Vec<TaskId> {
        self.column(category).iter().map(Task::id).collect()
    }

    /// Iterates over the columns in board order.
    pub fn columns(&self) -> impl Iterator<Item = (Category, &[Task])> {
        self.columns
            .iter()
            .map(|(category, tasks)| (*category, tasks.as_slice()))
    }

    /// Returns the total number of tasks on the board.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }
}

impl Default for BoardView {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(serde::Serialize)]
struct TaskCard<'a> {
    id: TaskId,
    content: &'a str,
    created_at: DateTime<Utc>,
}

impl Serialize for BoardView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (category, tasks) in self.columns() {
            let cards: Vec<TaskCard<'_>> = tasks
                .iter()
                .map(|task| TaskCard {
                    id: task.id(),
                    content: task.content().as_str(),
                    created_at: task.created_at(),
                })
                .collect();
            map.serialize_entry(category.as_str(), &cards)?;
        }
        map.end()
    }
}
