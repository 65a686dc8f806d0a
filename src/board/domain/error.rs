//! Error types for board domain validation, parsing, and moves.

use super::{Category, TaskId};
use thiserror::Error;

/// Errors returned while constructing board domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task content is empty after trimming.
    #[error("task content must not be empty")]
    EmptyTaskContent,

    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,

    /// The email address is not of the form `local@domain`.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// The password hash is empty.
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Error returned while parsing a category label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

/// A move request that does not match the current state of an ordered list.
///
/// Callers are expected to re-read the board and retry with fresh indices.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidMove {
    /// The task is not at the position the caller observed.
    #[error(
        "task {task_id} is not at index {source_index} of {category} (actual position: {actual:?})"
    )]
    SourceMismatch {
        /// Task being moved.
        task_id: TaskId,
        /// List the task was expected in.
        category: Category,
        /// Index the caller supplied.
        source_index: usize,
        /// Where the task actually is, if it is in the list at all.
        actual: Option<usize>,
    },

    /// The destination index falls outside the permitted range.
    #[error("destination index {destination_index} is out of bounds for {category} (max {max})")]
    DestinationOutOfBounds {
        /// List being inserted into.
        category: Category,
        /// Index the caller supplied.
        destination_index: usize,
        /// Largest accepted index.
        max: usize,
    },

    /// A cross-category move named the same category on both sides.
    #[error("cross-category move requires distinct categories, got {0} twice")]
    SameCategory(Category),
}
