//! Fixed workflow categories a task can occupy.

use super::ParseCategoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow stage of a task, one column on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Work not yet started. New tasks land here.
    #[serde(rename = "TODO")]
    Todo,
    /// Work under way.
    #[serde(rename = "IN PROGRESS")]
    InProgress,
    /// Work awaiting verification.
    #[serde(rename = "TESTING")]
    Testing,
    /// Finished work.
    #[serde(rename = "DONE")]
    Done,
}

impl Category {
    /// Every category, in board order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Testing, Self::Done];

    /// Category assigned to newly created tasks.
    pub const DEFAULT: Self = Self::Todo;

    /// Returns the canonical storage and wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN PROGRESS",
            Self::Testing => "TESTING",
            Self::Done => "DONE",
        }
    }
}

impl TryFrom<&str> for Category {
    type Error = ParseCategoryError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "TODO" => Ok(Self::Todo),
            "IN PROGRESS" => Ok(Self::InProgress),
            "TESTING" => Ok(Self::Testing),
            "DONE" => Ok(Self::Done),
            _ => Err(ParseCategoryError(value.to_owned())),
        }
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
