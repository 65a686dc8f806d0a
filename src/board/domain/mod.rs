//! Domain model for the kanban board.
//!
//! Tasks live in an unordered record set while their display order lives in
//! one [`TaskOrder`] per (user, category). The types here carry the index
//! arithmetic for reordering and keep infrastructure concerns outside the
//! domain boundary.

mod board;
mod category;
mod error;
mod ids;
mod order;
mod task;
mod user;

pub use board::BoardView;
pub use category::Category;
pub use error::{BoardDomainError, InvalidMove, ParseCategoryError};
pub use ids::{TaskId, UserId};
pub use order::TaskOrder;
pub use task::{PersistedTaskData, Task, TaskContent};
pub use user::{Email, PasswordHash, PersistedUserData, User, Username};
