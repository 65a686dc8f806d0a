//! Application services for task ordering.

mod engine;

pub use engine::{
    CreateUserRequest, MoveTaskRequest, OrderingEngine, OrderingError, OrderingResult,
};
