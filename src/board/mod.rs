//! Task ordering for kanban boards.
//!
//! Each user owns tasks in four fixed categories. Task records are stored
//! unordered; the display order of every category lives in a separate
//! ordered list that only the [`services::OrderingEngine`] writes. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
