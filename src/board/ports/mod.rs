//! Port contracts for board persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the ordering
//! engine.

pub mod store;

pub use store::{
    BoardReader, BoardStore, BoardStoreError, BoardStoreResult, BoardUnit, OrderStore, TaskStore,
    UserStore,
};
