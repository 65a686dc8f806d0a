//! Adapter implementations of the board store ports.

pub mod configured;
pub mod memory;
pub mod postgres;

pub use configured::{ConfiguredBoardStore, StoreOpenError};
