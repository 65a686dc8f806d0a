//! Kanban: ordered task boards with per-category drag-and-drop ordering.
//!
//! This crate provides the ordering core of a kanban board: task records,
//! one ordered list per (user, category), and an engine that keeps the two
//! consistent under concurrent reorders.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`board`]: Task records, ordered lists, and the ordering engine
//! - [`config`]: Environment-driven backend configuration
//! - [`telemetry`]: Structured logging setup

pub mod board;
pub mod config;
pub mod telemetry;
