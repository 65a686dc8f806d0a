//! Diesel row models for board persistence.

use super::schema::{task_orders, tasks, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Normalized email address.
    pub email: String,
    /// Salted password hash.
    pub password_hash: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of the `tasks` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Free-text content.
    pub content: String,
    /// Category label.
    pub category: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row of the `task_orders` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskOrderRow {
    /// Owning user.
    pub user_id: Uuid,
    /// Category label.
    pub category: String,
    /// Ordered task identifiers.
    pub task_ids: Vec<Uuid>,
}
