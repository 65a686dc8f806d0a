//! Diesel schema for board persistence.

diesel::table! {
    /// Registered board users.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        username -> Varchar,
        /// Unique, normalized email address.
        #[max_length = 255]
        email -> Varchar,
        /// Salted password hash.
        password_hash -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task records, unordered.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Free-text content.
        content -> Text,
        /// Category label matching the list that holds the task.
        #[max_length = 20]
        category -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Canonical task order per (user, category).
    task_orders (user_id, category) {
        /// Owning user.
        user_id -> Uuid,
        /// Category label.
        #[max_length = 20]
        category -> Varchar,
        /// Ordered task identifiers.
        task_ids -> Array<Uuid>,
    }
}

diesel::joinable!(tasks -> users (user_id));
diesel::joinable!(task_orders -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, tasks, task_orders);
