//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// User accounts.
    users (username) {
        /// Canonical (lower-cased) login name.
        #[max_length = 50]
        username -> Varchar,
        /// bcrypt password hash.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Whether the account is disabled.
        disabled -> Bool,
        /// Contact address for notifications.
        #[max_length = 255]
        email -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Application namespaces and their permits.
    applications (acronym) {
        /// Canonical (lower-cased) acronym.
        #[max_length = 50]
        acronym -> Varchar,
        /// Last allocated running number.
        running_number -> Int8,
        /// Group allowed to create tasks.
        #[max_length = 50]
        permit_create_group -> Varchar,
        /// Group allowed to promote tasks to done.
        #[max_length = 50]
        permit_done_group -> Varchar,
    }
}

diesel::table! {
    /// Group memberships.
    user_groups (username, group_name) {
        /// Member username; may hold the unassigned placeholder.
        #[max_length = 50]
        username -> Varchar,
        /// Group name.
        #[max_length = 50]
        group_name -> Varchar,
    }
}

diesel::table! {
    /// Task records.
    tasks (task_id) {
        /// `<acronym>_<number>` identifier.
        #[max_length = 100]
        task_id -> Varchar,
        /// Canonical task name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Workflow state.
        #[max_length = 20]
        state -> Varchar,
        /// Owning application acronym.
        #[max_length = 50]
        app_acronym -> Varchar,
        /// User who created the task.
        #[max_length = 50]
        creator -> Varchar,
        /// User owning the task.
        #[max_length = 50]
        owner -> Varchar,
        /// Creation timestamp (UTC).
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Append-only audit batches; each row holds a JSON array of entries.
    task_notes (id) {
        /// Insertion sequence.
        id -> Int8,
        /// Task the batch belongs to.
        #[max_length = 100]
        task_id -> Varchar,
        /// Timestamp of the latest entry in the batch (UTC).
        created_at -> Timestamp,
        /// JSON array of audit entries.
        notes -> Jsonb,
    }
}

diesel::joinable!(tasks -> applications (app_acronym));
diesel::joinable!(task_notes -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(applications, task_notes, tasks, user_groups, users);
