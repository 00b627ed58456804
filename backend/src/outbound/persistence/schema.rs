//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate with
//! `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name (max 150 characters).
        #[max_length = 150]
        username -> Varchar,
        /// Argon2id PHC-format password hash.
        password_hash -> Text,
        /// Superusers bypass every dashboard gate.
        is_superuser -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One-to-one profile carrying the account's role label.
    user_profiles (user_id) {
        /// Owning account.
        user_id -> Uuid,
        /// Role label: Manager, Technician, Repair, or View-only.
        #[max_length = 20]
        role -> Varchar,
    }
}

diesel::table! {
    /// Tracked factory equipment.
    machines (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name (max 100 characters).
        #[max_length = 100]
        name -> Varchar,
        /// Free-text description.
        description -> Text,
        /// Status label: OK, Warning, or Fault.
        #[max_length = 10]
        status -> Varchar,
        /// Optional stored image path.
        image_path -> Nullable<Text>,
        /// Record creation timestamp; tie-breaker for priority ordering.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Personnel assigned to machines.
    machine_assignments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Assigned machine.
        machine_id -> Uuid,
        /// Assigned account.
        user_id -> Uuid,
        /// Assignment timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reported machine failures.
    fault_cases (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning machine.
        machine_id -> Uuid,
        /// Reporter; nulled when the account is deleted.
        reported_by -> Nullable<Uuid>,
        /// Lifecycle label: open, in_progress, or resolved.
        #[max_length = 20]
        status -> Varchar,
        /// Optional short summary (max 200 characters).
        #[max_length = 200]
        title -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only notes on fault cases.
    fault_notes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning fault case.
        fault_case_id -> Uuid,
        /// Note text; empty when only an image was attached.
        note -> Text,
        /// Optional stored image path.
        image_path -> Nullable<Text>,
        /// Author; nulled when the account is deleted.
        created_by -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Advisory warnings on machines.
    warnings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning machine.
        machine_id -> Uuid,
        /// Advisory text (max 255 characters).
        #[max_length = 255]
        warning_text -> Varchar,
        /// Author; nulled when the account is deleted.
        created_by -> Nullable<Uuid>,
        /// Whether the warning is still in force.
        active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Named machine groupings used for filtering.
    collections (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique validated name (max 50 characters).
        #[max_length = 50]
        name -> Varchar,
    }
}

diesel::table! {
    /// Collection membership join table.
    collection_machines (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning collection.
        collection_id -> Uuid,
        /// Member machine.
        machine_id -> Uuid,
    }
}

diesel::joinable!(user_profiles -> users (user_id));
diesel::joinable!(machine_assignments -> machines (machine_id));
diesel::joinable!(machine_assignments -> users (user_id));
diesel::joinable!(fault_cases -> machines (machine_id));
diesel::joinable!(fault_notes -> fault_cases (fault_case_id));
diesel::joinable!(warnings -> machines (machine_id));
diesel::joinable!(collection_machines -> collections (collection_id));
diesel::joinable!(collection_machines -> machines (machine_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    user_profiles,
    machines,
    machine_assignments,
    fault_cases,
    fault_notes,
    warnings,
    collections,
    collection_machines,
);
