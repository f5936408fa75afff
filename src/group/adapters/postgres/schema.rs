//! Diesel schema for group and membership persistence.

diesel::table! {
    /// Group records.
    #[sql_name = "group"]
    groups (id) {
        /// Store-assigned group identifier.
        id -> Int4,
        /// Human-readable group label.
        #[max_length = 100]
        name -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Categorical group label.
        #[sql_name = "type"]
        #[max_length = 50]
        group_type -> Varchar,
        /// Optional thumbnail reference.
        thumbnail -> Nullable<Text>,
        /// Lifecycle flag.
        is_active -> Bool,
    }
}

diesel::table! {
    /// User/group membership records.
    group_membership (group_id, user_id) {
        /// Referenced group.
        group_id -> Int4,
        /// Referenced user.
        user_id -> Int4,
        /// Canonical role string (admin or member).
        #[max_length = 20]
        role -> Varchar,
        /// Join timestamp.
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// User records owned by the user directory.
    #[sql_name = "user"]
    users (id) {
        /// Internal user key.
        id -> Int4,
        /// Identity-provider identifier.
        #[max_length = 100]
        external_id -> Varchar,
        /// Login name.
        #[max_length = 100]
        username -> Varchar,
        /// Given name.
        #[max_length = 100]
        first_name -> Nullable<Varchar>,
        /// Family name.
        #[max_length = 100]
        last_name -> Nullable<Varchar>,
        /// Contact address.
        #[max_length = 255]
        email -> Varchar,
        /// Account lifecycle flag.
        is_active -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Preselected group.
        default_group_id -> Nullable<Int4>,
    }
}

diesel::joinable!(group_membership -> groups (group_id));
diesel::joinable!(group_membership -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(groups, group_membership, users);
