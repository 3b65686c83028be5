//! Diesel table definitions for ticket storage.

diesel::table! {
    tickets (id) {
        id -> Uuid,
        board_id -> Uuid,
        author_id -> Uuid,
        #[max_length = 255]
        title -> Varchar,
        description -> Nullable<Text>,
        #[max_length = 32]
        category -> Varchar,
        #[max_length = 16]
        priority -> Varchar,
        #[max_length = 32]
        status -> Varchar,
        archived -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    comments (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        author_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reflections (id) {
        id -> Uuid,
        ticket_id -> Uuid,
        author_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(tickets, comments, reflections);
