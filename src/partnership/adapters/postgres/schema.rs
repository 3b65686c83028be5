//! Diesel table definitions for partnership storage.

diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        partner_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    invites (id) {
        id -> Uuid,
        inviter_id -> Uuid,
        invitee_id -> Uuid,
        #[max_length = 32]
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    boards (id) {
        id -> Uuid,
        #[max_length = 255]
        name -> Varchar,
        first_member_id -> Uuid,
        second_member_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, invites, boards);
