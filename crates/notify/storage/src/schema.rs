//! Diesel schema definitions.

diesel::table! {
    device_tokens (id) {
        id -> Integer,
        subscriber_id -> Text,
        platform -> Text,
        token -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    notification_statuses (job_id) {
        job_id -> Text,
        title -> Text,
        body -> Text,
        category -> Text,
        total_count -> BigInt,
        successful_count -> BigInt,
        failed_count -> BigInt,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(device_tokens, notification_statuses);
