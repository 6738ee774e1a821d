//! Database models.

use diesel::prelude::*;

use crate::schema::{device_tokens, notification_statuses};

/// Device token record.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = device_tokens)]
pub struct DeviceTokenRow {
    pub id: i32,
    pub subscriber_id: String,
    pub platform: String,
    pub token: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// New device token for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = device_tokens)]
pub struct NewDeviceToken<'a> {
    pub subscriber_id: &'a str,
    pub platform: &'a str,
    pub token: &'a str,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Notification status record.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = notification_statuses, primary_key(job_id))]
pub struct NotificationStatusRow {
    pub job_id: String,
    pub title: String,
    pub body: String,
    pub category: String,
    pub total_count: i64,
    pub successful_count: i64,
    pub failed_count: i64,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// New notification status for insertion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_statuses)]
pub struct NewNotificationStatus<'a> {
    pub job_id: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub category: &'a str,
    pub total_count: i64,
    pub successful_count: i64,
    pub failed_count: i64,
    pub status: &'a str,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl DeviceTokenRow {
    /// Convert to the domain type.
    pub fn into_device_token(self) -> color_eyre::eyre::Result<notify_core::DeviceToken> {
        Ok(notify_core::DeviceToken {
            subscriber_id: self.subscriber_id,
            platform: self.platform.parse()?,
            token: self.token,
        })
    }
}

impl NotificationStatusRow {
    /// Convert to the domain type.
    pub fn into_status(self) -> color_eyre::eyre::Result<notify_core::NotificationStatus> {
        Ok(notify_core::NotificationStatus {
            job_id: self.job_id,
            title: self.title,
            body: self.body,
            category: self.category,
            total_count: self.total_count,
            successful_count: self.successful_count,
            failed_count: self.failed_count,
            status: self.status.parse()?,
            created_at: chrono::DateTime::from_naive_utc_and_offset(self.created_at, chrono::Utc),
            updated_at: chrono::DateTime::from_naive_utc_and_offset(self.updated_at, chrono::Utc),
        })
    }
}
