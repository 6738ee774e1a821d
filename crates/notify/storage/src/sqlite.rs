//! SQLite storage implementation.

use color_eyre::eyre::WrapErr as _;
use diesel::connection::SimpleConnection as _;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

use crate::models::*;
use crate::schema::*;
use crate::traits::*;
use notify_core::{DeviceToken, JobStatus, NotificationStatus, Platform};

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Upper bound on bound parameters per `IN (...)` clause.
const DELETE_CHUNK: usize = 500;

/// Per-connection pragmas so pooled writers wait instead of failing with SQLITE_BUSY.
#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// SQLite-based storage.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage from a database URL.
    pub fn new(database_url: &str) -> color_eyre::eyre::Result<Self> {
        Self::with_pool_size(database_url, 10)
    }

    /// Create a new SQLite storage with an explicit pool size.
    pub fn with_pool_size(database_url: &str, pool_size: u32) -> color_eyre::eyre::Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)
            .wrap_err("failed to create connection pool")?;

        Ok(Self { pool })
    }

    /// Run migrations.
    pub fn run_migrations(&self) -> color_eyre::eyre::Result<()> {
        use diesel_migrations::MigrationHarness as _;

        let mut conn = self
            .pool
            .get()
            .wrap_err("failed to get connection for migrations")?;

        conn.run_pending_migrations(crate::MIGRATIONS)
            .map_err(|e| color_eyre::eyre::eyre!("migration failed: {}", e))?;

        Ok(())
    }

    fn conn(
        &self,
    ) -> color_eyre::eyre::Result<diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>>
    {
        self.pool
            .get()
            .wrap_err("failed to get database connection")
    }
}

impl DeviceRegistry for SqliteStorage {
    fn register(&self, device: &DeviceToken) -> color_eyre::eyre::Result<()> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().naive_utc();
        let platform = device.platform.as_str();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            // A token moving to another subscriber/platform pair releases its old row
            diesel::delete(
                device_tokens::table
                    .filter(device_tokens::token.eq(&device.token))
                    .filter(
                        device_tokens::subscriber_id
                            .ne(&device.subscriber_id)
                            .or(device_tokens::platform.ne(platform)),
                    ),
            )
            .execute(conn)?;

            let new_device = NewDeviceToken {
                subscriber_id: &device.subscriber_id,
                platform,
                token: &device.token,
                created_at: now,
                updated_at: now,
            };

            diesel::insert_into(device_tokens::table)
                .values(&new_device)
                .on_conflict((device_tokens::subscriber_id, device_tokens::platform))
                .do_update()
                .set((
                    device_tokens::token.eq(&device.token),
                    device_tokens::updated_at.eq(now),
                ))
                .execute(conn)?;

            Ok(())
        })
        .wrap_err("failed to register device token")?;

        tracing::debug!(
            subscriber_id = %device.subscriber_id,
            platform = %device.platform,
            "registered device token"
        );

        Ok(())
    }

    fn tokens_for_subscribers(&self, subscriber_ids: &[&str]) -> color_eyre::eyre::Result<Vec<String>> {
        let mut conn = self.conn()?;

        let tokens: Vec<String> = device_tokens::table
            .filter(device_tokens::subscriber_id.eq_any(subscriber_ids))
            .order(device_tokens::id.asc())
            .select(device_tokens::token)
            .load(&mut conn)
            .wrap_err("failed to get subscriber tokens")?;

        Ok(tokens)
    }

    fn all_tokens(&self) -> color_eyre::eyre::Result<Vec<String>> {
        let mut conn = self.conn()?;

        let tokens: Vec<String> = device_tokens::table
            .order(device_tokens::id.asc())
            .select(device_tokens::token)
            .load(&mut conn)
            .wrap_err("failed to get device tokens")?;

        Ok(tokens)
    }

    fn get_device(
        &self,
        subscriber_id: &str,
        platform: Platform,
    ) -> color_eyre::eyre::Result<Option<DeviceToken>> {
        let mut conn = self.conn()?;

        let row: Option<DeviceTokenRow> = device_tokens::table
            .filter(device_tokens::subscriber_id.eq(subscriber_id))
            .filter(device_tokens::platform.eq(platform.as_str()))
            .select(DeviceTokenRow::as_select())
            .first(&mut conn)
            .optional()
            .wrap_err("failed to get device")?;

        row.map(DeviceTokenRow::into_device_token).transpose()
    }

    fn delete_tokens(&self, tokens: &[&str]) -> color_eyre::eyre::Result<usize> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;

        let deleted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                let mut deleted = 0;
                for chunk in tokens.chunks(DELETE_CHUNK) {
                    deleted += diesel::delete(
                        device_tokens::table.filter(device_tokens::token.eq_any(chunk)),
                    )
                    .execute(conn)?;
                }
                Ok(deleted)
            })
            .wrap_err("failed to delete device tokens")?;

        Ok(deleted)
    }
}

impl StatusStore for SqliteStorage {
    fn create_pending(&self, status: &NotificationStatus) -> color_eyre::eyre::Result<()> {
        let mut conn = self.conn()?;

        let new_status = NewNotificationStatus {
            job_id: &status.job_id,
            title: &status.title,
            body: &status.body,
            category: &status.category,
            total_count: status.total_count,
            successful_count: 0,
            failed_count: 0,
            status: JobStatus::Pending.as_str(),
            created_at: status.created_at.naive_utc(),
            updated_at: status.updated_at.naive_utc(),
        };

        diesel::insert_into(notification_statuses::table)
            .values(&new_status)
            .execute(&mut conn)
            .wrap_err("failed to create notification status")?;

        Ok(())
    }

    fn finalize(
        &self,
        job_id: &str,
        successful_count: i64,
        failed_count: i64,
    ) -> color_eyre::eyre::Result<bool> {
        let mut conn = self.conn()?;
        let now = chrono::Utc::now().naive_utc();

        let updated = diesel::update(
            notification_statuses::table
                .filter(notification_statuses::job_id.eq(job_id))
                .filter(notification_statuses::status.eq(JobStatus::Pending.as_str())),
        )
        .set((
            notification_statuses::successful_count.eq(successful_count),
            notification_statuses::failed_count.eq(failed_count),
            notification_statuses::status.eq(JobStatus::Done.as_str()),
            notification_statuses::updated_at.eq(now),
        ))
        .execute(&mut conn)
        .wrap_err("failed to finalize notification status")?;

        Ok(updated == 1)
    }

    fn get_status(&self, job_id: &str) -> color_eyre::eyre::Result<Option<NotificationStatus>> {
        let mut conn = self.conn()?;

        let row: Option<NotificationStatusRow> = notification_statuses::table
            .filter(notification_statuses::job_id.eq(job_id))
            .select(NotificationStatusRow::as_select())
            .first(&mut conn)
            .optional()
            .wrap_err("failed to get notification status")?;

        row.map(NotificationStatusRow::into_status).transpose()
    }
}
