//! Postgres storage

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::mappings::UrlMapping;

use super::CreateMappingValues;
use super::Error;
use super::Result;
use super::Storage;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Migrations will be run
    ///
    /// # Errors
    ///
    /// Will return `Err` when no connection can be made or the migrations fail
    pub async fn new(database_connection_string: &str) -> anyhow::Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_connection_string)
            .await?;

        MIGRATOR.run(&connection_pool).await?;

        tracing::info!("Connected to Postgres, migrations done");

        Ok(Self { connection_pool })
    }
}

impl Storage for Postgres {
    async fn put(&self, values: &CreateMappingValues<'_>) -> Result<UrlMapping> {
        // the unique constraint decides, a conflict returns no row
        let mapping = sqlx::query_as::<_, UrlMapping>(
            r"
            INSERT INTO urls (short_code, long_url, expiry_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (short_code) DO NOTHING
            RETURNING *
            ",
        )
        .bind(values.short_code)
        .bind(values.long_url)
        .bind(values.expiry_at.copied())
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        mapping.ok_or(Error::AlreadyExists)
    }

    async fn get(&self, short_code: &str) -> Result<Option<UrlMapping>> {
        let mapping = sqlx::query_as::<_, UrlMapping>(
            r"
            SELECT *
            FROM urls
            WHERE short_code = $1
            LIMIT 1
            ",
        )
        .bind(short_code)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(mapping)
    }

    async fn delete(&self, short_code: &str) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM urls
            WHERE short_code = $1
            ",
        )
        .bind(short_code)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<UrlMapping>> {
        let mappings = sqlx::query_as::<_, UrlMapping>(
            r"
            SELECT *
            FROM urls
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(mappings)
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM urls
            WHERE expiry_at IS NOT NULL AND expiry_at <= $1
            ",
        )
        .bind(now)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected())
    }

    async fn record_hit(&self, short_code: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r"
            UPDATE urls
            SET click_count = click_count + 1, last_clicked_at = $1
            WHERE short_code = $2
            ",
        )
        .bind(at)
        .bind(short_code)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }
}

/// Shorthand for mapping any error to a connection error
#[allow(clippy::needless_pass_by_value)]
fn connection_error(err: sqlx::Error) -> Error {
    Error::Connection(err.to_string())
}
