//! PostgreSQL bootstrap: database creation, connection pool and migrations.

use anyhow::{Context, Result};
use sqlx::migrate::MigrateDatabase;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::PgPool;
use std::time::Duration;

use crate::config::Config;

/// Creates the database named in `database_url` if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the server is unreachable or the role lacks `CREATEDB`.
pub async fn ensure_database(database_url: &str) -> Result<()> {
    let exists = Postgres::database_exists(database_url)
        .await
        .context("Failed to check whether the database exists")?;

    if !exists {
        tracing::info!("Database does not exist, creating it");
        Postgres::create_database(database_url)
            .await
            .context("Failed to create the database")?;
    }

    Ok(())
}

/// Opens a connection pool using the pool settings from `config`.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing or the connection fails.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for the postgres backend")?;

    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Applies the embedded migrations from `./migrations`.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")
}

/// Creates the database if needed, connects, and brings the schema up to date.
///
/// # Errors
///
/// See [`ensure_database`], [`create_pool`] and [`run_migrations`].
pub async fn connect(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set for the postgres backend")?;

    ensure_database(database_url).await?;

    let pool = create_pool(config).await?;
    tracing::info!("Connected to database");

    run_migrations(&pool).await?;
    tracing::info!("Database schema is up to date");

    Ok(pool)
}
