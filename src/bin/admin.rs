//! CLI administration tool for url-shorten.
//!
//! Operates directly on the database, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create the database and schema
//! cargo run --bin admin -- db init
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # View record counts
//! cargo run --bin admin -- stats
//!
//! # Inspect one mapping
//! cargo run --bin admin -- lookup url.shorten/a9b9f04336ce0181a08e774e01113b31
//! ```
//!
//! # Environment Variables
//!
//! Uses the same database settings as the server (`DATABASE_URL` or `DB_*`).

use url_shorten::config::{Config, StorageBackend};
use url_shorten::domain::repositories::UrlRepository;
use url_shorten::infrastructure::database;
use url_shorten::infrastructure::persistence::PgUrlRepository;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing url-shorten.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show record counts
    Stats,

    /// Show the record behind a short URL
    Lookup {
        /// Short URL, e.g. url.shorten/<digest>
        short_url: String,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
    /// Show database info
    Info,
    /// Create the database if missing and apply migrations
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    config.validate().context("Invalid configuration")?;
    if config.storage_backend == StorageBackend::Memory {
        anyhow::bail!("The admin tool only works with the postgres backend");
    }
    config.db_max_connections = 1;

    match cli.command {
        Commands::Stats => handle_stats(&database::create_pool(&config).await?).await?,
        Commands::Lookup { short_url } => {
            handle_lookup(database::create_pool(&config).await?, &short_url).await?
        }
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

/// Creates the database and schema the same way the server does on startup.
async fn init_database(config: &Config) -> Result<()> {
    println!("{}", "🛠  Initializing database...".bright_blue());

    database::connect(config).await?;

    println!("{}", "✅ Database ready".green().bold());
    Ok(())
}

/// Displays record counts.
///
/// Shows:
/// - Total number of records
/// - Records still within their expiry window
/// - Expired records
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
        .fetch_one(pool)
        .await?;

    let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE expiry_time >= NOW()")
        .fetch_one(pool)
        .await?;

    println!("  Records: {}", total.to_string().bright_green().bold());
    println!("  Active:  {}", active.to_string().bright_green().bold());
    println!(
        "  Expired: {}",
        (total - active).to_string().bright_yellow().bold()
    );
    println!();

    Ok(())
}

/// Prints one record and whether it is still valid.
async fn handle_lookup(pool: PgPool, short_url: &str) -> Result<()> {
    let repo = PgUrlRepository::new(Arc::new(pool));

    let record = repo
        .find_by_short_url(short_url)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Short URL not found")?;

    let state = if record.is_expired_at(Utc::now()) {
        "EXPIRED".red()
    } else {
        "ACTIVE".green()
    };

    println!("{}", "🔗 Mapping".bright_blue().bold());
    println!();
    println!("  Short URL: {}", record.short_url.cyan());
    println!("  Long URL:  {}", record.long_url.bright_white());
    println!("  Expires:   {} ({})", record.expiry_time, state);
    println!("  Created:   {}", record.created_at);
    println!("  Updated:   {}", record.updated_at);
    println!();

    Ok(())
}

/// Handles database commands.
async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Init => init_database(config).await?,
        DbAction::Check => {
            let pool = database::create_pool(config).await?;
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            let pool = &database::create_pool(config).await?;
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let table_size: Option<String> = sqlx::query_scalar(
                "SELECT pg_size_pretty(pg_total_relation_size(to_regclass('urls')))",
            )
            .fetch_one(pool)
            .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  urls table: {}",
                table_size
                    .unwrap_or_else(|| "missing (run `admin db init`)".to_string())
                    .bright_white()
            );
            println!();
        }
    }

    Ok(())
}
