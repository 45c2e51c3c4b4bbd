use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::{db_url, DbKind};
use crate::error::AppError;

/// Connect to the configured database. Does NOT run migrations.
pub async fn connect_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let url = db_url(kind)?;
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10));

    match kind {
        // Each in-memory connection is its own database: pin the pool to a
        // single connection that is never recycled.
        DbKind::SqliteMemory => {
            opts.max_connections(1)
                .min_connections(1)
                .max_lifetime(Duration::from_secs(24 * 60 * 60))
                .idle_timeout(Duration::from_secs(24 * 60 * 60));
        }
        DbKind::SqliteFile => {
            opts.max_connections(1);
        }
        DbKind::Postgres => {
            opts.max_connections(20).min_connections(1);
        }
    }

    let conn = Database::connect(opts).await?;
    info!(?kind, "database connected");
    Ok(conn)
}

/// Connect and bring the schema up to date.
pub async fn bootstrap_db(kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(kind).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    Ok(conn)
}
