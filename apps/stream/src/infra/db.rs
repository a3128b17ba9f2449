use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;

/// Connect using the environment-derived URL for `profile`.
/// This function does NOT run any migrations.
pub async fn connect_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let database_url = db_url(profile)?;

    let mut opt = ConnectOptions::new(database_url);
    opt.min_connections(1)
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let conn = Database::connect(opt).await?;
    Ok(conn)
}

/// Single entrypoint used by the binary: connect, then apply pending migrations.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(profile).await?;
    migration::migrate_up(&conn).await?;
    info!("database ready");
    Ok(conn)
}

/// In-memory SQLite with the schema applied.
///
/// The pool is pinned to one connection: every SQLite memory connection is
/// its own database.
pub async fn connect_in_memory() -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.min_connections(1)
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(2))
        .sqlx_logging(false);

    let conn = Database::connect(opt).await?;
    migration::migrate_up(&conn).await?;
    Ok(conn)
}
