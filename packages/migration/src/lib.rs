pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};

mod m20211228_000001_init; // keep filename + module name in sync

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20211228_000001_init::Migration)]
    }
}

/// Apply every pending migration, logging applied counts before and after.
/// Used by the stream service on boot and by tests against SQLite in-memory.
pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = format!("{:?}", db.get_database_backend());
    let defined = Migrator::migrations().len();
    let before = count_applied_migrations(db).await.unwrap_or(0);

    tracing::info!(
        backend = %backend,
        defined,
        applied = before,
        "migrate=start"
    );

    match Migrator::up(db, None).await {
        Ok(()) => {
            let after = count_applied_migrations(db).await.unwrap_or(0);
            tracing::info!(backend = %backend, applied = after, "migrate=ok");
            Ok(())
        }
        Err(e) => {
            tracing::error!(backend = %backend, error = %e, "migrate=failed");
            Err(e)
        }
    }
}

/// Count the number of migrations that have been applied to the database.
/// Returns 0 if the migration table doesn't exist yet.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(migrations) => Ok(migrations.len()),
        Err(DbErr::Exec(_)) => Ok(0), // Migration table doesn't exist yet
        Err(e) => Err(e),
    }
}
