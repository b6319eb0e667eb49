use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::migration::Migrator;

pub type OrmConn = DatabaseConnection;

/// Create a SeaORM connection pool.
///
/// SQLite pools are capped at one connection: two deferred transactions that
/// both read before writing fail the lock upgrade with `SQLITE_BUSY`, so writers
/// queue on the pool instead.
pub async fn create_orm_conn(database_url: &str, max_connections: u32) -> Result<OrmConn> {
    let max_connections = if is_sqlite_url(database_url) {
        if max_connections > 1 {
            tracing::debug!(requested = max_connections, "sqlite pool capped at one connection");
        }
        1
    } else {
        max_connections.max(1)
    };

    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

fn is_sqlite_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite:")
}

/// Bring the schema up to date. Safe to call on every start.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
