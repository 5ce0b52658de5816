use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub mod api;
pub mod config;
pub mod models;
pub mod schema;
pub mod seed;
pub mod store;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas. SQLite only enforces `ON DELETE CASCADE` when
/// foreign keys are switched on for the connection. The busy timeout comes
/// first so that switching the journal mode waits on other connections.
#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

/// Every SQLite connection to an in-memory database gets a private one.
pub fn is_in_memory(database_url: &str) -> bool {
    database_url == ":memory:"
        || database_url.starts_with("file::memory:")
        || database_url.contains("mode=memory")
}

/// Builds the connection pool. An in-memory database is served by a single
/// connection that is never recycled, otherwise its contents would vanish
/// or differ between requests.
pub fn establish_pool(database_url: &str, max_size: u32) -> Result<DbPool, r2d2::PoolError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = Pool::builder().connection_customizer(Box::new(ConnectionOptions {
        busy_timeout_ms: 5000,
    }));

    let builder = if is_in_memory(database_url) {
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(max_size)
    };

    builder.build(manager)
}

/// Applies every embedded migration that has not run yet and returns how
/// many were applied.
pub fn run_migrations(
    conn: &mut SqliteConnection,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    use super::*;
    use crate::schema::restaurants;

    #[test]
    fn test_in_memory_pool_shares_one_database() {
        let pool = establish_pool(":memory:", 8).unwrap();
        assert_eq!(pool.max_size(), 1);

        {
            let conn = &mut pool.get().unwrap();
            assert_eq!(run_migrations(conn).unwrap(), 1);
        }

        for _ in 0..3 {
            let conn = &mut pool.get().unwrap();
            let count: i64 = restaurants::table.count().get_result(&mut **conn).unwrap();
            assert_eq!(count, 0);
        }
    }

    #[test]
    fn test_file_pool_uses_configured_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let pool = establish_pool(path.to_str().unwrap(), 3).unwrap();
        assert_eq!(pool.max_size(), 3);
    }

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory(":memory:"));
        assert!(is_in_memory("file::memory:?cache=shared"));
        assert!(is_in_memory("file:pizzas?mode=memory&cache=shared"));
        assert!(!is_in_memory("app.db"));
        assert!(!is_in_memory("/var/lib/pizza/app.db"));
    }
}
