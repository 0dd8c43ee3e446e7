//! Schema registry, migrations and database create/drop primitives.

use crate::error::AppError;
use crate::infra::uri::DatabaseUri;
use rusqlite::Connection;
use std::fs::File;
use std::io::{ErrorKind, Read};

/// Bookkeeping table for applied migration versions.
pub const MIGRATIONS_TABLE: &str = "schema_migrations";

/// Tables owned by the migrations, in creation order.
pub const TABLES: &[&str] = &["triggers", "trigger_words"];

const MIGRATIONS: &[(i32, &str)] = &[(1, include_str!("../../migrations/0001_init.sql"))];

const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// A valid SQLite file is never shorter than its 100-byte database header.
const MIN_DATABASE_LEN: u64 = 100;

/// Apply every pending migration in one transaction. Safe to call repeatedly.
pub fn create_all(conn: &mut Connection) -> Result<(), AppError> {
    let tx = conn.transaction()?;

    // Ensure schema_migrations exists (first run)
    tx.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL DEFAULT (datetime('now')))",
        [],
    )?;

    let applied: Vec<i32> = tx
        .prepare("SELECT version FROM schema_migrations ORDER BY version")?
        .query_map([], |r| r.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for (version, sql) in MIGRATIONS {
        if applied.contains(version) {
            continue;
        }
        // Version rows are written here, not by the scripts
        let statements = sql
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && !s.contains("INSERT INTO schema_migrations"));
        for stmt in statements {
            tx.execute(stmt, [])?;
        }
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
            [version],
        )?;
        log::info!("Applied migration {}", version);
    }

    tx.commit()?;
    Ok(())
}

/// Drop every registered table, children first, then the migration log.
pub fn drop_all(conn: &mut Connection) -> Result<(), AppError> {
    let tx = conn.transaction()?;
    for table in TABLES.iter().rev().chain(std::iter::once(&MIGRATIONS_TABLE)) {
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table), [])?;
    }
    tx.commit()?;
    Ok(())
}

/// User tables currently present, sorted by name.
pub fn table_names(conn: &Connection) -> Result<Vec<String>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

/// A file database exists once it is at least 100 bytes long and starts with the
/// SQLite magic string; an empty file left behind by a bare connect does not
/// count. In-memory databases always exist.
pub fn database_exists(uri: &DatabaseUri) -> Result<bool, AppError> {
    let path = match uri {
        DatabaseUri::Memory => return Ok(true),
        DatabaseUri::File(path) => path,
    };
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let meta = file.metadata()?;
    if !meta.is_file() || meta.len() < MIN_DATABASE_LEN {
        return Ok(false);
    }
    let mut header = [0u8; 16];
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header == SQLITE_HEADER),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Materialise the database file by forcing a write.
pub fn create_database(uri: &DatabaseUri) -> Result<(), AppError> {
    let path = match uri {
        DatabaseUri::Memory => return Ok(()),
        DatabaseUri::File(path) => path,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("CREATE TABLE _create_marker (id INTEGER); DROP TABLE _create_marker;")?;
    log::info!("Created database {}", uri);
    Ok(())
}

/// Create the database unless it already exists. Returns whether it was created.
pub fn ensure_database(uri: &DatabaseUri) -> Result<bool, AppError> {
    if database_exists(uri)? {
        return Ok(false);
    }
    create_database(uri)?;
    Ok(true)
}

/// Remove the database file. Fails with an I/O error when it is already gone.
pub fn drop_database(uri: &DatabaseUri) -> Result<(), AppError> {
    if let DatabaseUri::File(path) = uri {
        std::fs::remove_file(path)?;
        log::info!("Dropped database {}", uri);
    }
    Ok(())
}
