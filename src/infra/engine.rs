//! Engine (connection factory) and Session (unit of work).

use crate::error::AppError;
use crate::infra::uri::DatabaseUri;
use rusqlite::{Connection, OpenFlags, Transaction};
use uuid::Uuid;

/// Configured handle to one database, independent of any session.
///
/// In-memory databases are opened as a uniquely named shared-cache database and
/// kept alive by an anchor connection, so every connection of one engine sees
/// the same data and dropping the engine discards it.
pub struct Engine {
    uri: DatabaseUri,
    echo: bool,
    memory: Option<MemoryDb>,
}

struct MemoryDb {
    name: String,
    _anchor: Connection,
}

impl Engine {
    pub fn new(uri: DatabaseUri, echo: bool) -> Result<Self, AppError> {
        let memory = if uri.is_memory() {
            let name = format!(
                "file:triggerbot-{}?mode=memory&cache=shared",
                Uuid::new_v4().simple()
            );
            let anchor = Connection::open_with_flags(&name, memory_flags())?;
            Some(MemoryDb {
                name,
                _anchor: anchor,
            })
        } else {
            None
        };
        Ok(Engine { uri, echo, memory })
    }

    pub fn uri(&self) -> &DatabaseUri {
        &self.uri
    }

    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Open a new connection. A file database whose directory is missing fails
    /// to open; only `create_database` creates directories.
    pub fn connect(&self) -> Result<Connection, AppError> {
        let mut conn = match (&self.memory, &self.uri) {
            (Some(mem), _) => Connection::open_with_flags(&mem.name, memory_flags())?,
            (None, DatabaseUri::File(path)) => Connection::open(path)?,
            (None, DatabaseUri::Memory) => {
                return Err(AppError::Db("in-memory engine lost its database".into()))
            }
        };
        conn.pragma_update(None, "foreign_keys", true)?;
        if self.echo {
            conn.trace(Some(echo_statement));
        }
        Ok(conn)
    }

    /// Open a connection and run a trivial query against it.
    pub fn ping(&self) -> Result<(), AppError> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    }

    pub fn session(&self) -> Result<Session, AppError> {
        Ok(Session {
            id: Uuid::new_v4(),
            conn: self.connect()?,
        })
    }
}

fn memory_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

fn echo_statement(sql: &str) {
    log::info!(target: "triggerbot::sql", "{}", sql);
}

/// Unit of work bound to the engine that created it.
pub struct Session {
    id: Uuid,
    conn: Connection,
}

impl Session {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction; it rolls back unless committed.
    pub fn transaction(&self) -> Result<Transaction<'_>, AppError> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}
