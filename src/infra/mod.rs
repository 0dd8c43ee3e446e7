//! Infrastructure: database URIs, engine/session, schema, create/drop.

pub mod db;
pub mod engine;
pub mod uri;

pub use db::{create_database, database_exists, drop_database, ensure_database};
pub use engine::{Engine, Session};
pub use uri::DatabaseUri;

/// Connection behind a session (for use in use cases).
pub(crate) fn get_connection(session: &Session) -> &rusqlite::Connection {
    session.conn()
}
