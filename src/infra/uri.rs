//! `sqlite://` connection strings.

use crate::error::AppError;
use std::fmt;
use std::path::PathBuf;

/// Parsed database location.
///
/// Accepted forms:
/// - `sqlite://` or `sqlite:///:memory:`: private in-memory database
/// - `sqlite:///relative/path.db`
/// - `sqlite:////absolute/path.db`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUri {
    Memory,
    File(PathBuf),
}

impl DatabaseUri {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        let rest = raw.strip_prefix("sqlite://").ok_or_else(|| {
            AppError::Config(format!("unsupported database uri (expected sqlite://): {}", raw))
        })?;
        if rest.is_empty() {
            return Ok(Self::Memory);
        }
        let path = rest.strip_prefix('/').ok_or_else(|| {
            AppError::Config(format!("database uri has a host part, use sqlite:///path: {}", raw))
        })?;
        match path {
            "" | ":memory:" => Ok(Self::Memory),
            p => Ok(Self::File(PathBuf::from(p))),
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl fmt::Display for DatabaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("sqlite://"),
            Self::File(p) => write!(f, "sqlite:///{}", p.display()),
        }
    }
}
