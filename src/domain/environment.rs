//! Runtime environment selector and database lifecycle states.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
    Test,
}

impl Environment {
    /// Name of the variable that selects the environment.
    pub const VAR: &'static str = "BOT_ENV";

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Test => "test",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" => Some(Self::Production),
            "development" => Some(Self::Development),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Production, Self::Development, Self::Test]
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the application currently holds an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    Unloaded,
    Loaded,
}

impl DatabaseState {
    /// `reload` is unload followed by load, so it is not a separate edge here.
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Unloaded, Self::Loaded) | (Self::Loaded, Self::Unloaded)
        )
    }
}
