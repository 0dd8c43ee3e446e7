//! Environment-selected configuration.
//!
//! Resolution order for the active profile: built-in defaults, then the TOML file
//! named by `BOT_CONFIG` (one table per environment), then `DATABASE_URI` /
//! `DATABASE_ECHO`. The variable snapshot is taken once; switching environment
//! re-resolves against that same snapshot.

use crate::domain::Environment;
use crate::error::AppError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_VAR: &str = "BOT_CONFIG";
pub const DATABASE_URI_VAR: &str = "DATABASE_URI";
pub const DATABASE_ECHO_VAR: &str = "DATABASE_ECHO";
pub const TOKEN_KEY: &str = "DISCORD_TOKEN";

/// Database settings for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub database_uri: String,
    /// Log every SQL statement issued through the engine.
    pub echo: bool,
}

impl Profile {
    pub fn builtin(env: Environment) -> Self {
        match env {
            Environment::Production => Profile {
                database_uri: format!("sqlite:///{}", default_production_db().display()),
                echo: false,
            },
            Environment::Development => Profile {
                database_uri: "sqlite:///db/development.db".to_string(),
                echo: true,
            },
            Environment::Test => Profile {
                database_uri: "sqlite://".to_string(),
                echo: false,
            },
        }
    }
}

fn default_production_db() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("triggerbot").join("production.db")
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileOverride {
    database_uri: Option<String>,
    echo: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    production: ProfileOverride,
    #[serde(default)]
    development: ProfileOverride,
    #[serde(default)]
    test: ProfileOverride,
}

impl ConfigFile {
    fn for_env(&self, env: Environment) -> &ProfileOverride {
        match env {
            Environment::Production => &self.production,
            Environment::Development => &self.development,
            Environment::Test => &self.test,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    environment: Environment,
    profile: Profile,
    file: ConfigFile,
    vars: HashMap<String, String>,
}

impl Config {
    /// Snapshot the process environment and resolve the selected profile.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(std::env::vars())
    }

    /// Resolve from an explicit variable map instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> =
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();

        let environment = select_environment(&vars)?;

        let file = match vars.get(CONFIG_FILE_VAR) {
            Some(path) if !path.trim().is_empty() => load_file(Path::new(path))?,
            _ => ConfigFile::default(),
        };

        let profile = resolve_profile(environment, &file, &vars)?;
        Ok(Config {
            environment,
            profile,
            file,
            vars,
        })
    }

    /// Built-in profile for `env` with no variables set.
    pub fn for_environment(environment: Environment) -> Self {
        Config {
            environment,
            profile: Profile::builtin(environment),
            file: ConfigFile::default(),
            vars: HashMap::new(),
        }
    }

    /// Parse TOML profile overrides on top of the current settings.
    pub fn with_toml(mut self, text: &str) -> Result<Self, AppError> {
        self.file = parse_file(text)?;
        self.profile = resolve_profile(self.environment, &self.file, &self.vars)?;
        Ok(self)
    }

    /// Add or replace one setting, re-resolving the profile. Setting `BOT_ENV`
    /// re-selects the environment.
    pub fn with_var(mut self, key: &str, value: &str) -> Result<Self, AppError> {
        self.vars.insert(key.to_string(), value.to_string());
        if key == Environment::VAR {
            self.environment = select_environment(&self.vars)?;
        }
        self.profile = resolve_profile(self.environment, &self.file, &self.vars)?;
        Ok(self)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn database_uri(&self) -> &str {
        &self.profile.database_uri
    }

    pub fn echo(&self) -> bool {
        self.profile.echo
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Select another environment. Callers holding a loaded database must reload.
    pub fn set_environment(&mut self, environment: Environment) -> Result<(), AppError> {
        self.profile = resolve_profile(environment, &self.file, &self.vars)?;
        self.environment = environment;
        self.vars
            .insert(Environment::VAR.to_string(), environment.as_str().to_string());
        Ok(())
    }
}

fn select_environment(vars: &HashMap<String, String>) -> Result<Environment, AppError> {
    match vars.get(Environment::VAR) {
        Some(raw) if !raw.trim().is_empty() => Environment::from_str(raw).ok_or_else(|| {
            AppError::Config(format!(
                "{} must be one of production, development, test (got {:?})",
                Environment::VAR,
                raw
            ))
        }),
        _ => Ok(Environment::default()),
    }
}

fn load_file(path: &Path) -> Result<ConfigFile, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_file(&text)
}

fn parse_file(text: &str) -> Result<ConfigFile, AppError> {
    toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
}

fn resolve_profile(
    env: Environment,
    file: &ConfigFile,
    vars: &HashMap<String, String>,
) -> Result<Profile, AppError> {
    let mut profile = Profile::builtin(env);

    let over = file.for_env(env);
    if let Some(uri) = &over.database_uri {
        profile.database_uri = uri.clone();
    }
    if let Some(echo) = over.echo {
        profile.echo = echo;
    }

    if let Some(uri) = vars.get(DATABASE_URI_VAR).filter(|s| !s.trim().is_empty()) {
        profile.database_uri = uri.trim().to_string();
    }
    if let Some(raw) = vars.get(DATABASE_ECHO_VAR) {
        profile.echo = parse_bool(raw).ok_or_else(|| {
            AppError::Config(format!("{} is not a boolean: {:?}", DATABASE_ECHO_VAR, raw))
        })?;
    }

    Ok(profile)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
