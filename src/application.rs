//! Application bootstrap: configuration, database engine and the shared session.
//!
//! An `Application` is created once at startup and handed to everything that
//! needs persistence. It is loaded on construction; the session is built lazily
//! on first access and then reused until the database is unloaded.
//!
//! ```ignore
//! let mut app = Application::from_env()?;
//! let session = app.session()?;
//! ```
//!
//! The session handle is an `Rc`, so an `Application` stays on the thread that
//! created it.

use crate::config::{Config, TOKEN_KEY};
use crate::domain::{DatabaseState, Environment};
use crate::error::AppError;
use crate::infra::{self, db, DatabaseUri, Engine, Session};
use std::rc::Rc;

pub struct Application {
    config: Config,
    token: Option<String>,
    engine: Option<Engine>,
    session: Option<Rc<Session>>,
}

impl Application {
    /// Read the token and load the database. Fails if the connection check fails.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let token = config.get(TOKEN_KEY).map(str::to_string);
        if token.is_none() {
            log::warn!("{} is not set", TOKEN_KEY);
        }
        let mut app = Application {
            config,
            token,
            engine: None,
            session: None,
        };
        app.load_database()?;
        Ok(app)
    }

    /// Configuration from the process environment (`BOT_ENV` and friends).
    pub fn from_env() -> Result<Self, AppError> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.config.environment()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    pub fn state(&self) -> DatabaseState {
        if self.engine.is_some() {
            DatabaseState::Loaded
        } else {
            DatabaseState::Unloaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state() == DatabaseState::Loaded
    }

    /// The shared session, created on first call. An unloaded database is
    /// loaded first, so the session is never bound to a stale engine.
    pub fn session(&mut self) -> Result<Rc<Session>, AppError> {
        if let Some(session) = &self.session {
            return Ok(Rc::clone(session));
        }
        if self.engine.is_none() {
            self.load_database()?;
        }
        let engine = self.loaded_engine()?;
        let session = Rc::new(engine.session()?);
        log::debug!("Opened session {}", session.id());
        self.session = Some(Rc::clone(&session));
        Ok(session)
    }

    /// Build an engine from the configured URI and check that it connects.
    ///
    /// Loading an already loaded database unloads it first. A file database
    /// whose directory does not exist fails with `CONNECTION_ERROR`; run
    /// `create_database` to create it.
    pub fn load_database(&mut self) -> Result<(), AppError> {
        if !DatabaseState::can_transition(self.state(), DatabaseState::Loaded) {
            self.unload_database();
        }
        let uri = DatabaseUri::parse(self.config.database_uri())?;
        let engine = Engine::new(uri, self.config.echo()).and_then(|engine| {
            engine.ping()?;
            Ok(engine)
        });
        let engine = match engine {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Unable to create the 'Application': {}", e);
                return Err(AppError::Connection(e.to_string()));
            }
        };

        log::info!(
            "Database loaded ({} environment): {}",
            self.config.environment(),
            engine.uri()
        );
        self.engine = Some(engine);
        Ok(())
    }

    /// Drop the engine and the shared session. A no-op when already unloaded.
    pub fn unload_database(&mut self) {
        if !DatabaseState::can_transition(self.state(), DatabaseState::Unloaded) {
            return;
        }
        self.session = None;
        self.engine = None;
        log::info!("Database unloaded");
    }

    pub fn reload_database(&mut self) -> Result<(), AppError> {
        self.unload_database();
        self.load_database()
    }

    /// Select another environment and reload against its profile.
    pub fn switch_environment(&mut self, environment: Environment) -> Result<(), AppError> {
        self.config.set_environment(environment)?;
        self.reload_database()
    }

    fn uri(&self) -> Result<DatabaseUri, AppError> {
        DatabaseUri::parse(self.config.database_uri())
    }

    pub fn database_exists(&self) -> Result<bool, AppError> {
        infra::database_exists(&self.uri()?)
    }

    /// Create the configured database unless it already exists.
    pub fn create_database(&self) -> Result<(), AppError> {
        infra::ensure_database(&self.uri()?)?;
        Ok(())
    }

    /// Drop the configured database.
    ///
    /// The guard acts only when the database does NOT exist, mirroring
    /// `create_database`. An existing database is left in place; an absent file
    /// database makes the removal fail with `IO_ERROR`; an empty file left by a
    /// bare connect is removed.
    pub fn drop_database(&self) -> Result<(), AppError> {
        let uri = self.uri()?;
        if !infra::database_exists(&uri)? {
            infra::drop_database(&uri)?;
        }
        Ok(())
    }

    pub fn create_tables(&self) -> Result<(), AppError> {
        let mut conn = self.loaded_engine()?.connect()?;
        db::create_all(&mut conn)
    }

    pub fn drop_tables(&self) -> Result<(), AppError> {
        let mut conn = self.loaded_engine()?.connect()?;
        db::drop_all(&mut conn)
    }

    fn loaded_engine(&self) -> Result<&Engine, AppError> {
        self.engine
            .as_ref()
            .ok_or_else(|| AppError::Db("database is not loaded".into()))
    }
}

/// Loaded test-environment application with all tables created.
pub fn init_test_app() -> Application {
    let app = Application::new(Config::for_environment(Environment::Test))
        .expect("test application");
    app.create_tables().expect("test tables");
    app
}
