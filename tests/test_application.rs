//! Application lifecycle tests: load, session reuse, unload, reload

use std::rc::Rc;
use triggerbot::app::{trigger_create, trigger_list, TriggerCreateReq};
use triggerbot::domain::{DatabaseState, Environment};
use triggerbot::{init_test_app, Application, Config};

// ──────────────────────── Helper ────────────────────────

fn test_config() -> Config {
    Config::for_environment(Environment::Test)
}

fn make_req(name: &str) -> TriggerCreateReq {
    TriggerCreateReq {
        name: name.to_string(),
        positive_emoji_code: ":+1:".to_string(),
        negative_emoji_code: ":-1:".to_string(),
    }
}

// ══════════════════════════════════════════════════════════
//  initialize
// ══════════════════════════════════════════════════════════

#[test]
fn new_application_is_loaded() {
    let app = Application::new(test_config()).unwrap();
    assert!(app.is_loaded());
    assert_eq!(app.state(), DatabaseState::Loaded);
    assert_eq!(app.environment(), Environment::Test);
}

#[test]
fn token_is_read_from_config() {
    let config = test_config().with_var("DISCORD_TOKEN", "secret").unwrap();
    let app = Application::new(config).unwrap();
    assert_eq!(app.token(), Some("secret"));
}

#[test]
fn missing_token_is_none() {
    let app = Application::new(test_config()).unwrap();
    assert_eq!(app.token(), None);
}

#[test]
fn unreachable_database_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"x").unwrap();
    let uri = format!("sqlite:///{}", blocker.join("bot.db").display());

    let config = test_config().with_var("DATABASE_URI", &uri).unwrap();
    let err = Application::new(config).err().unwrap();
    assert_eq!(err.code(), "CONNECTION_ERROR");
}

#[test]
fn missing_database_directory_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db").join("development.db");
    let uri = format!("sqlite:///{}", path.display());

    let config = test_config().with_var("DATABASE_URI", &uri).unwrap();
    let err = Application::new(config).err().unwrap();
    assert_eq!(err.code(), "CONNECTION_ERROR");
    assert!(!path.parent().unwrap().exists());
}

#[test]
fn unsupported_scheme_is_a_config_error() {
    let config = test_config()
        .with_var("DATABASE_URI", "postgresql://localhost/bot")
        .unwrap();
    let err = Application::new(config).err().unwrap();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

// ══════════════════════════════════════════════════════════
//  session
// ══════════════════════════════════════════════════════════

#[test]
fn session_is_reused() {
    let mut app = Application::new(test_config()).unwrap();
    let a = app.session().unwrap();
    let b = app.session().unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(a.id(), b.id());
}

#[test]
fn session_after_unload_is_new_and_bound_to_fresh_engine() {
    let mut app = init_test_app();
    let before = app.session().unwrap();
    trigger_create(&before, make_req("Stale")).unwrap();

    app.unload_database();
    assert!(!app.is_loaded());
    assert!(app.engine().is_none());

    let after = app.session().unwrap();
    assert!(app.is_loaded());
    assert!(!Rc::ptr_eq(&before, &after));
    assert_ne!(before.id(), after.id());

    // Fresh in-memory engine: no tables until created again
    assert!(trigger_list(&after).is_err());
    app.create_tables().unwrap();
    assert!(trigger_list(&after).unwrap().is_empty());
}

#[test]
fn unload_clears_engine_and_session() {
    let mut app = Application::new(test_config()).unwrap();
    app.session().unwrap();
    app.unload_database();
    assert_eq!(app.state(), DatabaseState::Unloaded);
    assert!(app.create_tables().is_err());
}

#[test]
fn unload_twice_is_harmless() {
    let mut app = Application::new(test_config()).unwrap();
    app.unload_database();
    app.unload_database();
    assert_eq!(app.state(), DatabaseState::Unloaded);
}

#[test]
fn load_while_loaded_replaces_engine_and_session() {
    let mut app = init_test_app();
    let before = app.session().unwrap();
    trigger_create(&before, make_req("Old")).unwrap();

    app.load_database().unwrap();
    assert_eq!(app.state(), DatabaseState::Loaded);

    let after = app.session().unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    // The previous in-memory engine and its data are gone
    assert!(trigger_list(&after).is_err());
}

#[test]
fn failed_switch_leaves_application_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let bad = format!("sqlite:///{}", dir.path().join("missing").join("bot.db").display());
    let config = test_config()
        .with_toml(&format!("[development]\ndatabase_uri = \"{}\"\n", bad))
        .unwrap();

    let mut app = Application::new(config).unwrap();
    assert!(app.is_loaded());

    let err = app.switch_environment(Environment::Development).unwrap_err();
    assert_eq!(err.code(), "CONNECTION_ERROR");
    assert_eq!(app.state(), DatabaseState::Unloaded);
}

// ══════════════════════════════════════════════════════════
//  reload / switch
// ══════════════════════════════════════════════════════════

#[test]
fn reload_matches_fresh_load() {
    let mut app = Application::new(test_config()).unwrap();
    let old = app.session().unwrap();
    app.reload_database().unwrap();

    let fresh = Application::new(test_config()).unwrap();
    assert_eq!(app.state(), fresh.state());
    assert_eq!(
        app.engine().unwrap().uri(),
        fresh.engine().unwrap().uri()
    );
    assert_eq!(app.engine().unwrap().echo(), fresh.engine().unwrap().echo());

    let new = app.session().unwrap();
    assert!(!Rc::ptr_eq(&old, &new));
}

#[test]
fn switch_environment_reloads_with_new_profile() {
    let dir = tempfile::tempdir().unwrap();
    let uri = format!("sqlite:///{}", dir.path().join("dev.db").display());
    let config = test_config()
        .with_toml(&format!("[development]\ndatabase_uri = \"{}\"\necho = false\n", uri))
        .unwrap();

    let mut app = Application::new(config).unwrap();
    assert!(app.engine().unwrap().uri().is_memory());

    app.switch_environment(Environment::Development).unwrap();
    assert_eq!(app.environment(), Environment::Development);
    assert_eq!(app.config().database_uri(), uri);
    assert!(!app.engine().unwrap().uri().is_memory());
}

#[test]
fn file_database_persists_across_reload() {
    let dir = tempfile::tempdir().unwrap();
    let uri = format!("sqlite:///{}", dir.path().join("bot.db").display());
    let mut app = Application::new(test_config().with_var("DATABASE_URI", &uri).unwrap()).unwrap();
    app.create_tables().unwrap();
    trigger_create(&app.session().unwrap(), make_req("Kept")).unwrap();

    app.reload_database().unwrap();
    let names: Vec<String> = trigger_list(&app.session().unwrap())
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Kept".to_string()]);
}

// ══════════════════════════════════════════════════════════
//  tables
// ══════════════════════════════════════════════════════════

#[test]
fn create_and_drop_tables() {
    let mut app = init_test_app();
    let session = app.session().unwrap();
    assert!(triggerbot::infra::db::table_names(session.conn())
        .unwrap()
        .contains(&"triggers".to_string()));

    app.drop_tables().unwrap();
    assert!(triggerbot::infra::db::table_names(session.conn())
        .unwrap()
        .is_empty());

    app.create_tables().unwrap();
    app.create_tables().unwrap();
    assert!(trigger_list(&session).unwrap().is_empty());
}
