//! Environment-selected configuration tests

use triggerbot::domain::Environment;
use triggerbot::Config;

// ──────────────────────── Helper ────────────────────────

fn config_for(env: &str) -> Config {
    Config::from_vars([("BOT_ENV", env)]).unwrap()
}

// ══════════════════════════════════════════════════════════
//  profile selection
// ══════════════════════════════════════════════════════════

#[test]
fn each_environment_selects_its_own_profile() {
    for env in Environment::all() {
        let config = config_for(env.as_str());
        assert_eq!(config.environment(), *env);
        assert_eq!(config.profile(), &triggerbot::config::Profile::builtin(*env));
    }
}

#[test]
fn development_profile_echoes_sql() {
    let config = config_for("development");
    assert_eq!(config.database_uri(), "sqlite:///db/development.db");
    assert!(config.echo());
}

#[test]
fn test_profile_is_in_memory() {
    let config = config_for("test");
    assert_eq!(config.database_uri(), "sqlite://");
    assert!(!config.echo());
}

#[test]
fn missing_bot_env_defaults_to_production() {
    let config = Config::from_vars(Vec::<(String, String)>::new()).unwrap();
    assert_eq!(config.environment(), Environment::Production);
}

#[test]
fn unknown_bot_env_is_a_config_error() {
    let err = Config::from_vars([("BOT_ENV", "staging")]).unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

// ══════════════════════════════════════════════════════════
//  overrides
// ══════════════════════════════════════════════════════════

#[test]
fn database_vars_override_profile() {
    let config = Config::from_vars([
        ("BOT_ENV", "test"),
        ("DATABASE_URI", "sqlite:///tmp/override.db"),
        ("DATABASE_ECHO", "yes"),
    ])
    .unwrap();
    assert_eq!(config.database_uri(), "sqlite:///tmp/override.db");
    assert!(config.echo());
}

#[test]
fn bad_echo_value_fails() {
    let err = Config::from_vars([("BOT_ENV", "test"), ("DATABASE_ECHO", "loud")]).unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[test]
fn toml_file_overrides_builtin_but_not_vars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.toml");
    std::fs::write(
        &path,
        "[development]\ndatabase_uri = \"sqlite:///file.db\"\necho = false\n\n[test]\necho = true\n",
    )
    .unwrap();
    let path = path.to_string_lossy().to_string();

    let dev = Config::from_vars([("BOT_ENV", "development"), ("BOT_CONFIG", path.as_str())]).unwrap();
    assert_eq!(dev.database_uri(), "sqlite:///file.db");
    assert!(!dev.echo());

    let test = Config::from_vars([
        ("BOT_ENV", "test"),
        ("BOT_CONFIG", path.as_str()),
        ("DATABASE_ECHO", "0"),
    ])
    .unwrap();
    assert_eq!(test.database_uri(), "sqlite://");
    assert!(!test.echo());
}

#[test]
fn missing_config_file_fails() {
    let err = Config::from_vars([("BOT_CONFIG", "/definitely/not/here.toml")]).unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[test]
fn with_toml_applies_to_current_environment() {
    let config = Config::for_environment(Environment::Test)
        .with_toml("[test]\ndatabase_uri = \"sqlite:///:memory:\"\n")
        .unwrap();
    assert_eq!(config.database_uri(), "sqlite:///:memory:");
}

// ══════════════════════════════════════════════════════════
//  settings and switching
// ══════════════════════════════════════════════════════════

#[test]
fn get_reads_snapshot() {
    let config = Config::from_vars([("BOT_ENV", "test"), ("DISCORD_TOKEN", "abc")]).unwrap();
    assert_eq!(config.get("DISCORD_TOKEN"), Some("abc"));
    assert_eq!(config.get("NOPE"), None);
}

#[test]
fn set_environment_keeps_var_overrides() {
    let mut config = Config::from_vars([("BOT_ENV", "test"), ("DATABASE_ECHO", "true")]).unwrap();
    config.set_environment(Environment::Development).unwrap();
    assert_eq!(config.environment(), Environment::Development);
    assert_eq!(config.database_uri(), "sqlite:///db/development.db");
    assert!(config.echo());
}

#[test]
fn with_var_bot_env_reselects_environment() {
    let config = Config::for_environment(Environment::Test)
        .with_var("BOT_ENV", "development")
        .unwrap();
    assert_eq!(config.environment(), Environment::Development);
    assert_eq!(config.get("BOT_ENV"), Some("development"));
    assert_eq!(config.database_uri(), "sqlite:///db/development.db");
}

#[test]
fn with_var_bad_bot_env_fails() {
    let err = Config::for_environment(Environment::Test)
        .with_var("BOT_ENV", "staging")
        .unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[test]
fn set_environment_updates_bot_env_setting() {
    let mut config = config_for("production");
    config.set_environment(Environment::Test).unwrap();
    assert_eq!(config.get("BOT_ENV"), Some("test"));
}
