//! `triggerbot` management CLI: database lifecycle and seeding.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use triggerbot::app::{trigger_list, trigger_words};
use triggerbot::domain::Environment;
use triggerbot::infra::{ensure_database, DatabaseUri};
use triggerbot::seed::seed_application;
use triggerbot::{AppError, Application, Config};

#[derive(Debug, Parser)]
#[command(name = "triggerbot", version, about = "Trigger bot database tooling")]
struct Cli {
    /// Override BOT_ENV (production, development, test)
    #[arg(long, global = true, value_parser = parse_environment)]
    env: Option<Environment>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load the database and report where it lives
    Check,
    /// Database and schema management
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Insert the baseline triggers
    Seed,
    /// Inspect stored triggers
    Triggers {
        #[command(subcommand)]
        action: TriggersAction,
    },
}

#[derive(Debug, Subcommand)]
enum DbAction {
    Create,
    Drop,
    CreateTables,
    DropTables,
    /// Drop and recreate all tables, then seed
    Reset,
}

#[derive(Debug, Subcommand)]
enum TriggersAction {
    List {
        #[arg(long)]
        json: bool,
    },
}

fn parse_environment(s: &str) -> Result<Environment, String> {
    Environment::from_str(s).ok_or_else(|| format!("unknown environment: {}", s))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{} [{}]", e, e.code());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(env) = cli.env {
        config.set_environment(env)?;
    }
    // Loading needs the database directory, so creation runs before it
    if let Command::Db {
        action: DbAction::Create,
    } = cli.command
    {
        let uri = DatabaseUri::parse(config.database_uri())?;
        ensure_database(&uri)?;
        return Ok(());
    }
    let mut app = Application::new(config)?;

    match cli.command {
        Command::Check => {
            println!(
                "{} environment, database {} (exists: {})",
                app.environment(),
                app.config().database_uri(),
                app.database_exists()?
            );
        }
        Command::Db { action } => match action {
            DbAction::Create => app.create_database()?,
            DbAction::Drop => app.drop_database()?,
            DbAction::CreateTables => app.create_tables()?,
            DbAction::DropTables => app.drop_tables()?,
            DbAction::Reset => {
                app.drop_tables()?;
                seed_application(&mut app)?;
            }
        },
        Command::Seed => seed_application(&mut app)?,
        Command::Triggers {
            action: TriggersAction::List { json },
        } => {
            let session = app.session()?;
            let triggers = trigger_list(&session)?;
            if json {
                let out = serde_json::to_string_pretty(&triggers)
                    .map_err(|e| AppError::Db(e.to_string()))?;
                println!("{}", out);
            } else {
                for t in &triggers {
                    let words: Vec<String> = trigger_words(&session, &t.id)?
                        .into_iter()
                        .map(|w| w.word)
                        .collect();
                    println!(
                        "{}\t{}\t{}\t{}",
                        t.name,
                        t.positive_emoji_code,
                        t.negative_emoji_code,
                        words.join(",")
                    );
                }
            }
        }
    }
    Ok(())
}
