//! Baseline trigger rows for fresh development and test databases.

use crate::app::{trigger_add_word, trigger_create, TriggerCreateReq};
use crate::application::Application;
use crate::error::AppError;
use crate::infra::Session;

pub const LINUS_TRIGGER_WORDS: [&str; 5] = [
    "linus",
    "#linus",
    "#torvalds",
    "#linustorvalds",
    "torvalds",
];

/// Insert the two baseline triggers. Not idempotent: a second run hits the
/// unique name index and returns `Conflict`.
pub fn seed_database(session: &Session) -> Result<(), AppError> {
    let linus = trigger_create(
        session,
        TriggerCreateReq {
            name: "Linus".to_string(),
            positive_emoji_code: ":penguin:".to_string(),
            negative_emoji_code: ":pouting_face:".to_string(),
        },
    )?;

    for word in LINUS_TRIGGER_WORDS {
        trigger_add_word(session, &linus.id, word)?;
    }

    trigger_create(
        session,
        TriggerCreateReq {
            name: "Grace".to_string(),
            positive_emoji_code: ":blush:".to_string(),
            negative_emoji_code: ":cry:".to_string(),
        },
    )?;

    log::info!("Seeded baseline triggers");
    Ok(())
}

/// Create any missing tables, then seed through the application's shared session.
pub fn seed_application(app: &mut Application) -> Result<(), AppError> {
    app.create_tables()?;
    let session = app.session()?;
    seed_database(&session)
}
