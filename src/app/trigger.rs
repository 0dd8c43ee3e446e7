//! Trigger use cases: create, lookup, words, delete.

use crate::error::AppError;
use crate::infra::{get_connection, Session};
use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerCreateReq {
    pub name: String,
    pub positive_emoji_code: String,
    pub negative_emoji_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerDto {
    pub id: String,
    pub name: String,
    pub positive_emoji_code: String,
    pub negative_emoji_code: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerWordDto {
    pub id: String,
    pub trigger_id: String,
    pub word: String,
    pub created_at: String,
}

const TRIGGER_COLUMNS: &str = "id, name, positive_emoji_code, negative_emoji_code, created_at";

fn trigger_from_row(row: &Row<'_>) -> rusqlite::Result<TriggerDto> {
    Ok(TriggerDto {
        id: row.get(0)?,
        name: row.get(1)?,
        positive_emoji_code: row.get(2)?,
        negative_emoji_code: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn is_constraint(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation)
}

pub fn trigger_create(session: &Session, req: TriggerCreateReq) -> Result<TriggerDto, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let conn = get_connection(session);
    conn.execute(
        "INSERT INTO triggers (id, name, positive_emoji_code, negative_emoji_code, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, req.positive_emoji_code, req.negative_emoji_code, &now],
    )
    .map_err(|e| {
        if is_constraint(&e) {
            AppError::Conflict(format!("trigger {} already exists", name))
        } else {
            AppError::Db(e.to_string())
        }
    })?;

    log::debug!("Created trigger {} ({})", name, id);
    Ok(TriggerDto {
        id,
        name: name.to_string(),
        positive_emoji_code: req.positive_emoji_code,
        negative_emoji_code: req.negative_emoji_code,
        created_at: now,
    })
}

pub fn trigger_get(session: &Session, id: &str) -> Result<TriggerDto, AppError> {
    let conn = get_connection(session);
    conn.query_row(
        &format!("SELECT {} FROM triggers WHERE id = ?1", TRIGGER_COLUMNS),
        [id],
        trigger_from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("trigger {}", id)))
}

pub fn trigger_find_by_name(session: &Session, name: &str) -> Result<Option<TriggerDto>, AppError> {
    let conn = get_connection(session);
    let found = conn
        .query_row(
            &format!("SELECT {} FROM triggers WHERE name = ?1", TRIGGER_COLUMNS),
            [name.trim()],
            trigger_from_row,
        )
        .optional()?;
    Ok(found)
}

pub fn trigger_list(session: &Session) -> Result<Vec<TriggerDto>, AppError> {
    let conn = get_connection(session);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM triggers ORDER BY name COLLATE NOCASE",
        TRIGGER_COLUMNS
    ))?;
    let rows = stmt.query_map([], trigger_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Attach one word to an existing trigger.
pub fn trigger_add_word(
    session: &Session,
    trigger_id: &str,
    word: &str,
) -> Result<TriggerWordDto, AppError> {
    let word = word.trim();
    if word.is_empty() {
        return Err(AppError::Validation("word is required".into()));
    }
    // NotFound rather than a bare foreign key failure
    trigger_get(session, trigger_id)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let conn = get_connection(session);
    conn.execute(
        "INSERT INTO trigger_words (id, trigger_id, word, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, trigger_id, word, &now],
    )
    .map_err(|e| {
        if is_constraint(&e) {
            AppError::Conflict(format!("word {} already attached", word))
        } else {
            AppError::Db(e.to_string())
        }
    })?;

    Ok(TriggerWordDto {
        id,
        trigger_id: trigger_id.to_string(),
        word: word.to_string(),
        created_at: now,
    })
}

/// Words of one trigger in the order they were added.
pub fn trigger_words(session: &Session, trigger_id: &str) -> Result<Vec<TriggerWordDto>, AppError> {
    let conn = get_connection(session);
    let mut stmt = conn.prepare(
        "SELECT id, trigger_id, word, created_at FROM trigger_words WHERE trigger_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map([trigger_id], |r| {
        Ok(TriggerWordDto {
            id: r.get(0)?,
            trigger_id: r.get(1)?,
            word: r.get(2)?,
            created_at: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Delete a trigger and, by cascade, its words.
pub fn trigger_delete(session: &Session, id: &str) -> Result<(), AppError> {
    let conn = get_connection(session);
    let n = conn.execute("DELETE FROM triggers WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("trigger {}", id)));
    }
    Ok(())
}
