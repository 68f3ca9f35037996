//! Append-only message log and assessment record store.
//!
//! History is reconstructed by creation order; the response path treats
//! every write here as best-effort (callers log and continue on failure).

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::DatabaseError;
use crate::models::{ChatTurn, Role};

/// One stored message, as returned to the history endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// Create a new conversation. Returns the conversation id.
pub fn create_conversation(conn: &Connection) -> Result<i64, DatabaseError> {
    conn.execute("INSERT INTO conversations DEFAULT VALUES", [])?;
    Ok(conn.last_insert_rowid())
}

pub fn conversation_exists(conn: &Connection, conversation_id: i64) -> Result<bool, DatabaseError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM conversations WHERE id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Append a message to a conversation. Returns the message id.
pub fn add_message(
    conn: &Connection,
    conversation_id: i64,
    role: Role,
    content: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO messages (conversation_id, role, content) VALUES (?1, ?2, ?3)",
        params![conversation_id, role.as_str(), content],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Messages for a conversation, ordered by creation time.
pub fn get_conversation_history(
    conn: &Connection,
    conversation_id: i64,
) -> Result<Vec<StoredMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT role, content, created_at FROM messages
         WHERE conversation_id = ?1 ORDER BY created_at, id",
    )?;
    let rows = stmt
        .query_map(params![conversation_id], |row| {
            Ok(StoredMessage {
                role: row.get(0)?,
                content: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// History as pipeline turns, skipping rows with unknown roles.
pub fn history_as_turns(
    conn: &Connection,
    conversation_id: i64,
) -> Result<Vec<ChatTurn>, DatabaseError> {
    let history = get_conversation_history(conn, conversation_id)?;
    Ok(history
        .into_iter()
        .filter_map(|m| {
            Role::from_str(&m.role).map(|role| ChatTurn {
                role,
                content: m.content,
            })
        })
        .collect())
}

/// Record an assessment for a conversation. Returns the assessment id.
pub fn save_assessment(
    conn: &Connection,
    conversation_id: i64,
    risk_level: &str,
    summary_json: &str,
    red_flags_json: &str,
    sources_json: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO assessments (conversation_id, risk_level, summary, red_flags_json, sources_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            conversation_id,
            risk_level,
            summary_json,
            red_flags_json,
            sources_json
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
