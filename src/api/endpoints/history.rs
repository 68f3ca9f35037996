//! Conversation history endpoint.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::db::repository;

#[derive(Serialize)]
pub struct MessageView {
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// `GET /conversations/:id/history` — messages in creation order.
pub async fn conversation_history(
    State(ctx): State<ApiContext>,
    Path(conversation_id): Path<i64>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    let db_path = ctx.db_path.clone();
    let messages = tokio::task::spawn_blocking(move || -> Result<Vec<MessageView>, ApiError> {
        let conn = db::open_db(&db_path)?;
        if !repository::conversation_exists(&conn, conversation_id)? {
            return Err(ApiError::NotFound(format!(
                "conversation {conversation_id}"
            )));
        }
        let history = repository::get_conversation_history(&conn, conversation_id)?;
        Ok(history
            .into_iter()
            .map(|m| MessageView {
                role: m.role,
                content: m.content,
                created_at: m.created_at,
            })
            .collect())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task panicked: {e}")))??;

    Ok(Json(messages))
}
