//! Chat endpoint: one user message in, one rendered assessment out.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::error::ApiError;
use crate::api::types::{generate_request_id, ApiContext};
use crate::db;
use crate::db::repository;
use crate::models::{ChatTurn, Role};
use crate::observe;

const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub conversation_id: Option<i64>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub conversation_id: i64,
    pub risk_level: String,
    pub final_markdown: String,
}

/// `POST /chat` — process one triage turn.
///
/// The whole turn (SQLite plus the blocking model client) runs inside
/// `spawn_blocking`; the async handler only validates and waits.
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Message too long (max {MAX_MESSAGE_CHARS} chars)"
        )));
    }

    let response = tokio::task::spawn_blocking(move || -> Result<ChatResponse, ApiError> {
        let request_id = generate_request_id();
        let start = Instant::now();

        let conn = db::open_db(&ctx.db_path)?;

        let (conversation_id, mut history) = match request.conversation_id {
            Some(id) => {
                if !repository::conversation_exists(&conn, id)? {
                    return Err(ApiError::NotFound(format!("conversation {id}")));
                }
                (id, repository::history_as_turns(&conn, id)?)
            }
            None => (repository::create_conversation(&conn)?, Vec::new()),
        };

        repository::add_message(&conn, conversation_id, Role::User, &message)?;
        history.push(ChatTurn::user(&message));

        let outcome = ctx
            .pipeline
            .run_chat_turn(&request_id, &history, &message);

        // Persistence after the response is computed is best effort; a
        // failure here must not lose the rendered answer.
        if let Err(e) =
            repository::add_message(&conn, conversation_id, Role::Assistant, outcome.assistant_ack)
        {
            warn!(request_id, error = %e, "failed to store assistant message");
        }
        if let Some(assessment) = &outcome.assessment {
            let summary = serde_json::to_string(&assessment.summary).unwrap_or_default();
            let red_flags = serde_json::to_string(&assessment.red_flags).unwrap_or_default();
            let sources = serde_json::to_string(&assessment.sources_query).unwrap_or_default();
            if let Err(e) = repository::save_assessment(
                &conn,
                conversation_id,
                assessment.risk_level.as_str(),
                &summary,
                &red_flags,
                &sources,
            ) {
                warn!(request_id, error = %e, "failed to store assessment");
            }
        }

        observe::request_completed(
            &ctx.metrics,
            &request_id,
            conversation_id,
            start.elapsed().as_secs_f64() * 1000.0,
            Some(outcome.risk_level),
            outcome.red_flag_hits,
            outcome.model_called,
            observe::estimate_tokens(&outcome.markdown),
        );

        Ok(ChatResponse {
            conversation_id,
            risk_level: outcome.risk_level.as_str().to_string(),
            final_markdown: outcome.markdown,
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task panicked: {e}")))??;

    Ok(Json(response))
}
