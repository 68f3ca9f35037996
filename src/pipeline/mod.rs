pub mod llm;
pub mod orchestrator;
pub mod render;
pub mod safety;

use thiserror::Error;

/// Error taxonomy for the triage pipeline.
///
/// `Configuration` is fatal and never retried. `Transport` and 5xx
/// `Provider` errors are transient and retried with bounded backoff
/// inside the model client. `SchemaMismatch` is terminal after the
/// single repair attempt. The orchestration layer converts any of
/// these into the fixed safe fallback response — a raw error never
/// reaches the end user.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("model provider configuration error: {0}")]
    Configuration(String),

    #[error("model provider error (status {status}): {body}")]
    Provider { status: u16, body: String },

    #[error("model request failed: {0}")]
    Transport(String),

    #[error("model response did not match the assessment schema: {0}")]
    SchemaMismatch(String),

    #[error("database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}
