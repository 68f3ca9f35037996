//! HTTP API: a composable axum `Router` over the triage pipeline.
//!
//! Endpoints: `POST /chat`, `GET /health`, `GET /metrics`,
//! `GET /conversations/:id/history`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
