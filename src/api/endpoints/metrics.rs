//! In-process counter snapshot endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiContext;
use crate::metrics::MetricsSnapshot;

/// `GET /metrics` — JSON snapshot of the in-process counters.
pub async fn snapshot(State(ctx): State<ApiContext>) -> Json<MetricsSnapshot> {
    Json(ctx.metrics.snapshot())
}
