//! Shared state for the API layer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::metrics::MetricsRegistry;
use crate::pipeline::orchestrator::TriagePipeline;

/// Shared context for all API routes.
///
/// SQLite connections are opened per request inside `spawn_blocking`;
/// only the path is shared.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
    pub pipeline: Arc<TriagePipeline>,
    pub metrics: Arc<MetricsRegistry>,
}

impl ApiContext {
    pub fn new(
        db_path: PathBuf,
        pipeline: Arc<TriagePipeline>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            db_path: Arc::new(db_path),
            pipeline,
            metrics,
        }
    }
}

/// Request id attached to every log event for one chat turn.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
