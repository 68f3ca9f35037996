//! triagecared — HTTP triage service.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use triagecare::api::{api_router, ApiContext};
use triagecare::config::AppConfig;
use triagecare::db;
use triagecare::metrics::MetricsRegistry;
use triagecare::pipeline::llm::client::HttpModelClient;
use triagecare::pipeline::orchestrator::TriagePipeline;
use triagecare::retrieval::{CitationLookup, FileIndex};

// The model client is blocking, so the pipeline runs in spawn_blocking
// and main stays synchronous with an explicit runtime for the server.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let model = match HttpModelClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "model client configuration failed");
            return ExitCode::FAILURE;
        }
    };

    let lookup: Arc<dyn CitationLookup> = match &config.knowledge_path {
        Some(path) => {
            let index = FileIndex::open(path);
            info!(path = %path.display(), chunks = index.len(), "knowledge file loaded");
            Arc::new(index)
        }
        None => {
            info!("no knowledge file configured, citations disabled");
            Arc::new(FileIndex::empty())
        }
    };

    if let Err(e) = db::open_db(&config.db_path) {
        error!(error = %e, path = %config.db_path.display(), "database initialization failed");
        return ExitCode::FAILURE;
    }

    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = Arc::new(TriagePipeline::new(model, lookup, metrics.clone()));
    let ctx = ApiContext::new(config.db_path.clone(), pipeline, metrics);
    let router = api_router(ctx);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async {
        let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = %e, addr = %config.bind_addr, "failed to bind");
                return ExitCode::FAILURE;
            }
        };
        info!(addr = %config.bind_addr, model = %config.model_id, "listening");
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "server error");
            return ExitCode::FAILURE;
        }
        ExitCode::SUCCESS
    })
}
