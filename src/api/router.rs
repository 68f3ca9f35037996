//! API router assembly.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router with all routes and middleware attached.
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/chat", post(endpoints::chat::send))
        .route("/health", get(endpoints::health::check))
        .route("/metrics", get(endpoints::metrics::snapshot))
        .route(
            "/conversations/:id/history",
            get(endpoints::history::conversation_history),
        )
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::db;
    use crate::metrics::MetricsRegistry;
    use crate::pipeline::llm::client::ScriptedModelClient;
    use crate::pipeline::orchestrator::TriagePipeline;
    use crate::retrieval::StaticLookup;

    /// Router over a temp database and a scripted model.
    /// The tempdir guard must outlive the test.
    fn test_router(responses: Vec<String>) -> (Router, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("triagecare.db");
        db::open_db(&db_path).unwrap();

        let metrics = Arc::new(MetricsRegistry::new());
        let pipeline = Arc::new(TriagePipeline::new(
            Arc::new(ScriptedModelClient::new(responses)),
            Arc::new(StaticLookup::empty()),
            metrics.clone(),
        ));
        let ctx = ApiContext::new(db_path, pipeline, metrics);
        (api_router(ctx), tmp)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (router, _tmp) = test_router(vec![]);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn metrics_snapshot_is_served() {
        let (router, _tmp) = test_router(vec![]);
        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["requests_total"], 0);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (router, _tmp) = test_router(vec![]);
        let request = json_request(
            Method::POST,
            "/chat",
            serde_json::json!({"message": "   "}),
        );
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let (router, _tmp) = test_router(vec![]);
        let request = json_request(
            Method::POST,
            "/chat",
            serde_json::json!({"message": "x".repeat(2001)}),
        );
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_conversation_is_404() {
        let (router, _tmp) = test_router(vec![]);
        let request = json_request(
            Method::POST,
            "/chat",
            serde_json::json!({"conversation_id": 999, "message": "I have a headache"}),
        );
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn history_of_unknown_conversation_is_404() {
        let (router, _tmp) = test_router(vec![]);
        let response = router
            .oneshot(
                Request::get("/conversations/42/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn emergency_chat_turn_round_trips() {
        let (router, _tmp) = test_router(vec![]);
        let request = json_request(
            Method::POST,
            "/chat",
            serde_json::json!({"message": "I have severe chest pain"}),
        );
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["risk_level"], "EMERGENCY");
        assert!(json["conversation_id"].as_i64().unwrap() > 0);
        assert!(json["final_markdown"].as_str().unwrap().contains("911"));
    }
}
