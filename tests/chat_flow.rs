//! End-to-end chat flow through the HTTP router with a scripted model.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use triagecare::api::{api_router, ApiContext};
use triagecare::db;
use triagecare::metrics::MetricsRegistry;
use triagecare::pipeline::llm::client::ScriptedModelClient;
use triagecare::pipeline::orchestrator::TriagePipeline;
use triagecare::retrieval::StaticLookup;

struct TestApp {
    router: Router,
    client: Arc<ScriptedModelClient>,
    _tmp: tempfile::TempDir,
}

fn test_app(responses: Vec<String>) -> TestApp {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("triagecare.db");
    db::open_db(&db_path).unwrap();

    let client = Arc::new(ScriptedModelClient::new(responses));
    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = Arc::new(TriagePipeline::new(
        client.clone(),
        Arc::new(StaticLookup::empty()),
        metrics.clone(),
    ));
    let ctx = ApiContext::new(db_path, pipeline, metrics);
    TestApp {
        router: api_router(ctx),
        client,
        _tmp: tmp,
    }
}

fn chat_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn routine_headache_json() -> String {
    serde_json::json!({
        "risk_level": "ROUTINE",
        "summary": [
            "Likely a mild tension-type headache.",
            "Missing: duration, severity, and associated symptoms.",
            "Try self-care and see a doctor if it persists."
        ],
        "possible_causes": ["Tension.", "Dehydration.", "Eye strain."],
        "home_care": ["Rest.", "Stay hydrated.", "Limit screen time."],
        "when_to_seek_care": ["If the headache worsens or lasts several days."],
        "red_flags": ["Sudden severe headache."],
        "sources_query": []
    })
    .to_string()
}

#[tokio::test]
async fn chest_pain_returns_emergency_without_model_call() {
    let app = test_app(vec![routine_headache_json()]);
    let response = app
        .router
        .oneshot(chat_request(serde_json::json!({
            "message": "I have chest pain and cold sweats"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["risk_level"], "EMERGENCY");
    let markdown = json["final_markdown"].as_str().unwrap();
    assert!(markdown.contains("911"));
    assert!(markdown.contains("emergency department"));
    assert_eq!(app.client.call_count(), 0);
}

#[tokio::test]
async fn self_harm_returns_crisis_line() {
    let app = test_app(vec![]);
    let response = app
        .router
        .oneshot(chat_request(serde_json::json!({
            "message": "I want to hurt myself"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["risk_level"], "EMERGENCY");
    assert!(json["final_markdown"].as_str().unwrap().contains("988"));
    assert_eq!(app.client.call_count(), 0);
}

#[tokio::test]
async fn mild_headache_passes_model_result_through() {
    let app = test_app(vec![routine_headache_json()]);
    let response = app
        .router
        .oneshot(chat_request(serde_json::json!({
            "message": "I have a mild headache since this morning"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["risk_level"], "ROUTINE");
    let markdown = json["final_markdown"].as_str().unwrap();
    assert!(!markdown.contains("Emergency warning"));
    assert!(markdown.contains("## Disclaimer"));
    assert!(markdown.contains("**ROUTINE**"));
    assert_eq!(app.client.call_count(), 1);
}

#[tokio::test]
async fn prose_first_response_is_repaired_in_exactly_two_calls() {
    let prose = "The patient reports a mild headache. This could be tension or dehydration. \
Recommend rest and fluids.";
    let app = test_app(vec![prose.to_string(), routine_headache_json()]);
    let response = app
        .router
        .oneshot(chat_request(serde_json::json!({
            "message": "I have a mild headache"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["risk_level"], "ROUTINE");
    assert_eq!(app.client.call_count(), 2);
}

#[tokio::test]
async fn conversation_continues_and_history_is_stored() {
    let app = test_app(vec![routine_headache_json(), routine_headache_json()]);

    let first = app
        .router
        .clone()
        .oneshot(chat_request(serde_json::json!({
            "message": "I have a mild headache"
        })))
        .await
        .unwrap();
    let first_json = body_json(first).await;
    let conversation_id = first_json["conversation_id"].as_i64().unwrap();

    let second = app
        .router
        .clone()
        .oneshot(chat_request(serde_json::json!({
            "conversation_id": conversation_id,
            "message": "It's been two days now"
        })))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second_json = body_json(second).await;
    assert_eq!(second_json["conversation_id"].as_i64().unwrap(), conversation_id);

    let history = app
        .router
        .oneshot(
            Request::get(format!("/conversations/{conversation_id}/history"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(history.status(), StatusCode::OK);
    let messages = body_json(history).await;
    let messages = messages.as_array().unwrap();
    // Two user messages and two assistant acknowledgements.
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert!(messages[2]["content"]
        .as_str()
        .unwrap()
        .contains("two days"));
}

#[tokio::test]
async fn metrics_reflect_processed_requests() {
    let app = test_app(vec![]);
    app.router
        .clone()
        .oneshot(chat_request(serde_json::json!({
            "message": "severe chest pain"
        })))
        .await
        .unwrap();

    let response = app
        .router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["requests_total"], 1);
    assert_eq!(json["by_risk_level"]["EMERGENCY"], 1);
    assert!(json["red_flag_hits_total"].as_u64().unwrap() >= 1);
}
