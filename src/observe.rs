//! Structured event emission points.
//!
//! Each function is one independently-testable emission: it writes a
//! `tracing` event with stable field names and bumps the matching
//! counter on the registry it is given. Patient text never appears in
//! these events; repair events carry only a short response snippet.

use crate::metrics::MetricsRegistry;
use crate::models::RiskLevel;

const SNIPPET_LEN: usize = 160;

/// Rough token estimate (chars / 4).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Truncate a raw model response for logging.
pub fn snippet(raw: &str) -> String {
    raw.chars().take(SNIPPET_LEN).collect()
}

/// Emitted once per chat request, after the response is computed.
#[allow(clippy::too_many_arguments)]
pub fn request_completed(
    metrics: &MetricsRegistry,
    request_id: &str,
    conversation_id: i64,
    latency_ms: f64,
    risk_level: Option<RiskLevel>,
    red_flag_hits: usize,
    model_called: bool,
    model_tokens_est: usize,
) {
    tracing::info!(
        event = "request_completed",
        request_id,
        conversation_id,
        latency_ms = format_args!("{latency_ms:.2}"),
        risk_level = risk_level.map(|l| l.as_str()),
        red_flag_hits,
        model_called,
        model_tokens_est,
        "chat request completed"
    );
    metrics.record_request(risk_level, red_flag_hits, model_tokens_est);
}

/// Emitted whenever the guardrail policy or the early-exit gate fires.
pub fn guardrail_triggered(request_id: &str, matched_terms: &[String], final_risk_level: RiskLevel) {
    tracing::warn!(
        event = "guardrail_trigger",
        request_id,
        matched_terms = ?matched_terms,
        final_risk_level = final_risk_level.as_str(),
        "guardrail forced emergency handling"
    );
}

/// First-pass extraction/validation of the model output failed;
/// the repair call is about to run.
pub fn parse_failed_first_pass(metrics: &MetricsRegistry, raw: &str) {
    tracing::warn!(
        event = "parse_failed_first_pass",
        response_snippet = %snippet(raw),
        "model output failed extraction/validation, attempting repair"
    );
    metrics.record_parse_failed_first_pass();
}

/// The repair call produced schema-valid output.
pub fn parse_repaired(metrics: &MetricsRegistry) {
    tracing::info!(event = "parse_repaired", "repair call recovered valid output");
    metrics.record_parse_repaired();
}

/// The repair call also failed; the error is terminal.
pub fn parse_failed_final(metrics: &MetricsRegistry, raw: &str) {
    tracing::error!(
        event = "parse_failed_final",
        response_snippet = %snippet(raw),
        "repair call failed, surfacing schema mismatch"
    );
    metrics.record_parse_failed_final();
}
