//! Chat turn orchestration: red-flag gate, model flow, guardrails,
//! rendering, and the degraded fallback.

use std::sync::Arc;

use tracing::error;

use crate::metrics::MetricsRegistry;
use crate::models::{Assessment, ChatTurn, RiskLevel};
use crate::observe;
use crate::pipeline::llm::client::ModelClient;
use crate::pipeline::llm::flow::final_assessment;
use crate::pipeline::render::render_markdown;
use crate::pipeline::safety::{apply_guardrails, build_emergency_assessment, detect_red_flags};
use crate::retrieval::CitationLookup;

/// Assistant acknowledgement stored after a successful turn.
pub const ASSISTANT_ACK: &str =
    "Here is information based on your description. This is not medical advice.";

/// Assistant acknowledgement stored when the model path failed.
pub const FALLBACK_ACK: &str = "This is general information only, not medical advice. \
Consult a healthcare provider for your situation.";

/// Safe markdown served when the model path fails entirely.
pub const FALLBACK_ROUTINE_MARKDOWN: &str = "## Disclaimer\n\n\
This is general information only, not medical advice. \
This system does not diagnose or prescribe. Always consult a qualified healthcare provider.\n\n\
## Risk level\n\n\
**ROUTINE** — A routine doctor visit is recommended when convenient.\n\n\
## When to seek care\n\n\
- If symptoms worsen or last more than a few days, see a doctor.";

/// Everything the API layer needs from one processed turn.
#[derive(Debug)]
pub struct ChatOutcome {
    pub risk_level: RiskLevel,
    pub markdown: String,
    pub model_called: bool,
    pub red_flag_hits: usize,
    /// Present on the normal path; the fallback has no assessment to persist.
    pub assessment: Option<Assessment>,
    pub assistant_ack: &'static str,
}

/// Pure compute pipeline for one chat turn. Owns no storage; callers
/// persist what they need from the outcome.
pub struct TriagePipeline {
    model: Arc<dyn ModelClient>,
    lookup: Arc<dyn CitationLookup>,
    metrics: Arc<MetricsRegistry>,
}

impl TriagePipeline {
    pub fn new(
        model: Arc<dyn ModelClient>,
        lookup: Arc<dyn CitationLookup>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            model,
            lookup,
            metrics,
        }
    }

    /// Process one user turn. Never fails: a model-path error degrades
    /// to the fixed ROUTINE fallback.
    ///
    /// `history` is the conversation including the latest user message;
    /// `latest_user_text` is that message on its own, which is what the
    /// red-flag rules run against.
    pub fn run_chat_turn(
        &self,
        request_id: &str,
        history: &[ChatTurn],
        latest_user_text: &str,
    ) -> ChatOutcome {
        let flags = detect_red_flags(latest_user_text);
        let red_flag_hits = flags.matched_terms.len();

        // Emergency short-circuits everything: fixed content, no model.
        if flags.is_emergency() {
            let assessment = build_emergency_assessment(&flags);
            let markdown = render_markdown(&assessment, None);
            observe::guardrail_triggered(request_id, &flags.matched_terms, RiskLevel::Emergency);
            return ChatOutcome {
                risk_level: RiskLevel::Emergency,
                markdown,
                model_called: false,
                red_flag_hits,
                assessment: Some(assessment),
                assistant_ack: ASSISTANT_ACK,
            };
        }

        match final_assessment(
            self.model.as_ref(),
            self.lookup.as_ref(),
            history,
            &self.metrics,
        ) {
            Ok(outcome) => {
                let result = apply_guardrails(latest_user_text, outcome.assessment);
                if !result.matched_terms.is_empty() {
                    observe::guardrail_triggered(
                        request_id,
                        &result.matched_terms,
                        result.assessment.risk_level,
                    );
                }
                let markdown =
                    render_markdown(&result.assessment, result.emergency_message.as_deref());
                ChatOutcome {
                    risk_level: result.assessment.risk_level,
                    markdown,
                    model_called: true,
                    red_flag_hits,
                    assessment: Some(result.assessment),
                    assistant_ack: ASSISTANT_ACK,
                }
            }
            Err(e) => {
                error!(event = "chat_turn_degraded", request_id, error = %e);
                ChatOutcome {
                    risk_level: RiskLevel::Routine,
                    markdown: FALLBACK_ROUTINE_MARKDOWN.to_string(),
                    model_called: true,
                    red_flag_hits,
                    assessment: None,
                    assistant_ack: FALLBACK_ACK,
                }
            }
        }
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::client::ScriptedModelClient;
    use crate::retrieval::StaticLookup;

    fn pipeline_with(responses: Vec<String>) -> (TriagePipeline, Arc<ScriptedModelClient>) {
        let client = Arc::new(ScriptedModelClient::new(responses));
        let pipeline = TriagePipeline::new(
            client.clone(),
            Arc::new(StaticLookup::empty()),
            Arc::new(MetricsRegistry::new()),
        );
        (pipeline, client)
    }

    fn routine_json() -> String {
        serde_json::json!({
            "risk_level": "ROUTINE",
            "summary": [
                "Mild headache described.",
                "Missing: duration and severity.",
                "Self-care may be sufficient."
            ],
            "possible_causes": ["Tension.", "Dehydration."],
            "home_care": ["Rest.", "Hydrate.", "Avoid screens."],
            "when_to_seek_care": ["If it worsens, see a doctor."],
            "red_flags": [],
            "sources_query": []
        })
        .to_string()
    }

    #[test]
    fn chest_pain_short_circuits_without_model() {
        let (pipeline, client) = pipeline_with(vec![routine_json()]);
        let history = vec![ChatTurn::user("I have severe chest pain")];
        let outcome = pipeline.run_chat_turn("req-1", &history, "I have severe chest pain");
        assert_eq!(outcome.risk_level, RiskLevel::Emergency);
        assert!(!outcome.model_called);
        assert_eq!(client.call_count(), 0);
        assert!(outcome.markdown.contains("911"));
        assert!(outcome.markdown.contains("emergency"));
    }

    #[test]
    fn self_harm_short_circuits_to_crisis_line() {
        let (pipeline, client) = pipeline_with(vec![routine_json()]);
        let history = vec![ChatTurn::user("I want to hurt myself")];
        let outcome = pipeline.run_chat_turn("req-2", &history, "I want to hurt myself");
        assert_eq!(outcome.risk_level, RiskLevel::Emergency);
        assert_eq!(client.call_count(), 0);
        assert!(outcome.markdown.contains("988"));
    }

    #[test]
    fn benign_input_passes_model_result_through() {
        let (pipeline, client) = pipeline_with(vec![routine_json()]);
        let history = vec![ChatTurn::user("I have a mild headache")];
        let outcome = pipeline.run_chat_turn("req-3", &history, "I have a mild headache");
        assert_eq!(outcome.risk_level, RiskLevel::Routine);
        assert!(outcome.model_called);
        assert_eq!(client.call_count(), 1);
        assert!(!outcome.markdown.contains("Emergency warning"));
        assert_eq!(outcome.assistant_ack, ASSISTANT_ACK);
    }

    #[test]
    fn terminal_model_failure_degrades_to_routine_fallback() {
        let (pipeline, client) = pipeline_with(vec![
            "not json".to_string(),
            "still not json".to_string(),
        ]);
        let history = vec![ChatTurn::user("I have a mild headache")];
        let outcome = pipeline.run_chat_turn("req-4", &history, "I have a mild headache");
        assert_eq!(client.call_count(), 2);
        assert_eq!(outcome.risk_level, RiskLevel::Routine);
        assert!(outcome.assessment.is_none());
        assert_eq!(outcome.markdown, FALLBACK_ROUTINE_MARKDOWN);
        assert_eq!(outcome.assistant_ack, FALLBACK_ACK);
    }

    #[test]
    fn guardrail_overrides_model_risk_level_post_model() {
        // "slurred speech" is only in the guardrail rules, not the
        // pre-model term list, so the model runs and is then overridden.
        let (pipeline, client) = pipeline_with(vec![routine_json()]);
        let text = "My father suddenly has slurred speech";
        let history = vec![ChatTurn::user(text)];
        let outcome = pipeline.run_chat_turn("req-5", &history, text);
        assert_eq!(client.call_count(), 1);
        assert!(outcome.model_called);
        assert_eq!(outcome.risk_level, RiskLevel::Emergency);
        assert!(outcome.markdown.contains("Emergency warning"));
    }
}
