//! Final assessment flow: context reduction, model call, quality gate,
//! and citation gathering.

use tracing::info;

use crate::metrics::MetricsRegistry;
use crate::models::{Assessment, ChatTurn, Role};
use crate::pipeline::llm::client::ModelClient;
use crate::pipeline::llm::prompt;
use crate::pipeline::llm::quality::is_substantive;
use crate::pipeline::llm::structured::invoke_structured;
use crate::pipeline::TriageError;
use crate::retrieval::{gather_citations, CitationLookup};

/// Result of the full assessment flow.
#[derive(Debug)]
pub struct AssessmentOutcome {
    pub assessment: Assessment,
    /// Whether any model call went through the JSON repair path.
    pub repaired: bool,
    /// Whether the quality gate forced a regeneration.
    pub regenerated: bool,
}

/// Reduce a conversation to a single user turn for the assessment call.
///
/// Assistant turns carry disclaimers and rendered markdown that only
/// pollute the context, so they are dropped entirely. The latest user
/// message leads; earlier user messages are folded in as prior details.
pub fn build_assessment_turns(history: &[ChatTurn]) -> Vec<ChatTurn> {
    let user_contents: Vec<&str> = history
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
        .collect();

    let Some((latest, earlier)) = user_contents.split_last() else {
        return Vec::new();
    };

    let content = if earlier.is_empty() {
        (*latest).to_string()
    } else {
        format!("{latest}\n\nPrior details: {}", earlier.join("; "))
    };
    vec![ChatTurn::user(content)]
}

fn assessment_system_prompt() -> String {
    format!(
        "{}\n\n{}",
        prompt::SYSTEM_TRIAGE,
        prompt::build_assessment_instructions()
    )
}

/// Run the assessment model call with the quality gate and citation
/// lookup applied.
///
/// A hollow first result gets exactly one regeneration from the latest
/// symptom text alone; the regenerated assessment replaces the first
/// without being re-checked.
pub fn final_assessment(
    client: &dyn ModelClient,
    lookup: &dyn CitationLookup,
    history: &[ChatTurn],
    metrics: &MetricsRegistry,
) -> Result<AssessmentOutcome, TriageError> {
    let turns = build_assessment_turns(history);
    let symptom_text = turns.first().map(|t| t.content.clone()).unwrap_or_default();
    let system = assessment_system_prompt();

    let first = invoke_structured::<Assessment>(
        client,
        &turns,
        &system,
        prompt::FINAL_ASSESSMENT_FORMAT,
        Some(&symptom_text),
        metrics,
    )?;

    let mut assessment = first.value;
    let mut repaired = first.repaired;
    let mut regenerated = false;

    if !is_substantive(&assessment) {
        info!(event = "assessment_regenerated", "quality gate failed, regenerating once");
        regenerated = true;
        let retry_turns = vec![ChatTurn::user(&symptom_text)];
        match invoke_structured::<Assessment>(
            client,
            &retry_turns,
            &system,
            prompt::FINAL_ASSESSMENT_FORMAT,
            Some(&symptom_text),
            metrics,
        ) {
            Ok(second) => {
                assessment = second.value;
                repaired = repaired || second.repaired;
            }
            // Keep the hollow-but-valid first result rather than fail the turn.
            Err(TriageError::SchemaMismatch(_)) => {}
            Err(e) => return Err(e),
        }
    }

    assessment.citations = gather_citations(&assessment.sources_query, lookup, 5);
    if !assessment.citations.is_empty() {
        metrics.record_lookup_retrieval();
    }

    Ok(AssessmentOutcome {
        assessment,
        repaired,
        regenerated,
    })
}
