//! Post-model guardrail override.
//!
//! Re-checks the original user text against the red-flag rules after
//! the model has produced an assessment. A hit can only raise severity
//! to EMERGENCY; a model-issued EMERGENCY is never lowered.

use crate::models::{Assessment, RiskLevel};
use crate::pipeline::safety::rules::check_red_flags;

pub const EMERGENCY_DISCLAIMER: &str = "This may be a medical emergency. Please call emergency \
services (e.g. 911 / your local emergency number) or go to the nearest emergency department \
immediately. This system cannot provide emergency care.";

const EMERGENCY_OVERRIDE_SUMMARY: &[&str] = &[
    "Your symptoms may indicate a medical emergency.",
    "Seek emergency care immediately.",
];

const EMERGENCY_OVERRIDE_WHEN_TO_SEEK: &[&str] = &[
    "Call emergency services (911) now or go to the nearest emergency department.",
    "Do not drive yourself if you feel faint or short of breath.",
];

/// Assessment after the guardrail pass, plus what (if anything) fired.
#[derive(Debug, Clone)]
pub struct GuardrailResult {
    pub assessment: Assessment,
    /// Set only when the guardrail fired on this turn.
    pub emergency_message: Option<String>,
    pub matched_terms: Vec<String>,
}

/// Apply the guardrail override to a model assessment.
///
/// On a hit: risk level forced to EMERGENCY, summary and
/// when-to-seek-care replaced with the override text, and the matched
/// terms prepended to the model's red flags (deduplicated, order
/// preserved). No hit: the assessment passes through untouched.
pub fn apply_guardrails(user_text: &str, assessment: Assessment) -> GuardrailResult {
    let hit = check_red_flags(user_text);
    if !hit.hit {
        return GuardrailResult {
            assessment,
            emergency_message: None,
            matched_terms: Vec::new(),
        };
    }

    let mut red_flags: Vec<String> = Vec::new();
    for flag in hit.matched_terms.iter().chain(assessment.red_flags.iter()) {
        if !red_flags.contains(flag) {
            red_flags.push(flag.clone());
        }
    }

    let overridden = Assessment {
        risk_level: RiskLevel::Emergency,
        summary: EMERGENCY_OVERRIDE_SUMMARY
            .iter()
            .map(|s| s.to_string())
            .collect(),
        when_to_seek_care: EMERGENCY_OVERRIDE_WHEN_TO_SEEK
            .iter()
            .map(|s| s.to_string())
            .collect(),
        red_flags,
        ..assessment
    };

    GuardrailResult {
        assessment: overridden,
        emergency_message: Some(EMERGENCY_DISCLAIMER.to_string()),
        matched_terms: hit.matched_terms,
    }
}
