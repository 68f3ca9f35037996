//! Fixed emergency assessments returned without invoking the model.
//!
//! When the pre-model detector fires the pipeline answers from these
//! templates instead of calling the model. Self-harm takes priority
//! over the medical variant when both match.

use crate::models::{Assessment, RiskLevel};
use crate::pipeline::safety::detect::RedFlags;

/// Build the fixed EMERGENCY assessment for a red-flag hit.
///
/// Callers must only invoke this when `flags.is_emergency()` is true;
/// a non-emergency input still yields the medical variant rather than
/// panicking.
pub fn build_emergency_assessment(flags: &RedFlags) -> Assessment {
    if flags.is_self_harm {
        Assessment {
            risk_level: RiskLevel::Emergency,
            summary: vec![
                "You may be in immediate danger.".to_string(),
                "If you are in the U.S., call or text 988 (Suicide & Crisis Lifeline) now."
                    .to_string(),
                "If you are in immediate danger, call 911 or your local emergency number."
                    .to_string(),
            ],
            possible_causes: Vec::new(),
            home_care: Vec::new(),
            when_to_seek_care: vec![
                "Call 911 (or your local emergency number) now if you might act on these thoughts."
                    .to_string(),
                "Reach out to someone you trust and do not stay alone.".to_string(),
            ],
            red_flags: vec!["self-harm risk detected".to_string()],
            sources_query: Vec::new(),
            citations: Vec::new(),
        }
    } else {
        Assessment {
            risk_level: RiskLevel::Emergency,
            summary: vec![
                "Chest pain or breathing problems can be a medical emergency.".to_string(),
                "Seek emergency evaluation immediately.".to_string(),
                "Do not wait.".to_string(),
            ],
            possible_causes: Vec::new(),
            home_care: Vec::new(),
            when_to_seek_care: vec![
                "Call 911 (or your local emergency number) now or go to the nearest emergency department."
                    .to_string(),
                "Do not drive yourself if you feel faint or short of breath.".to_string(),
            ],
            red_flags: vec![format!(
                "emergency symptom: {}",
                flags.matched_terms.join(", ")
            )],
            sources_query: Vec::new(),
            citations: Vec::new(),
        }
    }
}
