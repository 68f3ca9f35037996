//! Quality gate on parsed assessments.
//!
//! Catches model output that is schema-valid but hollow: generic
//! filler summaries or too few actionable items.

use crate::models::Assessment;

/// Minimum actionable content for a substantive assessment.
pub const MIN_POSSIBLE_CAUSES: usize = 2;
pub const MIN_HOME_CARE: usize = 3;

/// Phrases that mark a summary point as generic filler.
const FILLER_MARKERS: &[&str] = &[
    "general guidance provided",
    "guidance provided based on description",
    "based on your description",
];

/// Does an assessment carry enough specific content to render?
///
/// A failing assessment gets one regeneration attempt upstream; this
/// check itself is deliberately cheap and deterministic.
pub fn is_substantive(assessment: &Assessment) -> bool {
    let has_filler = assessment.summary.iter().any(|point| {
        let lower = point.to_lowercase();
        FILLER_MARKERS.iter().any(|m| lower.contains(m))
    });
    !has_filler
        && assessment.possible_causes.len() >= MIN_POSSIBLE_CAUSES
        && assessment.home_care.len() >= MIN_HOME_CARE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;

    fn assessment(summary: &[&str], causes: usize, home_care: usize) -> Assessment {
        Assessment {
            risk_level: RiskLevel::Routine,
            summary: summary.iter().map(|s| s.to_string()).collect(),
            possible_causes: (0..causes).map(|i| format!("cause {i}")).collect(),
            home_care: (0..home_care).map(|i| format!("step {i}")).collect(),
            when_to_seek_care: vec!["If symptoms worsen, see a doctor.".to_string()],
            red_flags: Vec::new(),
            sources_query: Vec::new(),
            citations: Vec::new(),
        }
    }

    #[test]
    fn substantive_assessment_passes() {
        let a = assessment(
            &[
                "Could be tension-type headache.",
                "Missing: duration and severity.",
                "Try self-care below.",
            ],
            3,
            5,
        );
        assert!(is_substantive(&a));
    }

    #[test]
    fn generic_filler_fails() {
        let a = assessment(
            &[
                "General guidance provided based on description.",
                "See below.",
                "Consult a doctor if needed.",
            ],
            3,
            5,
        );
        assert!(!is_substantive(&a));
    }

    #[test]
    fn filler_detection_ignores_case() {
        let a = assessment(
            &["GENERAL GUIDANCE PROVIDED.", "Point two.", "Point three."],
            3,
            5,
        );
        assert!(!is_substantive(&a));
    }

    #[test]
    fn too_few_possible_causes_fails() {
        let a = assessment(
            &["Specific point.", "Another point.", "Third point."],
            1,
            5,
        );
        assert!(!is_substantive(&a));
    }

    #[test]
    fn too_few_home_care_steps_fails() {
        let a = assessment(
            &["Specific point.", "Another point.", "Third point."],
            3,
            2,
        );
        assert!(!is_substantive(&a));
    }

    #[test]
    fn thresholds_are_inclusive() {
        let a = assessment(
            &["Specific point.", "Another point.", "Third point."],
            MIN_POSSIBLE_CAUSES,
            MIN_HOME_CARE,
        );
        assert!(is_substantive(&a));
    }
}
