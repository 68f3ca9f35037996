//! Pre-model red-flag detection.
//!
//! Runs on the raw user message before anything else and gates whether
//! the model is invoked at all. The guardrail policy re-checks the
//! text post-model with the richer rule table in `rules`; the two
//! passes stay separate.

const SELF_HARM_TERMS: &[&str] = &[
    "hurt myself",
    "kill myself",
    "suicide",
    "suicidal",
    "self harm",
    "self-harm",
    "end my life",
    "want to die",
    "don't want to live",
];

const EMERGENCY_TERMS: &[&str] = &[
    "chest pain",
    "severe chest pain",
    "pressure in chest",
    "shortness of breath",
    "difficulty breathing",
    "trouble breathing",
    "cold sweat",
    "cold sweats",
    "fainting",
    "passed out",
    "loss of consciousness",
    "coughing blood",
    "severe bleeding",
];

/// Outcome of the pre-model gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedFlags {
    pub is_self_harm: bool,
    pub is_emergency_medical: bool,
    /// Sorted, deduplicated matched terms.
    pub matched_terms: Vec<String>,
}

impl RedFlags {
    pub fn is_emergency(&self) -> bool {
        self.is_self_harm || self.is_emergency_medical
    }
}

/// Check text (case-insensitive, trimmed) for self-harm and emergency
/// medical terms. Pure function of the input; no network, no model.
pub fn detect_red_flags(text: &str) -> RedFlags {
    let lower = text.to_lowercase();
    let lower = lower.trim();

    let is_self_harm = SELF_HARM_TERMS.iter().any(|t| lower.contains(t));
    let is_emergency_medical = EMERGENCY_TERMS.iter().any(|t| lower.contains(t));

    let mut matched: Vec<String> = SELF_HARM_TERMS
        .iter()
        .chain(EMERGENCY_TERMS.iter())
        .filter(|t| lower.contains(*t))
        .map(|t| t.to_string())
        .collect();
    matched.sort();
    matched.dedup();

    RedFlags {
        is_self_harm,
        is_emergency_medical,
        matched_terms: matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hurt_myself_is_self_harm() {
        let flags = detect_red_flags("hurt myself");
        assert!(flags.is_self_harm);
        assert!(flags.matched_terms.contains(&"hurt myself".to_string()));
    }

    #[test]
    fn chest_pain_is_emergency_medical() {
        let flags = detect_red_flags("chest pain");
        assert!(flags.is_emergency_medical);
        assert!(!flags.is_self_harm);
        assert!(flags.matched_terms.contains(&"chest pain".to_string()));
    }

    #[test]
    fn matched_terms_are_sorted_and_unique() {
        let flags = detect_red_flags("chest pain, severe chest pain and cold sweats");
        let mut sorted = flags.matched_terms.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(flags.matched_terms, sorted);
    }

    #[test]
    fn detection_ignores_case() {
        assert!(detect_red_flags("CHEST PAIN").is_emergency_medical);
        assert!(detect_red_flags("I Want To Die").is_self_harm);
    }

    #[test]
    fn benign_text_has_no_flags() {
        let flags = detect_red_flags("I have a mild headache");
        assert!(!flags.is_self_harm);
        assert!(!flags.is_emergency_medical);
        assert!(flags.matched_terms.is_empty());
        assert!(!flags.is_emergency());
    }

    #[test]
    fn empty_text_has_no_flags() {
        let flags = detect_red_flags("");
        assert!(!flags.is_emergency());
        assert!(flags.matched_terms.is_empty());
    }

    #[test]
    fn detection_is_stateless() {
        let first = detect_red_flags("shortness of breath");
        let second = detect_red_flags("shortness of breath");
        assert_eq!(first, second);
    }
}
