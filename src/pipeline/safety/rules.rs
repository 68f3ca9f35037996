//! Keyword and pattern rules for emergency symptoms.
//!
//! Any single hit classifies the text as a red flag: a plain OR over
//! all category patterns, no scoring. English only. Matching is
//! case-insensitive, deterministic, and stateless; matched terms are
//! human-readable labels used for the guardrail override and for
//! logging.

use std::sync::LazyLock;

use regex::Regex;

/// (phrase, label) pairs grouped by category. The label is what ends up
/// in `red_flags` and the guardrail log.
const CHEST: &[&str] = &[
    "chest pain",
    "severe chest pain",
    "pressure in chest",
    "chest pressure",
    "pain in chest",
    "crushing chest",
];
const BREATHING: &[&str] = &[
    "shortness of breath",
    "difficulty breathing",
    "trouble breathing",
    "cannot breathe",
    "can't breathe",
    "can not breathe",
];
const COLD_SWEAT: &[&str] = &["cold sweat", "cold sweats", "sweating and chest", "sweat and chest"];
const UNCONSCIOUS: &[&str] = &[
    "fainting",
    "passed out",
    "loss of consciousness",
    "unconscious",
    "collapse",
    "collapsed",
];
const STROKE: &[&str] = &[
    "face droop",
    "arm weakness",
    "slurred speech",
    "drooping face",
    "weakness in arm",
];
const BLEEDING: &[&str] = &[
    "severe bleeding",
    "coughing blood",
    "vomiting blood",
    "heavy bleeding",
    "bleeding heavily",
];
const SELF_HARM: &[&str] = &[
    "suicidal thoughts",
    "suicidal thought",
    "self-harm",
    "self harm",
    "hurt myself",
    "kill myself",
    "want to die",
    "end my life",
];
const OVERDOSE: &[&str] = &["overdose", "overdosed", "poisoning", "poisoned"];

const KEYWORD_GROUPS: &[&[&str]] = &[
    CHEST, BREATHING, COLD_SWEAT, UNCONSCIOUS, STROKE, BLEEDING, SELF_HARM, OVERDOSE,
];

/// Regex variants that the flat keyword list cannot express
/// (contractions, optional words, either-order phrasings).
static PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)chest\s+pain", "chest pain"),
        (r"(?i)pressure\s+in\s+(?:my\s+)?chest", "pressure in chest"),
        (r"(?i)shortness\s+of\s+breath", "shortness of breath"),
        (r"(?i)difficult(?:y|ies)\s+breathing", "difficulty breathing"),
        (r"(?i)trouble\s+breathing", "trouble breathing"),
        (r"(?i)can'?t\s+breathe", "trouble breathing"),
        (r"(?i)cold\s+sweats?", "cold sweat(s)"),
        (r"(?i)sweat(?:ing)?\s+.*chest|chest.*sweat", "sweating + chest pain"),
        (r"(?i)passed\s+out", "passed out"),
        (r"(?i)loss\s+of\s+consciousness", "loss of consciousness"),
        (r"(?i)face\s+droop|droop(?:ing)?\s+face", "face droop"),
        (r"(?i)arm\s+weakness|weakness\s+in\s+arm", "arm weakness"),
        (r"(?i)slurred\s+speech", "slurred speech"),
        (r"(?i)severe\s+bleeding", "severe bleeding"),
        (r"(?i)coughing\s+blood|vomiting\s+blood", "coughing/vomiting blood"),
        (r"(?i)suicidal\s+thoughts?", "suicidal thoughts"),
        (r"(?i)self[\s\-]harm", "self-harm"),
        (r"(?i)overdose(?:d)?", "overdose"),
        (r"(?i)poison(?:ed|ing)?", "poisoning"),
    ]
    .iter()
    .map(|(pat, label)| (Regex::new(pat).expect("invalid red-flag pattern"), *label))
    .collect()
});

/// Result of matching the rule table against one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedFlagMatch {
    pub hit: bool,
    /// Labels in first-match order, deduplicated by label.
    pub matched_terms: Vec<String>,
}

impl RedFlagMatch {
    fn none() -> Self {
        Self {
            hit: false,
            matched_terms: Vec::new(),
        }
    }
}

/// Match `text` against every keyword and pattern. Any hit is a red flag.
pub fn check_red_flags(text: &str) -> RedFlagMatch {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return RedFlagMatch::none();
    }
    let lower = trimmed.to_lowercase();

    let mut matched: Vec<String> = Vec::new();
    let mut push_label = |label: &str, matched: &mut Vec<String>| {
        if !matched.iter().any(|m| m == label) {
            matched.push(label.to_string());
        }
    };

    for group in KEYWORD_GROUPS {
        for phrase in *group {
            if lower.contains(phrase) {
                push_label(phrase, &mut matched);
            }
        }
    }
    for (pattern, label) in PATTERNS.iter() {
        if pattern.is_match(trimmed) {
            push_label(label, &mut matched);
        }
    }

    RedFlagMatch {
        hit: !matched.is_empty(),
        matched_terms: matched,
    }
}
