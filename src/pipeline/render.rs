//! Render a validated assessment to markdown.
//!
//! Section order is fixed. The References section only ever uses the
//! citations attached by the lookup, never URLs from model text.

use crate::models::{Assessment, Citation};

pub const DISCLAIMER: &str = "This is general information only, not medical advice. \
This system does not diagnose or prescribe. Always consult a qualified healthcare provider \
for your situation.";

fn risk_level_meaning(level: &str) -> &'static str {
    match level {
        "EMERGENCY" => {
            "May be life-threatening. Seek emergency care immediately (call emergency services \
or go to the nearest emergency department)."
        }
        "URGENT" => "Should be evaluated by a doctor soon. Do not delay if symptoms worsen.",
        "ROUTINE" => "A routine doctor visit is recommended when convenient.",
        "SELF_CARE" => {
            "General self-care information may be appropriate; see \u{201c}When to seek care\u{201d} \
if symptoms change or worsen."
        }
        _ => "",
    }
}

fn section(title: &str, lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let bullets: Vec<String> = lines.iter().map(|line| format!("- {line}")).collect();
    format!("## {title}\n\n{}\n\n", bullets.join("\n"))
}

fn reference_line(citation: &Citation) -> String {
    let label = if citation.source.is_empty() {
        "Source"
    } else {
        &citation.source
    };
    let url = citation.url.trim();
    if url.is_empty() {
        format!("- {label}")
    } else {
        format!("- [{label}]({url})")
    }
}

/// Convert a validated assessment to markdown. Deterministic order:
/// emergency warning, disclaimer, risk level, summary, possible causes,
/// home care, when to seek care (red flags bolded), references.
pub fn render_markdown(assessment: &Assessment, emergency_message: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(message) = emergency_message {
        let message = message.trim();
        if !message.is_empty() {
            parts.push(format!("## Emergency warning\n\n{message}\n\n"));
        }
    }

    parts.push(format!("## Disclaimer\n\n{DISCLAIMER}\n\n"));

    let level = assessment.risk_level.as_str();
    parts.push(format!(
        "## Risk level\n\n**{level}** — {}\n\n",
        risk_level_meaning(level)
    ));

    parts.push(section("Summary", &assessment.summary));
    parts.push(section("Possible causes", &assessment.possible_causes));
    parts.push(section("What you can do now", &assessment.home_care));

    let mut when_lines: Vec<String> = assessment.when_to_seek_care.clone();
    if !assessment.red_flags.is_empty() {
        when_lines.push("**Red flags — seek care promptly:**".to_string());
        when_lines.extend(assessment.red_flags.iter().map(|f| format!("**{f}**")));
    }
    parts.push(section("When to seek care", &when_lines));

    let refs: Vec<&Citation> = assessment
        .citations
        .iter()
        .filter(|c| !c.source.is_empty() || !c.url.is_empty())
        .collect();
    if !refs.is_empty() {
        let lines: Vec<String> = refs.iter().map(|c| reference_line(c)).collect();
        parts.push(format!("## References\n\n{}\n", lines.join("\n")));
    }

    parts.concat().trim().to_string()
}
