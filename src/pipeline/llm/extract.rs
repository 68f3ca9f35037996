//! Best-effort JSON extraction from raw model output.

/// Pull a JSON candidate out of raw model text.
///
/// Tried in order: the interior of the first fenced code block (with or
/// without a language tag), then the span from the first `{` to the
/// last `}`, then the trimmed text itself. Returns `None` when the
/// result would be empty. The function never validates JSON; callers
/// parse the candidate.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(inner) = fenced_block(trimmed) {
        let inner = inner.trim();
        if !inner.is_empty() {
            return Some(inner.to_string());
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Some(trimmed[start..=end].to_string());
        }
    }

    Some(trimmed.to_string())
}

/// Interior of the first ``` fenced block, if any.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    // Skip the language tag line (e.g. "json")
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}
