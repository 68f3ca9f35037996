//! Provider capability negotiation for JSON response mode.
//!
//! Some OpenAI-compatible providers reject `response_format` with a
//! 400/422 rather than advertising support up front. The rejection body
//! is classified here so the client can strip the field and retry once
//! instead of failing the whole request.

/// Outcome of classifying a provider rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityCheck {
    /// Whether the provider supports the requested feature.
    pub supported: bool,
    /// Whether the request should be retried with the feature removed.
    pub retry_without_feature: bool,
}

const JSON_MODE_MARKERS: &[&str] = &["response_format", "json_object", "json_mode"];

/// Decide whether an error response means "JSON mode unsupported".
///
/// Only 400 and 422 bodies that mention the feature by name count as a
/// capability rejection; anything else is treated as an ordinary
/// provider error and is not retried here.
pub fn classify_rejection(status: u16, body: &str) -> CapabilityCheck {
    if matches!(status, 400 | 422) {
        let lower = body.to_lowercase();
        if JSON_MODE_MARKERS.iter().any(|m| lower.contains(m)) {
            return CapabilityCheck {
                supported: false,
                retry_without_feature: true,
            };
        }
    }
    CapabilityCheck {
        supported: true,
        retry_without_feature: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_mentioning_response_format_triggers_retry() {
        let check = classify_rejection(
            400,
            r#"{"error": {"message": "Unknown parameter: 'response_format'."}}"#,
        );
        assert!(!check.supported);
        assert!(check.retry_without_feature);
    }

    #[test]
    fn unprocessable_mentioning_json_object_triggers_retry() {
        let check = classify_rejection(422, "json_object is not a supported format for this model");
        assert!(check.retry_without_feature);
    }

    #[test]
    fn classification_ignores_case() {
        let check = classify_rejection(400, "Invalid value for RESPONSE_FORMAT");
        assert!(check.retry_without_feature);
    }

    #[test]
    fn unrelated_bad_request_is_not_a_capability_rejection() {
        let check = classify_rejection(400, "messages must not be empty");
        assert!(check.supported);
        assert!(!check.retry_without_feature);
    }

    #[test]
    fn server_errors_are_never_capability_rejections() {
        let check = classify_rejection(500, "response_format backend crashed");
        assert!(check.supported);
        assert!(!check.retry_without_feature);
    }
}
