//! Strict-JSON invocation with a single bounded repair retry.
//!
//! First pass asks the model for JSON directly. If extraction, parsing,
//! or schema validation fails, the raw output goes back to the model
//! once with a repair prompt. A second failure is terminal.

use serde::de::DeserializeOwned;

use crate::metrics::MetricsRegistry;
use crate::models::ChatTurn;
use crate::observe;
use crate::pipeline::llm::client::{InvokeOptions, ModelClient};
use crate::pipeline::llm::extract::extract_json;
use crate::pipeline::llm::prompt;
use crate::pipeline::TriageError;

/// Domain-level validation applied after deserialization.
pub trait ValidateSchema {
    /// Returns a human-readable reason when the value violates its
    /// schema constraints.
    fn validate(&self) -> Result<(), String>;
}

impl ValidateSchema for crate::models::Assessment {
    fn validate(&self) -> Result<(), String> {
        use crate::models::Assessment;
        let points = self.summary.len();
        if !(Assessment::SUMMARY_MIN..=Assessment::SUMMARY_MAX).contains(&points) {
            return Err(format!(
                "summary must have {} to {} points, got {points}",
                Assessment::SUMMARY_MIN,
                Assessment::SUMMARY_MAX
            ));
        }
        Ok(())
    }
}

/// A successfully parsed value plus whether the repair path was taken.
#[derive(Debug)]
pub struct StructuredOutcome<T> {
    pub value: T,
    pub repaired: bool,
}

fn try_parse<T>(raw: &str) -> Result<T, String>
where
    T: DeserializeOwned + ValidateSchema,
{
    let candidate = extract_json(raw).ok_or_else(|| "empty model response".to_string())?;
    let value: T = serde_json::from_str(&candidate).map_err(|e| e.to_string())?;
    value.validate()?;
    Ok(value)
}

/// Invoke the model expecting a JSON value of type `T`.
///
/// `schema_description` is the JSON shape shown to the model on repair;
/// `symptom_text` (when available) is included in the repair message so
/// the model regenerates from the real input rather than inventing one.
pub fn invoke_structured<T>(
    client: &dyn ModelClient,
    turns: &[ChatTurn],
    system_prompt: &str,
    schema_description: &str,
    symptom_text: Option<&str>,
    metrics: &MetricsRegistry,
) -> Result<StructuredOutcome<T>, TriageError>
where
    T: DeserializeOwned + ValidateSchema,
{
    let options = InvokeOptions::strict_json();
    let raw = client.invoke(turns, system_prompt, &options)?;

    let first_failure = match try_parse::<T>(&raw) {
        Ok(value) => {
            return Ok(StructuredOutcome {
                value,
                repaired: false,
            })
        }
        Err(reason) => reason,
    };
    observe::parse_failed_first_pass(metrics, &raw);

    let repair_turns = vec![ChatTurn::user(&prompt::build_repair_message(
        schema_description,
        symptom_text,
        &raw,
    ))];
    let repaired_raw = client.invoke(&repair_turns, prompt::REPAIR_SYSTEM_PROMPT, &options)?;

    match try_parse::<T>(&repaired_raw) {
        Ok(value) => {
            observe::parse_repaired(metrics);
            Ok(StructuredOutcome {
                value,
                repaired: true,
            })
        }
        Err(second_failure) => {
            observe::parse_failed_final(metrics, &repaired_raw);
            Err(TriageError::SchemaMismatch(format!(
                "first pass: {first_failure}; after repair: {second_failure}"
            )))
        }
    }
}
