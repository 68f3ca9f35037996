//! Model invocation layer: client abstraction, JSON extraction and
//! repair, prompt text, and the quality gate.

pub mod capability;
pub mod client;
pub mod extract;
pub mod flow;
pub mod prompt;
pub mod quality;
pub mod structured;

pub use capability::{classify_rejection, CapabilityCheck};
pub use client::{HttpModelClient, InvokeOptions, ModelClient, ScriptedModelClient};
pub use extract::extract_json;
pub use flow::{build_assessment_turns, final_assessment, AssessmentOutcome};
pub use quality::is_substantive;
pub use structured::{invoke_structured, StructuredOutcome, ValidateSchema};
