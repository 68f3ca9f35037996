pub mod detect;
pub mod early_exit;
pub mod policy;
pub mod rules;

pub use detect::{detect_red_flags, RedFlags};
pub use early_exit::build_emergency_assessment;
pub use policy::{apply_guardrails, GuardrailResult, EMERGENCY_DISCLAIMER};
pub use rules::{check_red_flags, RedFlagMatch};
