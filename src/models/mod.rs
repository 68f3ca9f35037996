pub mod assessment;
pub mod conversation;

pub use assessment::{Assessment, Citation, RiskLevel};
pub use conversation::{ChatTurn, Role};
