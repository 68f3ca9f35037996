use serde::{Deserialize, Serialize};

/// Ordered severity classification. The derived `Ord` follows declaration
/// order, so `SelfCare < Routine < Urgent < Emergency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    SelfCare,
    Routine,
    Urgent,
    Emergency,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::SelfCare => "SELF_CARE",
            RiskLevel::Routine => "ROUTINE",
            RiskLevel::Urgent => "URGENT",
            RiskLevel::Emergency => "EMERGENCY",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reference from the citation lookup: source, url, quote.
/// Never fabricated — always traced to a lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub url: String,
    pub quote: String,
}

/// Strict schema for the final triage assessment. No diagnosis;
/// `citations` is filled from the lookup after the model output is final.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub risk_level: RiskLevel,
    pub summary: Vec<String>,
    #[serde(default)]
    pub possible_causes: Vec<String>,
    #[serde(default)]
    pub home_care: Vec<String>,
    #[serde(default)]
    pub when_to_seek_care: Vec<String>,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(default)]
    pub sources_query: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl Assessment {
    /// Minimum and maximum summary entries required by the schema.
    pub const SUMMARY_MIN: usize = 3;
    pub const SUMMARY_MAX: usize = 6;
}
