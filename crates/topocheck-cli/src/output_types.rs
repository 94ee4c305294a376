use serde::Serialize;
use tabled::Tabled;
use topocheck_geo::RuleSummary;

/// Output for check command
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub input: String,
    pub output: String,
    pub report: Option<String>,
    pub crs: u32,
    pub points: usize,
    pub lines: usize,
    pub ignored: usize,
    pub flagged: usize,
    pub rules: Vec<RuleSummary>,
}

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub input: String,
    pub format: String,
    pub declared_crs: Option<u32>,
    pub features: usize,
    pub points: usize,
    pub lines: usize,
    pub unsupported: usize,
    pub warnings: Vec<String>,
}

/// One configuration entry
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Table row for the per-rule summary
#[derive(Tabled)]
pub struct RuleRow {
    #[tabled(rename = "Rule")]
    pub rule: String,
    #[tabled(rename = "Violations")]
    pub violations: usize,
    #[tabled(rename = "Features")]
    pub flagged: usize,
}

impl From<&RuleSummary> for RuleRow {
    fn from(summary: &RuleSummary) -> Self {
        Self {
            rule: summary.rule.to_string(),
            violations: summary.violations,
            flagged: summary.flagged,
        }
    }
}
