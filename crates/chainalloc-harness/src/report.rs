//! Report model shared by the CLI and tests.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::scenarios::ScenarioOutcome;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Aggregated result of a correctness run.
#[derive(Debug, Clone, Serialize)]
pub struct CorrectnessReport {
    pub campaign: String,
    pub scenarios: Vec<ScenarioOutcome>,
    pub passed: usize,
    pub failed: usize,
}

impl CorrectnessReport {
    #[must_use]
    pub fn new(campaign: impl Into<String>, scenarios: Vec<ScenarioOutcome>) -> Self {
        let passed = scenarios.iter().filter(|scenario| scenario.passed).count();
        let failed = scenarios.len() - passed;
        Self {
            campaign: campaign.into(),
            scenarios,
            passed,
            failed,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Human-readable summary for the console.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "campaign {}: {} passed, {} failed",
            self.campaign, self.passed, self.failed
        );
        for scenario in &self.scenarios {
            let status = if scenario.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(out, "\n[{status}] {} - {}", scenario.name, scenario.title);
            for check in &scenario.checks {
                let mark = if check.passed { "ok" } else { "FAIL" };
                let _ = writeln!(out, "  [{mark}] {}", check.name);
            }
            for fault in &scenario.faults {
                let _ = writeln!(out, "  fault: {fault}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios;

    #[test]
    fn report_counts_and_serializes() {
        let report = CorrectnessReport::new("smoke", scenarios::run_all());
        assert_eq!(report.passed + report.failed, 6);
        assert!(report.all_passed());

        let json = report.to_json().expect("serializable report");
        assert!(json.contains("\"campaign\": \"smoke\""));
        assert!(json.contains("coalescing"));
    }

    #[test]
    fn text_rendering_flags_failures() {
        let mut scenarios = scenarios::run_all();
        scenarios[0].passed = false;
        scenarios[0].checks[0].passed = false;
        let report = CorrectnessReport::new("smoke", scenarios);
        assert!(!report.all_passed());
        let text = report.render_text();
        assert!(text.contains("1 failed"));
        assert!(text.contains("[FAIL]"));
    }
}
