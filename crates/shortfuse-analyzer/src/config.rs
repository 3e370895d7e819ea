//! Analyzer configuration.

use serde::Serialize;

/// Knobs for the vulnerability search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalyzerConfig {
    /// Step budget handed to each validation run; exceeding it confirms the
    /// candidate.
    pub step_threshold: u64,
    /// How many times the pump is repeated in a validation input.
    pub pump_count: u32,
    /// Stop after this many confirmed findings.
    pub max_findings: usize,
}

impl Default for AnalyzerConfig {
    /// The pump count follows the reference behavior of 7; the threshold is
    /// sized so an exponential blowup at that length exceeds it while
    /// linear patterns stay well under.
    fn default() -> Self {
        AnalyzerConfig {
            step_threshold: 400,
            pump_count: 7,
            max_findings: 16,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_threshold(mut self, step_threshold: u64) -> Self {
        self.step_threshold = step_threshold;
        self
    }

    pub fn with_pump_count(mut self, pump_count: u32) -> Self {
        self.pump_count = pump_count;
        self
    }

    pub fn with_max_findings(mut self, max_findings: usize) -> Self {
        self.max_findings = max_findings;
        self
    }
}
