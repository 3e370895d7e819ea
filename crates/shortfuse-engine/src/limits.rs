//! Runtime limits for match execution.

/// Limits supplied per match call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepLimits {
    /// Maximum interpreter steps; 0 means unlimited.
    pub step_budget: u64,
}

impl StepLimits {
    pub const UNLIMITED: StepLimits = StepLimits { step_budget: 0 };

    pub fn budget(step_budget: u64) -> StepLimits {
        StepLimits { step_budget }
    }
}

impl Default for StepLimits {
    fn default() -> Self {
        StepLimits::UNLIMITED
    }
}
