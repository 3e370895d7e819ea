//! Errors that can occur during matching.

/// The interpreter's only failure mode. A non-match is not an error; running
/// out of steps is, and it is recoverable: the caller decides whether to
/// retry with a larger budget or treat the pattern as pathological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The per-call step budget was exhausted. The partial count is the
    /// number of steps taken when the matcher gave up.
    #[error("step budget exceeded after {steps} steps")]
    BudgetExceeded { steps: u64 },
}
