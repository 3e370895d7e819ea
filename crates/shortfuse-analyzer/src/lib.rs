//! Static ReDoS detection over shortfuse match graphs.
//!
//! For every backtracking repetition in a compiled pattern, the analyzer
//! enumerates candidate *pump* strings from the repetition's body, builds a
//! reaching prefix and a match-breaking suffix, and confirms each candidate
//! empirically: the interpreter runs `prefix · pump^k · suffix` under a step
//! budget, and only candidates that blow the budget become findings.
//!
//! # Example
//!
//! ```
//! use shortfuse_analyzer::{AnalyzerConfig, analyze};
//! use shortfuse_syntax::Pattern;
//!
//! let pattern = Pattern::new(r"^(a+)+$").expect("valid pattern");
//! let config = AnalyzerConfig::default()
//!     .with_threshold(50_000)
//!     .with_pump_count(16);
//! let findings = analyze(&pattern, &config);
//! assert_eq!(findings[0].pump, "a");
//! ```

mod analyzer;
mod config;
mod finding;
mod pumps;
mod sets;

#[cfg(test)]
mod analyzer_tests;
#[cfg(test)]
mod sets_tests;

pub use analyzer::analyze;
pub use config::AnalyzerConfig;
pub use finding::Finding;
