//! Instrumented backtracking interpreter over shortfuse match graphs.
//!
//! The graph built by `shortfuse-syntax` is immutable; every match call owns
//! a scratch [`MatchState`] and is aborted cleanly when its step budget runs
//! out, surfacing [`EngineError::BudgetExceeded`]. That signal is how the
//! analyzer distinguishes catastrophic backtracking from a plain non-match.
//!
//! # Example
//!
//! ```
//! use shortfuse_engine::Matcher;
//! use shortfuse_syntax::Pattern;
//!
//! let pattern = Pattern::new(r"a+b").expect("valid pattern");
//! let mut matcher = Matcher::new(&pattern, "xxaaab");
//! let found = matcher.find().expect("within budget").expect("a match");
//! assert_eq!((found.start, found.end), (2, 6));
//! ```

pub mod error;
pub mod limits;
pub mod matcher;
pub mod state;
pub mod trace;

mod interp;

#[cfg(test)]
mod interp_tests;
#[cfg(test)]
mod matcher_tests;

pub use error::EngineError;
pub use limits::StepLimits;
pub use matcher::{MatchSpan, Matcher, is_match};
pub use state::MatchState;
pub use trace::{NoopTracer, RecordingTracer, Tracer};
