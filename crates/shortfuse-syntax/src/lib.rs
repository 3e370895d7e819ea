//! Pattern syntax for shortfuse: charset algebra, lexer, parser, and the
//! match-node graph.
//!
//! # Example
//!
//! ```
//! use shortfuse_syntax::Pattern;
//!
//! let pattern = Pattern::new(r"^(a+)+$").expect("valid pattern");
//! assert_eq!(pattern.group_count(), 1);
//! ```
//!
//! The compiled [`Pattern`] is immutable and shareable; matching happens in
//! `shortfuse-engine`, vulnerability analysis in `shortfuse-analyzer`.

pub mod charset;
pub mod error;
pub mod flags;
pub mod graph;
pub mod lexer;
mod parser;
mod pattern;
pub mod unicode;

#[cfg(test)]
mod charset_tests;
#[cfg(test)]
mod lexer_tests;

pub use charset::{CharSet, ClassPredicate, InvalidRange, MAX_CODE_POINT, PredicateSet, Universe};
pub use error::{ErrorCategory, PatternError, SyntaxErrorKind};
pub use flags::Flags;
pub use pattern::{Pattern, PatternBuilder};
pub use unicode::{BuiltinProperties, PropertyOracle};
