//! Recursive-descent pattern parser.
//!
//! Precedence, low to high: alternation, concatenation, quantifier, atom.
//! The parser builds match nodes directly into the graph arena as it
//! descends; fragments (entry/exit node pairs) are linked by the sequence
//! and alternation combinators. Parsing fails fast: the first error aborts
//! with a [`crate::PatternError`] carrying the cursor.

mod atoms;
mod classes;
mod core;
mod escapes;
mod expressions;
mod groups;


pub(crate) use self::core::{Fragment, ParsedPattern, Parser};
