//! Pattern compilation errors.
//!
//! Parsing fails fast: the first error aborts compilation, carrying the
//! normalized pattern text and the cursor at which the error was detected.
//! No graph is produced on error.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

/// What went wrong, without location context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxErrorKind {
    #[error("dangling meta character '{0}'")]
    DanglingMeta(char),
    #[error("unclosed group")]
    UnclosedGroup,
    #[error("unmatched closing ')'")]
    UnmatchedParen,
    #[error("unknown group type")]
    UnknownGroupType,
    #[error("unclosed character class")]
    UnclosedClass,
    #[error("illegal repetition")]
    IllegalRepetition,
    #[error("unknown escape sequence '\\{0}'")]
    UnknownEscape(char),
    #[error("unknown character property '{0}'")]
    UnknownProperty(String),
    #[error("unclosed character property")]
    UnclosedProperty,
    #[error("illegal hexadecimal escape")]
    IllegalHexEscape,
    #[error("illegal octal escape")]
    IllegalOctalEscape,
    #[error("illegal control escape")]
    IllegalControlEscape,
    #[error("illegal character range")]
    InvalidRange,
    #[error("\\R is not allowed inside a character class")]
    LineBreakInClass,
    #[error("look-behind group does not have an obvious maximum length")]
    UnboundedLookBehind,
    #[error("no such group: {0}")]
    NoSuchGroup(String),
    #[error("named capturing group <{0}> is already defined")]
    DuplicateGroupName(String),
    #[error("invalid capturing group name")]
    InvalidGroupName,
    #[error("unknown inline flag '{0}'")]
    UnknownFlag(char),
    #[error("trailing backslash")]
    TrailingBackslash,
    #[error("pattern nested too deeply")]
    NestedTooDeep,
}

/// Coarse classification of [`SyntaxErrorKind`], for callers that branch on
/// the error family rather than the precise kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed pattern text.
    Syntax,
    /// Syntactically valid but semantically unsupported.
    Unsupported,
    /// Back-reference or named-group lookup did not resolve.
    NoSuchGroup,
}

/// A pattern compilation failure: kind + normalized pattern + cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pub kind: SyntaxErrorKind,
    pub pattern: String,
    pub position: usize,
}

impl PatternError {
    pub fn new(kind: SyntaxErrorKind, pattern: impl Into<String>, position: usize) -> PatternError {
        PatternError {
            kind,
            pattern: pattern.into(),
            position,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            SyntaxErrorKind::UnboundedLookBehind => ErrorCategory::Unsupported,
            SyntaxErrorKind::NoSuchGroup(_) => ErrorCategory::NoSuchGroup,
            _ => ErrorCategory::Syntax,
        }
    }

    /// Renders the error with the pattern source underneath, via
    /// `annotate-snippets`.
    pub fn render(&self, colored: bool) -> String {
        let renderer = if colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };
        let message = self.kind.to_string();
        let start = self.position.min(self.pattern.len());
        let span = start..(start + 1).min(self.pattern.len());
        let snippet = Snippet::source(self.pattern.as_str())
            .line_start(1)
            .annotation(AnnotationKind::Primary.span(span).label(&message));
        let report = [Level::ERROR.primary_title(&message).element(snippet)];
        renderer.render(&report).to_string()
    }
}

impl std::fmt::Display for PatternError {
    /// Two-line form: message with index, then the pattern with a caret
    /// under the offending position.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} near index {}", self.kind, self.position)?;
        writeln!(f, "{}", self.pattern)?;
        let caret_col = self.pattern[..self.position.min(self.pattern.len())]
            .chars()
            .count();
        for _ in 0..caret_col {
            f.write_str(" ")?;
        }
        f.write_str("^")
    }
}

impl std::error::Error for PatternError {}
