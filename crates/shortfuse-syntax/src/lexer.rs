//! Lexer for pattern text.
//!
//! Produces span-based tokens without storing text - text is sliced from the
//! pattern only when needed. Context sensitivity (a `-` that is literal
//! outside a class, a `^` that only negates right after `[`) is resolved by
//! the parser, not here.
//!
//! ## Quoting
//!
//! `\Q...\E` sections are resolved in a post-pass over the raw logos stream:
//! every token between the quote markers is re-emitted as one `Literal` token
//! per code point, so the parser never sees quoted metacharacters. This is
//! the same place the raw stream is patched up for error coalescing: an
//! unpaired trailing backslash lexes as a `Garbage` token.

use logos::Logos;
use rowan::TextRange;
use std::ops::Range;

/// Token kinds over pattern text.
///
/// Escape families are split by the shape of their payload so the parser can
/// decode them without re-scanning: class-like (`\d`), anchor-like (`\b`),
/// single-character (`\n`, `\x41`), references, and properties.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[token("|")]
    Pipe,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("?")]
    Question,
    #[token("^")]
    Caret,
    #[token("$")]
    Dollar,
    #[token(".")]
    Dot,
    #[token("-")]
    Dash,
    #[token(",")]
    Comma,
    #[token("&&")]
    AmpAmp,
    #[token("#")]
    Hash,

    /// `\d \D \w \W \s \S \h \H \v \V`
    #[regex(r"\\[dDwWsShHvV]", priority = 10)]
    ClassEscape,
    /// `\b \B \A \Z \z \G`
    #[regex(r"\\[bBAZzG]", priority = 10)]
    AnchorEscape,
    /// `\R`
    #[token(r"\R", priority = 10)]
    LineBreakEscape,
    /// `\n \r \t \f \a \e`
    #[regex(r"\\[nrtfae]", priority = 10)]
    ControlCharEscape,
    /// `\xHH`
    #[regex(r"\\x[0-9a-fA-F][0-9a-fA-F]", priority = 10)]
    HexEscape,
    /// `\x{H...H}`
    #[regex(r"\\x\{[0-9a-fA-F]+\}", priority = 11)]
    HexBraceEscape,
    /// `\uHHHH`
    #[regex(r"\\u[0-9a-fA-F][0-9a-fA-F][0-9a-fA-F][0-9a-fA-F]", priority = 10)]
    UniEscape,
    /// `\cX`
    #[regex(r"\\c.", priority = 10)]
    CtrlEscape,
    /// `\0n`, `\0nn`, `\0mnn` (m ≤ 3)
    #[regex(r"\\0([0-3][0-7][0-7]|[0-7][0-7]?)", priority = 10)]
    OctalEscape,
    /// `\1` .. `\99...` — digit consumption is re-validated by the parser
    /// against the set of closed groups.
    #[regex(r"\\[1-9][0-9]*", priority = 10)]
    BackRefEscape,
    /// `\k<name>`
    #[regex(r"\\k<[A-Za-z][A-Za-z0-9]*>", priority = 10)]
    NamedBackRefEscape,
    /// `\p{name}` / `\P{name}`
    #[regex(r"\\[pP]\{[^}]*\}", priority = 11)]
    PropertyEscape,
    /// `\pL` / `\PL` single-letter property
    #[regex(r"\\[pP][A-Za-z]", priority = 9)]
    PropertyShortEscape,
    #[token(r"\Q", priority = 10)]
    QuoteStart,
    #[token(r"\E", priority = 10)]
    QuoteEnd,
    /// Any other `\c` pair; the parser decides between an escaped literal
    /// and an unknown-escape error.
    #[regex(r"\\.", priority = 3)]
    EscapedLiteral,

    /// Pattern whitespace. Significant unless the COMMENTS flag is on.
    #[regex(r"[ \t\n\x0B\x0C\r]", priority = 2)]
    Whitespace,
    /// Any other single code point.
    #[regex(r".", priority = 1)]
    Literal,

    /// Unlexable input, e.g. a trailing lone backslash.
    Garbage,
}

/// Zero-copy token: kind + span, text retrieved via [`token_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: TextRange) -> Self {
        Self { kind, span }
    }
}

fn range_to_text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}

/// Tokenizes a pattern into span-based tokens.
///
/// Post-processes the logos output:
/// - Coalesces consecutive lexer errors into single `Garbage` tokens
/// - Expands `\Q...\E` sections into per-code-point `Literal` tokens
pub fn lex(source: &str) -> Vec<Token> {
    let mut raw = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut error_start: Option<usize> = None;

    loop {
        match lexer.next() {
            Some(Ok(kind)) => {
                if let Some(start) = error_start.take() {
                    let end = lexer.span().start;
                    raw.push(Token::new(TokenKind::Garbage, range_to_text_range(start..end)));
                }
                raw.push(Token::new(kind, range_to_text_range(lexer.span())));
            }
            Some(Err(())) => {
                if error_start.is_none() {
                    error_start = Some(lexer.span().start);
                }
            }
            None => {
                if let Some(start) = error_start.take() {
                    raw.push(Token::new(
                        TokenKind::Garbage,
                        range_to_text_range(start..source.len()),
                    ));
                }
                break;
            }
        }
    }

    expand_quotes(source, raw)
}

/// Rewrites `\Q...\E` sections as literal tokens. An unterminated `\Q`
/// quotes to the end of the pattern.
fn expand_quotes(source: &str, raw: Vec<Token>) -> Vec<Token> {
    if !raw.iter().any(|t| t.kind == TokenKind::QuoteStart) {
        return raw;
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut quoting = false;
    for token in raw {
        match token.kind {
            TokenKind::QuoteStart if !quoting => quoting = true,
            TokenKind::QuoteEnd if quoting => quoting = false,
            _ if quoting => {
                let span: Range<usize> = token.span.into();
                let base = span.start;
                for (offset, ch) in source[span].char_indices() {
                    let start = base + offset;
                    out.push(Token::new(
                        TokenKind::Literal,
                        range_to_text_range(start..start + ch.len_utf8()),
                    ));
                }
            }
            _ => out.push(token),
        }
    }
    out
}

/// Retrieves the text slice for a token. O(1) slice into the pattern.
#[inline]
pub fn token_text<'p>(source: &'p str, token: &Token) -> &'p str {
    &source[std::ops::Range::<usize>::from(token.span)]
}

/// First code point of the token's text. Every token is at least one code
/// point long, so this never fails on lexed input.
#[inline]
pub fn token_cp(source: &str, token: &Token) -> u32 {
    token_text(source, token)
        .chars()
        .next()
        .expect("token spans are non-empty") as u32
}
