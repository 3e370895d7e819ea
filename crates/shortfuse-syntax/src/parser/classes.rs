//! Character-class bodies: `[...]` with ranges, nesting, union, `&&`
//! intersection, and leading-`^` negation.

use crate::charset::{CharSet, fold_additions};
use crate::error::{PatternError, SyntaxErrorKind};
use crate::flags::Flags;
use crate::graph::ClassSet;
use crate::lexer::{Token, TokenKind};

use super::core::Parser;

impl<'src> Parser<'src> {
    /// Parses a full class, `[` through `]`.
    pub(super) fn parse_class(&mut self) -> Result<ClassSet, PatternError> {
        let open_at = self.offset();
        self.bump(); // '['
        self.skip_trivia();
        let negated = self.eat(TokenKind::Caret);
        let set = self.parse_class_body(open_at, true)?;
        Ok(if negated {
            ClassSet::Complement(Box::new(set))
        } else {
            set
        })
    }

    /// Union of items up to (and consuming) the closing `]`. On `&&`, the
    /// rest of the body becomes the right operand of an intersection, so
    /// `[a&&b&&c]` associates as `a ∩ (b ∩ c)`.
    fn parse_class_body(&mut self, open_at: usize, mut first: bool) -> Result<ClassSet, PatternError> {
        let mut literals = CharSet::new();
        let mut parts: Vec<ClassSet> = Vec::new();

        loop {
            self.skip_trivia();
            let Some(token) = self.current() else {
                return Err(self.error_at(SyntaxErrorKind::UnclosedClass, open_at));
            };
            match token.kind {
                TokenKind::BracketClose if !first => {
                    self.bump();
                    break;
                }
                TokenKind::BracketOpen => {
                    let nested = self.parse_class()?;
                    parts.push(nested);
                }
                TokenKind::AmpAmp => {
                    self.bump();
                    let left = combine(literals, parts);
                    let right = self.parse_class_body(open_at, false)?;
                    return Ok(ClassSet::Intersection(Box::new(left), Box::new(right)));
                }
                TokenKind::ClassEscape => {
                    let set = self.decode_class_escape();
                    parts.push(set);
                }
                TokenKind::PropertyEscape | TokenKind::PropertyShortEscape => {
                    let set = self.decode_property()?;
                    parts.push(set);
                }
                TokenKind::LineBreakEscape => {
                    return Err(self.error(SyntaxErrorKind::LineBreakInClass));
                }
                TokenKind::AnchorEscape => {
                    let letter = self.text(&token)[1..].chars().next().expect("payload");
                    return Err(self.error(SyntaxErrorKind::UnknownEscape(letter)));
                }
                TokenKind::BackRefEscape | TokenKind::NamedBackRefEscape => {
                    let letter = self.text(&token)[1..].chars().next().expect("payload");
                    return Err(self.error(SyntaxErrorKind::UnknownEscape(letter)));
                }
                TokenKind::Garbage => {
                    return Err(self.error(SyntaxErrorKind::TrailingBackslash));
                }
                _ => {
                    let lo = self.class_literal_cp(token)?;
                    if self.at_range_dash() {
                        self.bump(); // '-'
                        let hi_token = self.current().expect("checked by at_range_dash");
                        let hi = self.class_literal_cp(hi_token)?;
                        if lo > hi {
                            return Err(self.error_at(SyntaxErrorKind::InvalidRange, open_at));
                        }
                        self.add_class_range(&mut literals, lo, hi);
                    } else {
                        self.add_class_cp(&mut literals, lo);
                    }
                }
            }
            first = false;
        }

        Ok(combine(literals, parts))
    }

    /// A `-` forms a range only when something range-able follows.
    fn at_range_dash(&self) -> bool {
        if self.kind() != Some(TokenKind::Dash) {
            return false;
        }
        matches!(
            self.nth_kind(1),
            Some(
                TokenKind::Literal
                    | TokenKind::Whitespace
                    | TokenKind::Hash
                    | TokenKind::Dot
                    | TokenKind::Star
                    | TokenKind::Plus
                    | TokenKind::Question
                    | TokenKind::Pipe
                    | TokenKind::Dollar
                    | TokenKind::Caret
                    | TokenKind::Comma
                    | TokenKind::Dash
                    | TokenKind::BraceOpen
                    | TokenKind::BraceClose
                    | TokenKind::ParenOpen
                    | TokenKind::ParenClose
                    | TokenKind::EscapedLiteral
                    | TokenKind::ControlCharEscape
                    | TokenKind::HexEscape
                    | TokenKind::HexBraceEscape
                    | TokenKind::UniEscape
                    | TokenKind::CtrlEscape
                    | TokenKind::OctalEscape
            )
        )
    }

    /// One literal code point inside a class. Most metacharacters lose
    /// their meaning here.
    fn class_literal_cp(&mut self, token: Token) -> Result<u32, PatternError> {
        match token.kind {
            TokenKind::Literal
            | TokenKind::Whitespace
            | TokenKind::Hash
            | TokenKind::Dot
            | TokenKind::Star
            | TokenKind::Plus
            | TokenKind::Question
            | TokenKind::Pipe
            | TokenKind::Dollar
            | TokenKind::Caret
            | TokenKind::Comma
            | TokenKind::Dash
            | TokenKind::BraceOpen
            | TokenKind::BraceClose
            | TokenKind::ParenOpen
            | TokenKind::ParenClose
            | TokenKind::BracketClose => {
                let token = self.bump();
                Ok(self.text(&token).chars().next().expect("non-empty") as u32)
            }
            TokenKind::EscapedLiteral
            | TokenKind::ControlCharEscape
            | TokenKind::HexEscape
            | TokenKind::HexBraceEscape
            | TokenKind::UniEscape
            | TokenKind::CtrlEscape
            | TokenKind::OctalEscape => self.decode_single_cp(),
            _ => Err(self.error(SyntaxErrorKind::InvalidRange)),
        }
    }

    fn add_class_cp(&self, set: &mut CharSet, cp: u32) {
        set.add(cp);
        if self.flags.contains(Flags::CASE_INSENSITIVE) {
            for folded in fold_additions(cp, self.flags.contains(Flags::UNICODE_CASE)) {
                set.add(folded);
            }
        }
    }

    /// Ranges fold only when they sit inside the ASCII letters; arbitrary
    /// ranges are added verbatim.
    fn add_class_range(&self, set: &mut CharSet, lo: u32, hi: u32) {
        set.add_range(lo, hi);
        if self.flags.contains(Flags::CASE_INSENSITIVE) {
            let (a, z, upper_a, upper_z) = ('a' as u32, 'z' as u32, 'A' as u32, 'Z' as u32);
            if lo >= a && hi <= z {
                set.add_range(lo - 0x20, hi - 0x20);
            } else if lo >= upper_a && hi <= upper_z {
                set.add_range(lo + 0x20, hi + 0x20);
            }
        }
    }
}

fn combine(literals: CharSet, mut parts: Vec<ClassSet>) -> ClassSet {
    if parts.is_empty() {
        return ClassSet::Literal(literals);
    }
    if !literals.is_empty() {
        parts.insert(0, ClassSet::Literal(literals));
    }
    if parts.len() == 1 {
        return parts.pop().expect("len checked");
    }
    ClassSet::Union(parts)
}
