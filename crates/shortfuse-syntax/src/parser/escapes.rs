//! Escape-sequence decoding, shared by atom and class contexts.

use std::sync::Arc;

use crate::charset::{CharSet, MAX_CODE_POINT, PredicateSet};
use crate::error::{PatternError, SyntaxErrorKind};
use crate::flags::Flags;
use crate::graph::ClassSet;
use crate::lexer::TokenKind;

use super::core::Parser;

impl<'src> Parser<'src> {
    /// Decodes the current token as a single literal code point, consuming
    /// it (and a paired low surrogate for `𐀀` forms).
    pub(super) fn decode_single_cp(&mut self) -> Result<u32, PatternError> {
        let at = self.offset();
        let token = self.bump();
        let text = self.text(&token);
        match token.kind {
            TokenKind::EscapedLiteral => {
                let ch = text[1..].chars().next().expect("escape has a payload");
                if ch == '0' {
                    Err(self.error_at(SyntaxErrorKind::IllegalOctalEscape, at))
                } else if ch == 'p' || ch == 'P' {
                    // a property escape that the lexer could not close
                    Err(self.error_at(SyntaxErrorKind::UnclosedProperty, at))
                } else if ch == 'x' || ch == 'u' {
                    Err(self.error_at(SyntaxErrorKind::IllegalHexEscape, at))
                } else if ch == 'c' {
                    Err(self.error_at(SyntaxErrorKind::IllegalControlEscape, at))
                } else if ch.is_ascii_alphanumeric() {
                    Err(self.error_at(SyntaxErrorKind::UnknownEscape(ch), at))
                } else {
                    Ok(ch as u32)
                }
            }
            TokenKind::ControlCharEscape => Ok(match &text[1..] {
                "n" => 0x0A,
                "r" => 0x0D,
                "t" => 0x09,
                "f" => 0x0C,
                "a" => 0x07,
                "e" => 0x1B,
                other => unreachable!("unexpected control escape {:?}", other),
            }),
            TokenKind::HexEscape => u32::from_str_radix(&text[2..], 16)
                .map_err(|_| self.error_at(SyntaxErrorKind::IllegalHexEscape, at)),
            TokenKind::HexBraceEscape => {
                let digits = &text[3..text.len() - 1];
                let cp = u32::from_str_radix(digits, 16)
                    .map_err(|_| self.error_at(SyntaxErrorKind::IllegalHexEscape, at))?;
                if cp > MAX_CODE_POINT {
                    return Err(self.error_at(SyntaxErrorKind::IllegalHexEscape, at));
                }
                Ok(cp)
            }
            TokenKind::UniEscape => {
                let cp = u32::from_str_radix(&text[2..], 16)
                    .map_err(|_| self.error_at(SyntaxErrorKind::IllegalHexEscape, at))?;
                // surrogate pairing: a high surrogate joins a following \uDC00..\uDFFF
                if (0xD800..=0xDBFF).contains(&cp) {
                    if let Some(next) = self.current() {
                        if next.kind == TokenKind::UniEscape {
                            let lo = u32::from_str_radix(&self.text(&next)[2..], 16)
                                .map_err(|_| self.error_at(SyntaxErrorKind::IllegalHexEscape, at))?;
                            if (0xDC00..=0xDFFF).contains(&lo) {
                                self.bump();
                                return Ok(0x10000 + ((cp - 0xD800) << 10) + (lo - 0xDC00));
                            }
                        }
                    }
                }
                Ok(cp)
            }
            TokenKind::CtrlEscape => {
                let ch = text[2..].chars().next().expect("\\c has a payload");
                if ch.is_ascii() {
                    Ok((ch as u32) ^ 0x40)
                } else {
                    Err(self.error_at(SyntaxErrorKind::IllegalControlEscape, at))
                }
            }
            TokenKind::OctalEscape => u32::from_str_radix(&text[2..], 8)
                .map_err(|_| self.error_at(SyntaxErrorKind::IllegalOctalEscape, at)),
            other => unreachable!("not a single-cp escape: {:?}", other),
        }
    }

    /// `\d \D \w \W \s \S \h \H \v \V`, consuming the token. Definitions
    /// widen to their Unicode versions under the UNICODE_CLASS flag.
    pub(super) fn decode_class_escape(&mut self) -> ClassSet {
        let token = self.bump();
        let letter = self.text(&token)[1..]
            .chars()
            .next()
            .expect("class escape has a payload");
        let unicode = self.flags.contains(Flags::UNICODE_CLASS);

        let base = match letter.to_ascii_lowercase() {
            'd' if unicode => ClassSet::Predicate(
                PredicateSet::new(
                    "Nd",
                    Arc::new(|cp: u32| char::from_u32(cp).is_some_and(char::is_numeric)),
                )
                .with_default_hint('0' as u32),
            ),
            'd' => ClassSet::Literal(CharSet::range('0' as u32, '9' as u32)),
            'w' if unicode => ClassSet::Predicate(
                PredicateSet::new(
                    "Word",
                    Arc::new(|cp: u32| {
                        char::from_u32(cp).is_some_and(|c| c.is_alphanumeric() || c == '_')
                    }),
                )
                .with_default_hint('a' as u32),
            ),
            'w' => ClassSet::Literal(word_chars()),
            's' if unicode => ClassSet::Predicate(
                PredicateSet::new(
                    "Space",
                    Arc::new(|cp: u32| char::from_u32(cp).is_some_and(char::is_whitespace)),
                )
                .with_default_hint(' ' as u32),
            ),
            's' => ClassSet::Literal(space_chars()),
            'h' => ClassSet::Literal(horizontal_space_chars()),
            'v' => ClassSet::Literal(vertical_space_chars()),
            other => unreachable!("unexpected class escape \\{}", other),
        };

        if letter.is_ascii_uppercase() {
            ClassSet::Complement(Box::new(base))
        } else {
            base
        }
    }

    /// `\p{name}` / `\P{name}` / `\pL`, consuming the token.
    pub(super) fn decode_property(&mut self) -> Result<ClassSet, PatternError> {
        let at = self.offset();
        let token = self.bump();
        let text = self.text(&token);
        let negated = text.as_bytes()[1] == b'P';
        let name = if token.kind == TokenKind::PropertyEscape {
            &text[3..text.len() - 1]
        } else {
            &text[2..]
        };
        if name.is_empty() {
            return Err(self.error_at(SyntaxErrorKind::UnknownProperty(String::new()), at));
        }

        let resolved = self
            .oracle
            .resolve(name)
            .ok_or_else(|| self.error_at(SyntaxErrorKind::UnknownProperty(name.to_string()), at))?;
        let set = if negated { resolved.negate() } else { resolved };
        Ok(ClassSet::Predicate(set))
    }
}

/// `\w`: `[a-zA-Z0-9_]`
pub(super) fn word_chars() -> CharSet {
    let mut set = CharSet::new();
    set.add_range('a' as u32, 'z' as u32);
    set.add_range('A' as u32, 'Z' as u32);
    set.add_range('0' as u32, '9' as u32);
    set.add('_' as u32);
    set
}

/// `\s`: `[ \t\n\x0B\f\r]`
pub(super) fn space_chars() -> CharSet {
    let mut set = CharSet::new();
    set.add(' ' as u32);
    set.add_range(0x09, 0x0D);
    set
}

/// `\h`: horizontal whitespace
pub(super) fn horizontal_space_chars() -> CharSet {
    let mut set = CharSet::new();
    set.add(' ' as u32);
    set.add(0x09);
    set.add(0xA0);
    set.add(0x1680);
    set.add(0x180E);
    set.add_range(0x2000, 0x200A);
    set.add(0x202F);
    set.add(0x205F);
    set.add(0x3000);
    set
}

/// `\v`: vertical whitespace
pub(super) fn vertical_space_chars() -> CharSet {
    let mut set = CharSet::new();
    set.add_range(0x0A, 0x0D);
    set.add(0x85);
    set.add_range(0x2028, 0x2029);
    set
}
