//! Atom dispatch: anchors, classes, references, and the error cases.

use crate::error::{PatternError, SyntaxErrorKind};
use crate::flags::Flags;
use crate::graph::{BoundMode, FoldMode, NodeKind};
use crate::lexer::TokenKind;

use super::core::{Fragment, Parser};
use super::expressions::{QuantTarget, SeqItem};

impl<'src> Parser<'src> {
    /// Parses one non-literal atom. Literal code points never reach here;
    /// the sequence loop handles them for slice collapsing.
    pub(super) fn parse_atom(&mut self) -> Result<SeqItem, PatternError> {
        let token = self.current().expect("caller checked EOF");
        let start = self.offset();
        match token.kind {
            TokenKind::ParenOpen => self.parse_group(),

            TokenKind::BracketOpen => {
                let set = self.parse_class()?;
                let id = self.add_node(NodeKind::Class { set }, self.span_from(start));
                Ok(plain(id))
            }

            TokenKind::Dot => {
                let token = self.bump();
                let id = self.add_node(
                    NodeKind::Dot {
                        dotall: self.flags.contains(Flags::DOTALL),
                        unix_lines: self.flags.contains(Flags::UNIX_LINES),
                    },
                    token.span,
                );
                Ok(plain(id))
            }

            TokenKind::Caret => {
                let token = self.bump();
                let kind = if self.flags.contains(Flags::MULTILINE) {
                    NodeKind::Caret {
                        unix: self.flags.contains(Flags::UNIX_LINES),
                    }
                } else {
                    NodeKind::Begin
                };
                Ok(plain(self.add_node(kind, token.span)))
            }

            TokenKind::Dollar => {
                let token = self.bump();
                let id = self.add_node(
                    NodeKind::Dollar {
                        unix: self.flags.contains(Flags::UNIX_LINES),
                        multiline: self.flags.contains(Flags::MULTILINE),
                    },
                    token.span,
                );
                Ok(plain(id))
            }

            TokenKind::ClassEscape => {
                let set = self.decode_class_escape();
                let id = self.add_node(NodeKind::Class { set }, self.span_from(start));
                Ok(plain(id))
            }

            TokenKind::AnchorEscape => {
                let token = self.bump();
                let kind = match &self.text(&token)[1..] {
                    "b" => NodeKind::WordBoundary {
                        mode: BoundMode::Both,
                    },
                    "B" => NodeKind::WordBoundary {
                        mode: BoundMode::None,
                    },
                    "A" => NodeKind::Begin,
                    "Z" => NodeKind::Dollar {
                        unix: self.flags.contains(Flags::UNIX_LINES),
                        multiline: false,
                    },
                    "z" => NodeKind::End,
                    "G" => NodeKind::LastMatch,
                    other => unreachable!("unexpected anchor escape \\{}", other),
                };
                Ok(plain(self.add_node(kind, token.span)))
            }

            TokenKind::LineBreakEscape => {
                let token = self.bump();
                Ok(plain(self.add_node(NodeKind::LineBreak, token.span)))
            }

            TokenKind::BackRefEscape => self.parse_backref(),

            TokenKind::NamedBackRefEscape => {
                let token = self.bump();
                let text = self.text(&token);
                let name = &text[3..text.len() - 1];
                let Some(&group) = self.group_names.get(name) else {
                    return Err(
                        self.error_at(SyntaxErrorKind::NoSuchGroup(name.to_string()), start)
                    );
                };
                let id = self.add_node(
                    NodeKind::BackRef {
                        group,
                        fold: self.fold_mode(),
                    },
                    token.span,
                );
                Ok(plain(id))
            }

            TokenKind::PropertyEscape | TokenKind::PropertyShortEscape => {
                let set = self.decode_property()?;
                let id = self.add_node(NodeKind::Class { set }, self.span_from(start));
                Ok(plain(id))
            }

            TokenKind::Star => Err(self.error(SyntaxErrorKind::DanglingMeta('*'))),
            TokenKind::Plus => Err(self.error(SyntaxErrorKind::DanglingMeta('+'))),
            TokenKind::Question => Err(self.error(SyntaxErrorKind::DanglingMeta('?'))),
            TokenKind::BraceOpen => Err(self.error(SyntaxErrorKind::IllegalRepetition)),
            TokenKind::QuoteEnd => Err(self.error(SyntaxErrorKind::UnknownEscape('E'))),
            TokenKind::Garbage => Err(self.error(SyntaxErrorKind::TrailingBackslash)),

            other => unreachable!("unhandled token kind {:?}", other),
        }
    }

    /// Numeric back-reference: digits are consumed greedily for as long as
    /// the resulting group has already been closed; leftover digits are
    /// literals handled by the next sequence step.
    fn parse_backref(&mut self) -> Result<SeqItem, PatternError> {
        let start = self.offset();
        let token = self.bump();
        let digits = &self.text(&token)[1..];

        let mut group: u32 = 0;
        let mut used = 0;
        for ch in digits.chars() {
            let candidate = group * 10 + ch.to_digit(10).expect("backref digits");
            if candidate as usize >= self.closed.len() || !self.closed[candidate as usize] {
                break;
            }
            group = candidate;
            used += 1;
        }
        if used == 0 {
            return Err(self.error_at(
                SyntaxErrorKind::NoSuchGroup(digits.to_string()),
                start,
            ));
        }
        // hand unconsumed digits back to the token stream
        let consumed_len = 1 + used;
        if consumed_len < self.text(&token).len() {
            self.rewind_within(token, consumed_len);
        }

        let span = rowan::TextRange::new(
            token.span.start(),
            ((u32::from(token.span.start()) as usize + consumed_len) as u32).into(),
        );
        let id = self.add_node(
            NodeKind::BackRef {
                group,
                fold: self.fold_mode(),
            },
            span,
        );
        Ok(plain(id))
    }

    pub(super) fn fold_mode(&self) -> FoldMode {
        if !self.flags.contains(Flags::CASE_INSENSITIVE) {
            FoldMode::None
        } else if self.flags.contains(Flags::UNICODE_CASE) {
            FoldMode::Unicode
        } else {
            FoldMode::Ascii
        }
    }
}

fn plain(id: crate::graph::NodeId) -> SeqItem {
    SeqItem::Target(QuantTarget::Plain(Fragment::single(id)))
}
