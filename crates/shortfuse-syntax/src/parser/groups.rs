//! Group bodies: capturing, non-capturing, named, atomic, lookaround, and
//! inline flag modifiers.

use rowan::TextRange;

use crate::error::{PatternError, SyntaxErrorKind};
use crate::flags::Flags;
use crate::graph::{ACCEPT, NodeKind, study};
use crate::lexer::TokenKind;

use super::core::{Fragment, Parser};
use super::expressions::{QuantTarget, SeqItem};

impl<'src> Parser<'src> {
    /// Parses a parenthesized group. The opening `(` is current.
    pub(super) fn parse_group(&mut self) -> Result<SeqItem, PatternError> {
        let start = self.offset();
        self.bump(); // '('
        self.enter_recursion()?;
        let result = self.parse_group_inner(start);
        self.exit_recursion();
        result
    }

    fn parse_group_inner(&mut self, start: usize) -> Result<SeqItem, PatternError> {
        self.skip_trivia();
        if !self.eat(TokenKind::Question) {
            return self.parse_capturing(start, None);
        }

        match self.current_char() {
            Some(':') => {
                self.bump();
                let frag = self.parse_scoped_body(start, self.flags)?;
                Ok(SeqItem::Target(QuantTarget::Plain(frag)))
            }
            Some('=') => {
                self.bump();
                self.parse_lookahead(start, false)
            }
            Some('!') => {
                self.bump();
                self.parse_lookahead(start, true)
            }
            Some('>') => {
                self.bump();
                let body = self.parse_scoped_body(start, self.flags)?;
                self.seal(body);
                let id = self.add_node(NodeKind::Atomic { body: body.entry }, self.span_from(start));
                Ok(SeqItem::Target(QuantTarget::Plain(Fragment::single(id))))
            }
            Some('<') => {
                self.bump();
                match self.current_char() {
                    Some('=') => {
                        self.bump();
                        self.parse_lookbehind(start, false)
                    }
                    Some('!') => {
                        self.bump();
                        self.parse_lookbehind(start, true)
                    }
                    Some(c) if c.is_ascii_alphabetic() => {
                        let name = self.parse_group_name(start)?;
                        self.parse_capturing(start, Some(name))
                    }
                    _ => Err(self.error(SyntaxErrorKind::InvalidGroupName)),
                }
            }
            Some(c) if c == '-' || Flags::from_letter(c).is_some() => self.parse_inline_flags(start),
            _ => Err(self.error(SyntaxErrorKind::UnknownGroupType)),
        }
    }

    /// `(...)` or `(?<name>...)`: allocates the group index in source order
    /// of `(` and wraps the body in head/tail bookkeeping nodes.
    fn parse_capturing(
        &mut self,
        start: usize,
        name: Option<String>,
    ) -> Result<SeqItem, PatternError> {
        self.group_count += 1;
        let group = self.group_count;
        self.closed.push(false);
        let local = self.next_local();

        let open_span = TextRange::new((start as u32).into(), ((start + 1) as u32).into());
        let head = self.add_node(NodeKind::GroupHead { local }, open_span);

        let body = self.parse_scoped_body(start, self.flags)?;

        let tail = self.add_node(NodeKind::GroupTail { local, group }, self.span_from(start));
        self.graph.set_next(head, body.entry);
        self.graph.set_next(body.exit, tail);
        self.closed[group as usize] = true;
        if let Some(name) = name {
            // registered on close: a reference inside the group's own body
            // does not resolve
            self.group_names.insert(name, group);
        }

        Ok(SeqItem::Target(QuantTarget::Group {
            frag: Fragment::new(head, tail),
            local,
            group: Some(group),
        }))
    }

    /// Body + closing `)`, with the caller's flags restored afterwards so
    /// inline modifiers stay scoped to their group.
    fn parse_scoped_body(&mut self, start: usize, saved: Flags) -> Result<Fragment, PatternError> {
        let body = self.parse_alternation();
        self.flags = saved;
        let body = body?;
        if !self.eat(TokenKind::ParenClose) {
            return Err(self.error_at(SyntaxErrorKind::UnclosedGroup, start));
        }
        Ok(body)
    }

    fn parse_lookahead(&mut self, start: usize, negative: bool) -> Result<SeqItem, PatternError> {
        let cond = self.parse_scoped_body(start, self.flags)?;
        self.seal(cond);
        let id = self.add_node(
            NodeKind::LookAhead {
                cond: cond.entry,
                negative,
            },
            self.span_from(start),
        );
        Ok(SeqItem::Target(QuantTarget::Plain(Fragment::single(id))))
    }

    fn parse_lookbehind(&mut self, start: usize, negative: bool) -> Result<SeqItem, PatternError> {
        let cond = self.parse_scoped_body(start, self.flags)?;
        // the condition must end exactly where the look-behind was evaluated
        let end_span = TextRange::empty((self.offset() as u32).into());
        let end = self.add_node(NodeKind::LookBehindEnd, end_span);
        self.graph.set_next(cond.exit, end);
        self.graph.set_next(end, ACCEPT);

        let info = study(&self.graph, cond.entry, None);
        if !info.max_valid {
            return Err(self.error_at(SyntaxErrorKind::UnboundedLookBehind, start));
        }
        let id = self.add_node(
            NodeKind::LookBehind {
                cond: cond.entry,
                negative,
                min: info.min_length as u32,
                max: info.max_length as u32,
            },
            self.span_from(start),
        );
        Ok(SeqItem::Target(QuantTarget::Plain(Fragment::single(id))))
    }

    /// `(?<name>` — the `<` is consumed, the first letter is current.
    fn parse_group_name(&mut self, start: usize) -> Result<String, PatternError> {
        let mut name = String::new();
        while let Some(c) = self.current_char() {
            if c.is_ascii_alphanumeric() {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if !self.eat_char('>') {
            return Err(self.error(SyntaxErrorKind::InvalidGroupName));
        }
        if self.group_names.contains_key(&name) {
            return Err(self.error_at(SyntaxErrorKind::DuplicateGroupName(name), start));
        }
        Ok(name)
    }

    /// `(?flags)` mutates the current scope; `(?flags:...)` mutates only
    /// its own body. `-` switches subsequent letters to clearing.
    fn parse_inline_flags(&mut self, start: usize) -> Result<SeqItem, PatternError> {
        let mut on = Flags::EMPTY;
        let mut off = Flags::EMPTY;
        let mut negating = false;

        loop {
            match self.current_char() {
                Some(')') => {
                    self.bump();
                    self.flags.insert(on);
                    self.flags.remove(off);
                    return Ok(SeqItem::Nothing);
                }
                Some(':') => {
                    self.bump();
                    let saved = self.flags;
                    self.flags.insert(on);
                    self.flags.remove(off);
                    let frag = self.parse_scoped_body(start, saved)?;
                    return Ok(SeqItem::Target(QuantTarget::Plain(frag)));
                }
                Some('-') if !negating => {
                    self.bump();
                    negating = true;
                }
                Some(c) => match Flags::from_letter(c) {
                    Some(flag) => {
                        self.bump();
                        if negating {
                            off.insert(flag);
                        } else {
                            on.insert(flag);
                        }
                    }
                    None => return Err(self.error(SyntaxErrorKind::UnknownFlag(c))),
                },
                None => return Err(self.error_at(SyntaxErrorKind::UnclosedGroup, start)),
            }
        }
    }

    /// The single character of the current token, for the `(?...` grammar
    /// where `:=!<>` and flag letters all lex as ordinary tokens.
    fn current_char(&self) -> Option<char> {
        let token = self.current()?;
        let text = self.text(&token);
        let mut chars = text.chars();
        let first = chars.next()?;
        chars.next().is_none().then_some(first)
    }

    fn eat_char(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }
}
