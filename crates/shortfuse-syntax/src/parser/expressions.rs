//! Alternation, concatenation, and quantifier application.

use rowan::TextRange;

use crate::error::{PatternError, SyntaxErrorKind};
use crate::flags::Flags;
use crate::graph::{NodeId, NodeKind, QuantMode, REP_UNBOUNDED, study};
use crate::lexer::TokenKind;

use super::core::{Fragment, Parser};

/// A parsed quantifier, before it is applied to an atom.
#[derive(Debug, Clone, Copy)]
pub(super) struct Quant {
    pub min: u32,
    pub max: u32,
    pub mode: QuantMode,
    pub span: TextRange,
    /// The leading metacharacter, for dangling-meta diagnostics.
    pub meta: char,
}

/// What a single step of the concatenation loop produced.
pub(super) enum SeqItem {
    /// Literal code points, candidates for slice collapsing.
    Literal(Vec<u32>, TextRange),
    /// A quantifiable non-literal atom.
    Target(QuantTarget),
    /// Contributed nothing (an inline-flags group).
    Nothing,
}

/// A quantifiable atom: either a plain fragment or a capturing-group
/// fragment whose bookkeeping the quantifier may take over.
pub(super) enum QuantTarget {
    Plain(Fragment),
    Group {
        frag: Fragment,
        local: u32,
        group: Option<u32>,
    },
}

impl QuantTarget {
    fn fragment(&self) -> Fragment {
        match self {
            QuantTarget::Plain(frag) => *frag,
            QuantTarget::Group { frag, .. } => *frag,
        }
    }
}

impl<'src> Parser<'src> {
    /// `expr := sequence ('|' sequence)*`
    pub(super) fn parse_alternation(&mut self) -> Result<Fragment, PatternError> {
        let start = self.offset();
        let first = self.parse_sequence()?;
        self.skip_trivia();
        if !self.at(TokenKind::Pipe) {
            return Ok(first);
        }

        let mut alts = vec![first];
        while self.eat(TokenKind::Pipe) {
            alts.push(self.parse_sequence()?);
            self.skip_trivia();
        }

        let here = TextRange::empty((self.offset() as u32).into());
        let conn = self.add_node(NodeKind::BranchConn, here);
        for alt in &alts {
            self.graph.set_next(alt.exit, conn);
        }
        let entries = alts.iter().map(|a| a.entry).collect();
        let branch = self.add_node(NodeKind::Branch { alts: entries, conn }, self.span_from(start));
        self.graph.set_next(branch, conn);
        Ok(Fragment::new(branch, conn))
    }

    /// `sequence := (atom quantifier?)*`, with literal runs collapsed into
    /// slice nodes.
    pub(super) fn parse_sequence(&mut self) -> Result<Fragment, PatternError> {
        let mut frags: Vec<Fragment> = Vec::new();
        let mut buf: Vec<u32> = Vec::new();
        let mut buf_start = self.offset();

        loop {
            self.skip_trivia();
            match self.kind() {
                None | Some(TokenKind::Pipe) | Some(TokenKind::ParenClose) => break,
                _ => {}
            }
            let item_start = self.offset();
            if buf.is_empty() {
                buf_start = item_start;
            }

            let item = self.parse_item()?;
            let quant = self.try_parse_quantifier()?;

            match (item, quant) {
                (SeqItem::Literal(cps, _), None) => buf.extend(cps),
                (SeqItem::Literal(cps, span), Some(q)) => {
                    // the quantifier binds only the last code point
                    let (&last, head) = cps.split_last().expect("literal items are non-empty");
                    buf.extend(head);
                    self.flush_literals(&mut buf, buf_start, item_start, &mut frags);
                    let ch = self.add_char(last, span);
                    let frag = self.apply_quantifier(QuantTarget::Plain(Fragment::single(ch)), q)?;
                    frags.push(frag);
                }
                (SeqItem::Target(target), None) => {
                    self.flush_literals(&mut buf, buf_start, item_start, &mut frags);
                    frags.push(target.fragment());
                }
                (SeqItem::Target(target), Some(q)) => {
                    self.flush_literals(&mut buf, buf_start, item_start, &mut frags);
                    let frag = self.apply_quantifier(target, q)?;
                    frags.push(frag);
                }
                (SeqItem::Nothing, Some(q)) => {
                    return Err(self.error_at(
                        SyntaxErrorKind::DanglingMeta(q.meta),
                        u32::from(q.span.start()) as usize,
                    ));
                }
                (SeqItem::Nothing, None) => {}
            }
        }

        let end = self.offset();
        self.flush_literals(&mut buf, buf_start, end, &mut frags);
        Ok(self.link_sequence(&frags))
    }

    /// One atom: literal code points stay symbolic so runs can collapse.
    fn parse_item(&mut self) -> Result<SeqItem, PatternError> {
        let token = self.current().expect("caller checked EOF");
        match token.kind {
            TokenKind::Literal
            | TokenKind::Whitespace
            | TokenKind::Hash
            | TokenKind::Dash
            | TokenKind::Comma
            | TokenKind::BraceClose
            | TokenKind::BracketClose => {
                let token = self.bump();
                let cp = self.text(&token).chars().next().expect("non-empty token") as u32;
                Ok(SeqItem::Literal(vec![cp], token.span))
            }
            TokenKind::AmpAmp => {
                let token = self.bump();
                Ok(SeqItem::Literal(vec!['&' as u32, '&' as u32], token.span))
            }
            TokenKind::EscapedLiteral
            | TokenKind::ControlCharEscape
            | TokenKind::HexEscape
            | TokenKind::HexBraceEscape
            | TokenKind::UniEscape
            | TokenKind::CtrlEscape
            | TokenKind::OctalEscape => {
                let start = self.offset();
                let cp = self.decode_single_cp()?;
                Ok(SeqItem::Literal(vec![cp], self.span_from(start)))
            }
            TokenKind::Garbage => Err(self.error(SyntaxErrorKind::TrailingBackslash)),
            _ => self.parse_atom(),
        }
    }

    /// `quantifier := ('?'|'*'|'+'|'{'m(',' n?)?'}') ('?'|'+')?`
    pub(super) fn try_parse_quantifier(&mut self) -> Result<Option<Quant>, PatternError> {
        self.skip_trivia();
        let Some(token) = self.current() else {
            return Ok(None);
        };
        let start = self.offset();
        let (min, max, meta) = match token.kind {
            TokenKind::Question => {
                self.bump();
                (0, 1, '?')
            }
            TokenKind::Star => {
                self.bump();
                (0, REP_UNBOUNDED, '*')
            }
            TokenKind::Plus => {
                self.bump();
                (1, REP_UNBOUNDED, '+')
            }
            TokenKind::BraceOpen => {
                self.bump();
                let (min, max) = self.parse_curly_bounds(start)?;
                (min, max, '{')
            }
            _ => return Ok(None),
        };

        self.skip_trivia();
        let mode = if self.eat(TokenKind::Question) {
            QuantMode::Lazy
        } else if self.eat(TokenKind::Plus) {
            QuantMode::Possessive
        } else {
            QuantMode::Greedy
        };

        Ok(Some(Quant {
            min,
            max,
            mode,
            span: self.span_from(start),
            meta,
        }))
    }

    /// `{m}`, `{m,}`, `{m,n}` — anything else is an illegal repetition.
    fn parse_curly_bounds(&mut self, start: usize) -> Result<(u32, u32), PatternError> {
        let illegal = |p: &Self| p.error_at(SyntaxErrorKind::IllegalRepetition, start);

        let min = self.parse_decimal().ok_or_else(|| illegal(self))?;
        let max = if self.eat(TokenKind::Comma) {
            match self.parse_decimal() {
                Some(n) => n,
                None => REP_UNBOUNDED,
            }
        } else {
            min
        };
        if !self.eat(TokenKind::BraceClose) {
            return Err(illegal(self));
        }
        if max != REP_UNBOUNDED && min > max {
            return Err(illegal(self));
        }
        Ok((min, max))
    }

    /// Consumes a run of ASCII digit tokens; `None` when the current token
    /// is not a digit. Saturates just below the unbounded sentinel.
    pub(super) fn parse_decimal(&mut self) -> Option<u32> {
        let mut value: Option<u64> = None;
        while let Some(token) = self.current() {
            if token.kind != TokenKind::Literal {
                break;
            }
            let text = self.text(&token);
            let Some(digit) = text.chars().next().and_then(|c| c.to_digit(10)) else {
                break;
            };
            value = Some(
                (value.unwrap_or(0) * 10 + u64::from(digit)).min(u64::from(REP_UNBOUNDED - 1)),
            );
            self.pos += 1;
        }
        value.map(|v| v as u32)
    }

    // --- literal collapsing -----------------------------------------------

    fn fold_flags(&self) -> (bool, bool) {
        let ci = self.flags.contains(Flags::CASE_INSENSITIVE);
        let uc = self.flags.contains(Flags::UNICODE_CASE);
        (ci, ci && uc)
    }

    /// Single code point node, honoring the case-fold mode.
    pub(super) fn add_char(&mut self, cp: u32, span: TextRange) -> NodeId {
        let (ci, unicode) = self.fold_flags();
        let kind = if ci && char::from_u32(cp).is_some_and(|c| c.is_ascii_alphabetic()) {
            let lo = cp | 0x20;
            NodeKind::CharFold { lo, up: lo - 0x20 }
        } else if unicode && !crate::charset::fold_additions(cp, true).is_empty() {
            NodeKind::CharUnicodeFold {
                folded: crate::charset::simple_fold(cp),
            }
        } else {
            NodeKind::Char { cp }
        };
        self.add_node(kind, span)
    }

    /// Multi-code-point slice node, honoring the case-fold mode.
    pub(super) fn add_slice(&mut self, chars: Vec<u32>, span: TextRange) -> NodeId {
        let (ci, unicode) = self.fold_flags();
        let kind = if unicode {
            NodeKind::SliceUnicodeFold {
                chars: chars.iter().map(|&c| crate::charset::simple_fold(c)).collect(),
            }
        } else if ci {
            NodeKind::SliceFold {
                chars: chars
                    .iter()
                    .map(|&c| {
                        if char::from_u32(c).is_some_and(|ch| ch.is_ascii_uppercase()) {
                            c | 0x20
                        } else {
                            c
                        }
                    })
                    .collect(),
            }
        } else {
            NodeKind::Slice { chars }
        };
        self.add_node(kind, span)
    }

    fn flush_literals(
        &mut self,
        buf: &mut Vec<u32>,
        start: usize,
        end: usize,
        frags: &mut Vec<Fragment>,
    ) {
        if buf.is_empty() {
            return;
        }
        let span = TextRange::new((start as u32).into(), (end as u32).into());
        let chars = std::mem::take(buf);
        let id = if chars.len() == 1 {
            self.add_char(chars[0], span)
        } else {
            self.add_slice(chars, span)
        };
        frags.push(Fragment::single(id));
    }

    // --- quantifier application -------------------------------------------

    /// Wraps an atom in the repetition machinery: `Ques` for 0-or-1,
    /// `Curly`/`GroupCurly` for deterministic bodies, `Prolog`+`Loop` for
    /// the rest. Possessive non-deterministic repetitions become a greedy
    /// loop inside an atomic group.
    pub(super) fn apply_quantifier(
        &mut self,
        target: QuantTarget,
        quant: Quant,
    ) -> Result<Fragment, PatternError> {
        let frag = target.fragment();
        let full_span = {
            let atom_span = self.graph.node(frag.entry).span;
            TextRange::new(atom_span.start(), quant.span.end())
        };
        self.seal(frag);

        if quant.min == 0 && quant.max == 1 {
            let ques = self.add_node(
                NodeKind::Ques {
                    atom: frag.entry,
                    mode: quant.mode,
                },
                full_span,
            );
            return Ok(Fragment::single(ques));
        }

        let info = study(&self.graph, frag.entry, None);

        match target {
            QuantTarget::Group { frag, local, group } if info.deterministic => {
                // the curly takes over the group's bookkeeping: the body is
                // entered past the head, and the tail sees an unset local
                // and acts as a plain sub-match accept
                let body = self.graph.node(frag.entry).next;
                let id = self.add_node(
                    NodeKind::GroupCurly {
                        atom: body,
                        min: quant.min,
                        max: quant.max,
                        mode: quant.mode,
                        local,
                        group: group.unwrap_or(0),
                        capture: group.is_some(),
                    },
                    full_span,
                );
                Ok(Fragment::single(id))
            }
            QuantTarget::Plain(frag) if info.deterministic => {
                let id = self.add_node(
                    NodeKind::Curly {
                        atom: frag.entry,
                        min: quant.min,
                        max: quant.max,
                        mode: quant.mode,
                    },
                    full_span,
                );
                Ok(Fragment::single(id))
            }
            _ => Ok(self.build_loop(frag, quant, full_span)),
        }
    }

    fn build_loop(&mut self, frag: Fragment, quant: Quant, span: TextRange) -> Fragment {
        let count_local = self.next_local();
        let begin_local = self.next_local();
        let loop_id = self.add_node(
            NodeKind::Loop {
                body: frag.entry,
                min: quant.min,
                max: quant.max,
                lazy: quant.mode == QuantMode::Lazy,
                count_local,
                begin_local,
            },
            span,
        );
        // the body's terminal cycles back to its controller
        self.graph.set_next(frag.exit, loop_id);
        let prolog = self.add_node(NodeKind::Prolog { loop_node: loop_id }, span);
        self.graph.set_next(prolog, loop_id);

        if quant.mode == QuantMode::Possessive {
            // X*+ ≡ (?>X*): commit the greedy loop's first answer
            let atomic = self.add_node(NodeKind::Atomic { body: prolog }, span);
            return Fragment::single(atomic);
        }
        Fragment::new(prolog, loop_id)
    }
}
