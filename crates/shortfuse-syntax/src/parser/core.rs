//! Parser state machine and low-level operations.

use indexmap::IndexMap;
use rowan::TextRange;

use crate::error::{PatternError, SyntaxErrorKind};
use crate::flags::Flags;
use crate::graph::{ACCEPT, Graph, LAST_ACCEPT, NodeId, NodeKind};
use crate::lexer::{Token, TokenKind, lex, token_text};
use crate::unicode::PropertyOracle;

/// Deepest group nesting accepted before bailing out.
const MAX_DEPTH: u32 = 250;

/// A sub-graph with a single entry and a single unlinked exit: the exit
/// node's `next` is where the continuation gets attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub entry: NodeId,
    pub exit: NodeId,
}

impl Fragment {
    pub fn new(entry: NodeId, exit: NodeId) -> Fragment {
        Fragment { entry, exit }
    }

    pub fn single(node: NodeId) -> Fragment {
        Fragment {
            entry: node,
            exit: node,
        }
    }
}

/// Everything the parser hands to `Pattern` once the text is consumed.
#[derive(Debug)]
pub(crate) struct ParsedPattern {
    pub graph: Graph,
    /// Entry for anchored matching; the chain ends at `LAST_ACCEPT`.
    pub match_root: NodeId,
    pub group_count: u32,
    pub local_count: u32,
    pub group_names: IndexMap<String, u32>,
    pub flags: Flags,
}

pub(crate) struct Parser<'src> {
    pub(super) source: &'src str,
    pub(super) tokens: Vec<Token>,
    pub(super) pos: usize,
    pub(super) flags: Flags,
    pub(super) graph: Graph,
    /// Total capturing groups seen, in source order of `(`.
    pub(super) group_count: u32,
    /// `closed[g]` once group `g`'s `)` has been consumed; back-references
    /// may only name closed groups.
    pub(super) closed: Vec<bool>,
    pub(super) local_count: u32,
    pub(super) group_names: IndexMap<String, u32>,
    pub(super) oracle: &'src dyn PropertyOracle,
    depth: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, flags: Flags, oracle: &'src dyn PropertyOracle) -> Parser<'src> {
        Parser {
            source,
            tokens: lex(source),
            pos: 0,
            flags,
            graph: Graph::new(),
            group_count: 0,
            closed: vec![true], // group 0 is the whole match
            local_count: 0,
            group_names: IndexMap::new(),
            oracle,
            depth: 0,
        }
    }

    pub fn parse(mut self) -> Result<ParsedPattern, PatternError> {
        let frag = if self.flags.contains(Flags::LITERAL) {
            self.literal_pattern()
        } else {
            let frag = self.parse_alternation()?;
            if !self.eof() {
                // the only token parse_alternation refuses to consume
                return Err(self.error(SyntaxErrorKind::UnmatchedParen));
            }
            frag
        };
        self.graph.set_next(frag.exit, LAST_ACCEPT);
        Ok(ParsedPattern {
            graph: self.graph,
            match_root: frag.entry,
            group_count: self.group_count,
            local_count: self.local_count,
            group_names: self.group_names,
            flags: self.flags,
        })
    }

    /// LITERAL flag: the whole pattern is one literal run.
    fn literal_pattern(&mut self) -> Fragment {
        let chars: Vec<u32> = self.source.chars().map(|c| c as u32).collect();
        let span = TextRange::new(0.into(), (self.source.len() as u32).into());
        let id = if chars.is_empty() {
            self.graph.add(NodeKind::Empty, span)
        } else {
            self.add_slice(chars, span)
        };
        Fragment::single(id)
    }

    // --- token access -----------------------------------------------------

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn current(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    pub(super) fn kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    pub(super) fn nth_kind(&self, lookahead: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + lookahead).map(|t| t.kind)
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == Some(kind)
    }

    pub(super) fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn text(&self, token: &Token) -> &'src str {
        token_text(self.source, token)
    }

    /// Re-injects the unconsumed tail of an already-bumped token as
    /// per-code-point `Literal` tokens (a back-reference that only resolves
    /// for a prefix of its digits hands the rest back).
    pub(super) fn rewind_within(&mut self, token: Token, consumed_bytes: usize) {
        let start = u32::from(token.span.start()) as usize + consumed_bytes;
        let end = u32::from(token.span.end()) as usize;
        let mut insert_at = self.pos;
        for (offset, ch) in self.source[start..end].char_indices() {
            let lo = (start + offset) as u32;
            let hi = lo + ch.len_utf8() as u32;
            self.tokens.insert(
                insert_at,
                Token::new(TokenKind::Literal, TextRange::new(lo.into(), hi.into())),
            );
            insert_at += 1;
        }
    }

    /// Byte offset of the current token, or the pattern end at EOF.
    pub(super) fn offset(&self) -> usize {
        self.current()
            .map(|t| u32::from(t.span.start()) as usize)
            .unwrap_or(self.source.len())
    }

    /// Span from a recorded start offset up to the current position.
    pub(super) fn span_from(&self, start: usize) -> TextRange {
        TextRange::new((start as u32).into(), (self.offset() as u32).into())
    }

    /// COMMENTS mode: unescaped whitespace and `#`-to-end-of-line runs are
    /// insignificant everywhere in the pattern.
    pub(super) fn skip_trivia(&mut self) {
        if !self.flags.contains(Flags::COMMENTS) {
            return;
        }
        while let Some(token) = self.current() {
            match token.kind {
                TokenKind::Whitespace => {
                    self.pos += 1;
                }
                TokenKind::Hash => {
                    self.pos += 1;
                    while let Some(t) = self.current() {
                        let is_newline =
                            t.kind == TokenKind::Whitespace && self.text(&t).contains('\n');
                        self.pos += 1;
                        if is_newline {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    // --- errors -----------------------------------------------------------

    pub(super) fn error(&self, kind: SyntaxErrorKind) -> PatternError {
        self.error_at(kind, self.offset())
    }

    pub(super) fn error_at(&self, kind: SyntaxErrorKind, position: usize) -> PatternError {
        PatternError::new(kind, self.source, position)
    }

    // --- graph helpers ----------------------------------------------------

    pub(super) fn add_node(&mut self, kind: NodeKind, span: TextRange) -> NodeId {
        self.graph.add(kind, span)
    }

    /// Links a chain of fragments into one. Empty input produces an
    /// `Empty` node at the current position.
    pub(super) fn link_sequence(&mut self, frags: &[Fragment]) -> Fragment {
        match frags {
            [] => {
                let span = TextRange::empty((self.offset() as u32).into());
                Fragment::single(self.add_node(NodeKind::Empty, span))
            }
            [only] => *only,
            [first, rest @ ..] => {
                let mut exit = first.exit;
                for frag in rest {
                    self.graph.set_next(exit, frag.entry);
                    exit = frag.exit;
                }
                Fragment::new(first.entry, exit)
            }
        }
    }

    /// Terminates a fragment's exit at `ACCEPT`, isolating it as a
    /// quantifier body.
    pub(super) fn seal(&mut self, frag: Fragment) {
        self.graph.set_next(frag.exit, ACCEPT);
    }

    pub(super) fn next_local(&mut self) -> u32 {
        let local = self.local_count;
        self.local_count += 1;
        local
    }

    // --- recursion guard --------------------------------------------------

    pub(super) fn enter_recursion(&mut self) -> Result<(), PatternError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(SyntaxErrorKind::NestedTooDeep));
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
