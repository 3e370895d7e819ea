//! Compiled patterns.
//!
//! A `Pattern` owns the match-node graph, the analyzer wiring side table,
//! and the group metadata. It is immutable once built and may be shared
//! freely across threads; all mutable match state lives in the engine's
//! per-call scratch object.

use std::sync::Arc;

use indexmap::IndexMap;
use rowan::TextRange;

use crate::error::PatternError;
use crate::flags::Flags;
use crate::graph::{Graph, NodeId, NodeKind, Wiring, study, wire};
use crate::parser::Parser;
use crate::unicode::{BuiltinProperties, PropertyOracle};

/// A compiled regular expression: the parser's output plus everything the
/// interpreter and analyzer need to walk it.
#[derive(Debug)]
pub struct Pattern {
    pattern: String,
    flags: Flags,
    graph: Graph,
    /// Entry for unanchored searching (a `Start` driver or a Boyer-Moore
    /// scanner when the pattern leads with a long literal).
    root: NodeId,
    /// Entry for anchored matching.
    match_root: NodeId,
    group_count: u32,
    local_count: u32,
    group_names: IndexMap<String, u32>,
    wiring: Wiring,
    min_length: usize,
}

impl Pattern {
    /// Compiles with default flags and the built-in property oracle.
    pub fn new(pattern: &str) -> Result<Pattern, PatternError> {
        PatternBuilder::new().compile(pattern)
    }

    pub fn with_flags(pattern: &str, flags: Flags) -> Result<Pattern, PatternError> {
        PatternBuilder::new().flags(flags).compile(pattern)
    }

    pub fn builder() -> PatternBuilder {
        PatternBuilder::new()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn match_root(&self) -> NodeId {
        self.match_root
    }

    /// Number of capturing groups, excluding group 0 (the whole match).
    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Scratch slots the interpreter must provision per match call.
    pub fn local_count(&self) -> u32 {
        self.local_count
    }

    pub fn group_names(&self) -> &IndexMap<String, u32> {
        &self.group_names
    }

    pub fn group_index(&self, name: &str) -> Option<u32> {
        self.group_names.get(name).copied()
    }

    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    /// Fewest code points any match consumes; the unanchored starter stops
    /// searching `min_length` short of the region end.
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Builder carrying flags and the property oracle collaborator.
#[derive(Clone)]
pub struct PatternBuilder {
    flags: Flags,
    oracle: Arc<dyn PropertyOracle>,
}

impl Default for PatternBuilder {
    fn default() -> Self {
        PatternBuilder::new()
    }
}

impl PatternBuilder {
    pub fn new() -> PatternBuilder {
        PatternBuilder {
            flags: Flags::EMPTY,
            oracle: Arc::new(BuiltinProperties),
        }
    }

    pub fn flags(mut self, flags: Flags) -> PatternBuilder {
        self.flags = flags;
        self
    }

    /// Replaces the built-in `\p{...}` name resolver.
    pub fn oracle(mut self, oracle: Arc<dyn PropertyOracle>) -> PatternBuilder {
        self.oracle = oracle;
        self
    }

    pub fn compile(&self, pattern: &str) -> Result<Pattern, PatternError> {
        let parsed = Parser::new(pattern, self.flags, self.oracle.as_ref()).parse()?;
        let mut graph = parsed.graph;
        let match_root = parsed.match_root;

        let info = study(&graph, match_root, None);
        let min_length = usize::try_from(info.min_length).unwrap_or(usize::MAX);

        // a long leading literal upgrades the unanchored search to a
        // Boyer-Moore scan; the anchored entry keeps the plain slice
        let leading_slice = match &graph.node(match_root).kind {
            NodeKind::Slice { chars } if chars.len() > 3 => Some(chars.clone()),
            _ => None,
        };
        let root = match leading_slice {
            Some(chars) => {
                let (last_occ, good_suffix) = boyer_moore_tables(&chars);
                let span = graph.node(match_root).span;
                let next = graph.node(match_root).next;
                let bm = graph.add(
                    NodeKind::SliceBoyerMoore {
                        chars,
                        last_occ,
                        good_suffix,
                    },
                    span,
                );
                graph.set_next(bm, next);
                bm
            }
            None => {
                let span = TextRange::empty(0.into());
                let start = graph.add(NodeKind::Start { min_length }, span);
                graph.set_next(start, match_root);
                start
            }
        };

        let wiring = wire(&graph, match_root);

        Ok(Pattern {
            pattern: pattern.to_string(),
            flags: parsed.flags,
            graph,
            root,
            match_root,
            group_count: parsed.group_count,
            local_count: parsed.local_count,
            group_names: parsed.group_names,
            wiring,
            min_length,
        })
    }
}

/// Bad-character and good-suffix shift tables. `last_occ` is indexed by the
/// low 7 bits of the code point; the final good-suffix slot is pinned to 1
/// so the scan always advances.
fn boyer_moore_tables(chars: &[u32]) -> (Vec<i32>, Vec<usize>) {
    let n = chars.len();
    let mut last_occ = vec![0i32; 128];
    for (i, &c) in chars.iter().enumerate() {
        last_occ[(c & 0x7F) as usize] = (i + 1) as i32;
    }

    let mut opto_sft = vec![0usize; n];
    let mut i = n;
    while i > 0 {
        let mut j = n - 1;
        let mut matched = true;
        while j >= i {
            if chars[j] == chars[j - i] {
                opto_sft[j - 1] = i;
            } else {
                matched = false;
                break;
            }
            j -= 1;
        }
        if matched {
            let mut j = i - 1;
            while j > 0 {
                j -= 1;
                opto_sft[j] = i;
            }
        }
        i -= 1;
    }
    opto_sft[n - 1] = 1;
    (last_occ, opto_sft)
}
