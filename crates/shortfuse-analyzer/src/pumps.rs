//! Candidate pump enumeration.
//!
//! A pump is a short string the repetition's body can match while leaving
//! the repetition re-enterable. Three families of candidates are generated:
//! overlapping-alternation characters (the exponential `(a|a)*` shape),
//! nested-repetition characters (the `(a+)+` shape), and body walk-throughs
//! with each optional sub-part toggled on or off (which surfaces ambiguous
//! splits like a flag-argument tail swallowing the next flag). Everything
//! here is a proposal; the analyzer's empirical validation is the filter.

use std::collections::HashSet;

use shortfuse_syntax::Pattern;
use shortfuse_syntax::charset::Universe;
use shortfuse_syntax::graph::{ACCEPT, Graph, LAST_ACCEPT, NodeId, NodeKind, QuantMode, Wiring};

use crate::sets::first_set;

/// Longest pump worth validating.
const MAX_PUMP_LEN: usize = 16;

/// Optional-toggle slots tracked per body walk; masks beyond this are not
/// enumerated.
const MAX_OPTIONAL_SLOTS: u32 = 4;

/// A repetition the interpreter may backtrack into.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Repetition {
    pub id: NodeId,
    pub body: NodeId,
    /// Body walks stop here for loops (the body cycles back).
    pub body_stop: Option<NodeId>,
    pub span: (usize, usize),
}

/// Collects repetitions with `max > 1` that are allowed to give back:
/// possessive modes and anything sealed inside an atomic group are out.
pub(crate) fn collect_repetitions(pattern: &Pattern) -> Vec<Repetition> {
    let graph = pattern.graph();
    let wiring = pattern.wiring();
    let mut out = Vec::new();
    for (id, node) in graph.iter() {
        let span: std::ops::Range<usize> = node.span.into();
        let span = (span.start, span.end);
        let rep = match &node.kind {
            NodeKind::Curly { atom, max, mode, .. }
            | NodeKind::GroupCurly {
                atom, max, mode, ..
            } if *max > 1 && *mode != QuantMode::Possessive => Repetition {
                id,
                body: *atom,
                body_stop: None,
                span,
            },
            NodeKind::Loop { body, max, .. } if *max > 1 => Repetition {
                id,
                body: *body,
                body_stop: Some(id),
                span,
            },
            _ => continue,
        };
        if inside_atomic(graph, wiring, id) {
            continue;
        }
        out.push(rep);
    }
    out.sort_by_key(|r| r.span);
    out
}

fn inside_atomic(graph: &Graph, wiring: &Wiring, id: NodeId) -> bool {
    wiring
        .ancestors(id)
        .into_iter()
        .skip(1)
        .any(|a| matches!(graph.node(a).kind, NodeKind::Atomic { .. }))
}

/// Candidate pumps for one repetition: shortest first, then fewest distinct
/// characters (the more deterministic attack wins ties).
pub(crate) fn candidates(pattern: &Pattern, rep: &Repetition) -> Vec<String> {
    let graph = pattern.graph();
    let universe = Universe;
    let mut seen = HashSet::new();
    let mut out: Vec<String> = Vec::new();

    let mut propose = |s: String| {
        if !s.is_empty() && s.chars().count() <= MAX_PUMP_LEN && seen.insert(s.clone()) {
            out.push(s);
        }
    };

    // (a) overlapping branch alternatives: one shared character pumps
    // exponentially
    for branch in subtree_nodes(graph, rep.body, rep.body_stop) {
        let NodeKind::Branch { alts, conn } = &graph.node(branch).kind else {
            continue;
        };
        for (i, &left) in alts.iter().enumerate() {
            for &right in &alts[i + 1..] {
                let shared = first_set(graph, left, Some(*conn))
                    .intersect(&first_set(graph, right, Some(*conn)));
                if let Some(c) = shared.representative(&universe).and_then(char::from_u32) {
                    propose(c.to_string());
                }
            }
        }
    }

    // (b) a repetition nested in the body: its character, and the character
    // doubled, keep both levels ambiguous
    for inner in subtree_nodes(graph, rep.body, rep.body_stop) {
        let (entry, stop) = match &graph.node(inner).kind {
            NodeKind::Curly { atom, max, mode, .. }
            | NodeKind::GroupCurly {
                atom, max, mode, ..
            } if *max > 1 && *mode != QuantMode::Possessive => (*atom, None),
            NodeKind::Loop { body, max, .. } if *max > 1 => (*body, Some(inner)),
            _ => continue,
        };
        let set = first_set(graph, entry, stop);
        if let Some(c) = set.representative(&universe).and_then(char::from_u32) {
            propose(c.to_string());
            propose(format!("{c}{c}"));
        }
    }

    // (c) body walk-throughs with optional parts toggled per mask
    let slots = {
        let mut walk = MinWalk::counting();
        walk.string(graph, rep.body, rep.body_stop);
        walk.slots_seen.min(MAX_OPTIONAL_SLOTS)
    };
    for mask in 0..(1u32 << slots) {
        let s = MinWalk::with_mask(mask).string(graph, rep.body, rep.body_stop);
        propose(s);
    }

    out.sort_by(|a, b| {
        let distinct = |s: &str| s.chars().collect::<HashSet<_>>().len();
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then(distinct(a).cmp(&distinct(b)))
            .then(a.cmp(b))
    });
    out.truncate(8);
    out
}

/// All nodes reachable inside a sub-graph, bodies and branches included.
fn subtree_nodes(graph: &Graph, entry: NodeId, stop: Option<NodeId>) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    collect_subtree(graph, entry, stop, &mut visited, &mut out);
    out
}

fn collect_subtree(
    graph: &Graph,
    entry: NodeId,
    stop: Option<NodeId>,
    visited: &mut HashSet<NodeId>,
    out: &mut Vec<NodeId>,
) {
    let mut id = entry;
    loop {
        if Some(id) == stop || id == ACCEPT || id == LAST_ACCEPT || !visited.insert(id) {
            return;
        }
        out.push(id);
        let node = graph.node(id);
        let mut next = node.next;
        match &node.kind {
            NodeKind::Ques { atom, .. }
            | NodeKind::Curly { atom, .. }
            | NodeKind::GroupCurly { atom, .. } => {
                collect_subtree(graph, *atom, None, visited, out);
            }
            NodeKind::Atomic { body } => collect_subtree(graph, *body, None, visited, out),
            NodeKind::LookAhead { cond, .. } | NodeKind::LookBehind { cond, .. } => {
                collect_subtree(graph, *cond, None, visited, out);
            }
            NodeKind::Loop { body, .. } => {
                collect_subtree(graph, *body, Some(id), visited, out);
            }
            NodeKind::Prolog { loop_node } => next = *loop_node,
            NodeKind::Branch { alts, conn } => {
                for &alt in alts {
                    if alt != *conn {
                        collect_subtree(graph, alt, Some(*conn), visited, out);
                    }
                }
                next = graph.node(*conn).next;
            }
            _ => {}
        }
        id = next;
    }
}

/// Walks a sub-graph emitting one representative character per mandatory
/// consuming node. Optional parts (`?` and `{0,n}` repetitions) are
/// included or skipped according to a bit mask; the walk always descends
/// into skipped parts too, so slot numbering is identical across masks.
struct MinWalk {
    mask: u32,
    next_slot: u32,
    slots_seen: u32,
    counting: bool,
}

impl MinWalk {
    fn counting() -> MinWalk {
        MinWalk {
            mask: 0,
            next_slot: 0,
            slots_seen: 0,
            counting: true,
        }
    }

    fn with_mask(mask: u32) -> MinWalk {
        MinWalk {
            mask,
            next_slot: 0,
            slots_seen: 0,
            counting: false,
        }
    }

    fn take_optional(&mut self) -> bool {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots_seen = self.slots_seen.max(self.next_slot);
        if self.counting || slot >= MAX_OPTIONAL_SLOTS {
            return false;
        }
        self.mask & (1 << slot) != 0
    }

    fn string(&mut self, graph: &Graph, entry: NodeId, stop: Option<NodeId>) -> String {
        let universe = Universe;
        let mut out = String::new();
        let mut id = entry;
        let mut guard = 0usize;
        loop {
            if Some(id) == stop || id == ACCEPT || id == LAST_ACCEPT {
                break;
            }
            guard += 1;
            if guard > graph.len() * 2 {
                break;
            }
            let node = graph.node(id);
            let mut next = node.next;
            match &node.kind {
                NodeKind::Slice { chars }
                | NodeKind::SliceFold { chars }
                | NodeKind::SliceUnicodeFold { chars }
                | NodeKind::SliceBoyerMoore { chars, .. } => {
                    out.extend(chars.iter().filter_map(|&c| char::from_u32(c)));
                }
                kind if kind.consumes() && !matches!(kind, NodeKind::BackRef { .. }) => {
                    if let Some(c) = kind
                        .first_chars(&universe)
                        .representative(&universe)
                        .and_then(char::from_u32)
                    {
                        out.push(c);
                    }
                }
                NodeKind::Ques { atom, .. } => {
                    let take = self.take_optional();
                    let sub = self.string(graph, *atom, None);
                    if take {
                        out.push_str(&sub);
                    }
                }
                NodeKind::Curly { atom, min, .. } | NodeKind::GroupCurly { atom, min, .. } => {
                    let times = self.repeat_count(*min);
                    let sub = self.string(graph, *atom, None);
                    for _ in 0..times {
                        out.push_str(&sub);
                    }
                }
                NodeKind::Prolog { loop_node } => next = *loop_node,
                NodeKind::Loop { body, min, .. } => {
                    let times = self.repeat_count(*min);
                    let sub = self.string(graph, *body, Some(id));
                    for _ in 0..times {
                        out.push_str(&sub);
                    }
                }
                NodeKind::Atomic { body } => {
                    let sub = self.string(graph, *body, None);
                    out.push_str(&sub);
                }
                NodeKind::Branch { alts, conn } => {
                    let mut best: Option<String> = None;
                    for &alt in alts {
                        let sub = self.string(graph, alt, Some(*conn));
                        let better = match &best {
                            None => true,
                            Some(b) => sub.chars().count() < b.chars().count(),
                        };
                        if better {
                            best = Some(sub);
                        }
                    }
                    if let Some(b) = best {
                        out.push_str(&b);
                    }
                    next = graph.node(*conn).next;
                }
                _ => {}
            }
            id = next;
        }
        out
    }

    fn repeat_count(&mut self, min: u32) -> u32 {
        if min > 0 {
            min.min(4)
        } else if self.take_optional() {
            1
        } else {
            0
        }
    }
}

/// Minimal string a sub-graph must consume, with no optionals taken.
pub(crate) fn min_string(graph: &Graph, entry: NodeId, stop: Option<NodeId>) -> String {
    MinWalk::with_mask(0).string(graph, entry, stop)
}
