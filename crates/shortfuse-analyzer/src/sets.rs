//! First- and follow-set computation over the match graph.
//!
//! `first_set` collects the code points that can legally begin a sub-graph's
//! match. `follow_set` collects what the interpreter must see immediately
//! after the last iteration of a repetition, including the repetition's own
//! re-entry characters; negative look-ahead conditions are subtracted, per
//! the attacker's view of what may continue the match.

use std::collections::HashSet;

use shortfuse_syntax::Pattern;
use shortfuse_syntax::charset::{CharSet, Universe};
use shortfuse_syntax::graph::{ACCEPT, Graph, LAST_ACCEPT, NodeId, NodeKind};

/// What can follow a repetition.
#[derive(Debug, Clone)]
pub(crate) struct FollowInfo {
    pub chars: CharSet,
    /// The continuation can reach the end of the pattern.
    pub at_end: bool,
}

/// First-set of the chain starting at `entry` (stopping at `stop`).
pub(crate) fn first_set(graph: &Graph, entry: NodeId, stop: Option<NodeId>) -> CharSet {
    let mut acc = CharSet::new();
    let mut visited = HashSet::new();
    chain_first(graph, entry, stop, &mut acc, &mut visited, false);
    acc
}

/// Follow-set of repetition `rep`: re-entry characters plus the first-set of
/// its executable continuation.
pub(crate) fn follow_set(pattern: &Pattern, rep: NodeId) -> FollowInfo {
    let graph = pattern.graph();
    let node = graph.node(rep);
    let mut acc = CharSet::new();
    let mut neg = CharSet::new();
    let mut visited = HashSet::new();

    // re-entry: another iteration of the body
    match &node.kind {
        NodeKind::Curly { atom, max, .. } | NodeKind::GroupCurly { atom, max, .. } if *max > 1 => {
            chain_first(graph, *atom, None, &mut acc, &mut visited, true);
        }
        NodeKind::Loop { body, max, .. } if *max > 1 => {
            chain_first(graph, *body, Some(rep), &mut acc, &mut visited, true);
        }
        _ => {}
    }

    let mut at_end = collect_negative_lookaheads(graph, node.next, &mut neg);
    visited.clear();
    at_end |= chain_first(graph, node.next, None, &mut acc, &mut visited, true);

    FollowInfo {
        chars: acc.difference(&neg),
        at_end,
    }
}

/// Walks a chain accumulating first characters. Returns true when the chain
/// can complete without consuming input (it is nullable). `assume_min_met`
/// treats repetition minimums as already satisfied, which is right for
/// follow-walks that arrive from inside or after the repetition.
fn chain_first(
    graph: &Graph,
    entry: NodeId,
    stop: Option<NodeId>,
    acc: &mut CharSet,
    visited: &mut HashSet<NodeId>,
    assume_min_met: bool,
) -> bool {
    let universe = Universe;
    let mut id = entry;
    loop {
        if Some(id) == stop || id == ACCEPT || id == LAST_ACCEPT {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        let node = graph.node(id);
        let mut next = node.next;
        match &node.kind {
            kind if kind.consumes() && !matches!(kind, NodeKind::BackRef { .. }) => {
                *acc = acc.union(&kind.first_chars(&universe));
                return false;
            }
            // a back-reference's text is dynamic; it contributes nothing
            // but is not a pass-through either
            NodeKind::BackRef { .. } => return false,

            NodeKind::Ques { atom, .. } => {
                chain_first(graph, *atom, None, acc, visited, assume_min_met);
            }
            NodeKind::Curly { atom, min, .. } | NodeKind::GroupCurly { atom, min, .. } => {
                let nullable = chain_first(graph, *atom, None, acc, visited, assume_min_met);
                if *min > 0 && !nullable && !assume_min_met {
                    return false;
                }
            }
            NodeKind::Prolog { loop_node } => {
                next = *loop_node;
            }
            NodeKind::Loop { body, min, .. } => {
                let nullable = chain_first(graph, *body, Some(id), acc, visited, assume_min_met);
                if *min > 0 && !nullable && !assume_min_met {
                    return false;
                }
            }
            NodeKind::Atomic { body } => {
                let nullable = chain_first(graph, *body, None, acc, visited, assume_min_met);
                if !nullable {
                    return false;
                }
            }
            NodeKind::Branch { alts, conn } => {
                let mut nullable = false;
                for &alt in alts {
                    nullable |= chain_first(graph, alt, Some(*conn), acc, visited, assume_min_met);
                }
                if !nullable {
                    return false;
                }
                next = graph.node(*conn).next;
            }

            // zero-width nodes pass through
            NodeKind::Empty
            | NodeKind::Begin
            | NodeKind::End
            | NodeKind::Caret { .. }
            | NodeKind::Dollar { .. }
            | NodeKind::WordBoundary { .. }
            | NodeKind::LastMatch
            | NodeKind::GroupHead { .. }
            | NodeKind::GroupTail { .. }
            | NodeKind::BranchConn
            | NodeKind::LookAhead { .. }
            | NodeKind::LookBehind { .. }
            | NodeKind::LookBehindEnd
            | NodeKind::Start { .. } => {}

            NodeKind::Accept | NodeKind::LastAccept => return true,
            _ => {}
        }
        id = next;
    }
}

/// Gathers the first-sets of negative look-ahead conditions along the
/// continuation chain; these characters cannot legally follow. Returns true
/// when the chain ends the pattern.
fn collect_negative_lookaheads(graph: &Graph, entry: NodeId, neg: &mut CharSet) -> bool {
    let mut id = entry;
    let mut guard = 0usize;
    loop {
        if id == ACCEPT || id == LAST_ACCEPT {
            return true;
        }
        guard += 1;
        if guard > graph.len() {
            return false;
        }
        let node = graph.node(id);
        match &node.kind {
            NodeKind::LookAhead {
                cond,
                negative: true,
            } => {
                *neg = neg.union(&first_set(graph, *cond, None));
                id = node.next;
            }
            NodeKind::Empty
            | NodeKind::BranchConn
            | NodeKind::GroupHead { .. }
            | NodeKind::GroupTail { .. }
            | NodeKind::Caret { .. }
            | NodeKind::Dollar { .. }
            | NodeKind::Begin
            | NodeKind::End
            | NodeKind::WordBoundary { .. }
            | NodeKind::LastMatch
            | NodeKind::LookAhead { .. }
            | NodeKind::LookBehind { .. } => id = node.next,
            _ => return false,
        }
    }
}
