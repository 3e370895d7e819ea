//! Static study of a sub-graph: length bounds and determinism.
//!
//! Drives three decisions: the unanchored starter's search cutoff
//! (`min_length`), the Curly-vs-Loop election for quantified fragments
//! (`deterministic`), and look-behind bound validation (`max_length` with
//! `max_valid`).

use super::node::{ACCEPT, Graph, LAST_ACCEPT, NodeId, NodeKind, REP_UNBOUNDED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyInfo {
    /// Fewest code points any match of the sub-graph consumes.
    pub min_length: u64,
    /// Most code points any match consumes; meaningless if `max_valid` is
    /// false.
    pub max_length: u64,
    /// False when the sub-graph contains an unbounded repetition or a
    /// back-reference (whose length is dynamic).
    pub max_valid: bool,
    /// True when the sub-graph matches at most one way at any position:
    /// no alternation, no variable repetition, no back-reference.
    pub deterministic: bool,
}

impl StudyInfo {
    fn empty() -> StudyInfo {
        StudyInfo {
            min_length: 0,
            max_length: 0,
            max_valid: true,
            deterministic: true,
        }
    }
}

/// Studies the chain from `entry` up to a terminal or `stop`.
pub fn study(graph: &Graph, entry: NodeId, stop: Option<NodeId>) -> StudyInfo {
    let mut info = StudyInfo::empty();
    let mut id = entry;

    while id != ACCEPT && id != LAST_ACCEPT && Some(id) != stop {
        let node = graph.node(id);
        let mut next = node.next;
        match &node.kind {
            NodeKind::Char { .. }
            | NodeKind::CharFold { .. }
            | NodeKind::CharUnicodeFold { .. }
            | NodeKind::Class { .. }
            | NodeKind::Dot { .. } => {
                info.min_length += 1;
                info.max_length += 1;
            }
            NodeKind::LineBreak => {
                // \r\n counts as one line break of two code points
                info.min_length += 1;
                info.max_length += 2;
            }
            NodeKind::Slice { chars }
            | NodeKind::SliceFold { chars }
            | NodeKind::SliceUnicodeFold { chars }
            | NodeKind::SliceBoyerMoore { chars, .. } => {
                info.min_length += chars.len() as u64;
                info.max_length += chars.len() as u64;
            }
            NodeKind::BackRef { .. } => {
                info.max_valid = false;
                info.deterministic = false;
            }
            NodeKind::Ques { atom, .. } => {
                let sub = study(graph, *atom, None);
                info.max_length += sub.max_length;
                info.max_valid &= sub.max_valid;
                info.deterministic = false;
            }
            NodeKind::Curly {
                atom, min, max, ..
            }
            | NodeKind::GroupCurly {
                atom, min, max, ..
            } => {
                let sub = study(graph, *atom, None);
                info.min_length += sub.min_length * u64::from(*min);
                if *max == REP_UNBOUNDED {
                    info.max_valid = false;
                } else {
                    info.max_length += sub.max_length * u64::from(*max);
                    info.max_valid &= sub.max_valid;
                }
                if min != max || !sub.deterministic {
                    info.deterministic = false;
                }
            }
            NodeKind::Prolog { .. } => {}
            NodeKind::Loop {
                body, min, max, ..
            } => {
                let sub = study(graph, *body, Some(id));
                info.min_length += sub.min_length * u64::from(*min);
                if *max == REP_UNBOUNDED {
                    info.max_valid = false;
                } else {
                    info.max_length += sub.max_length * u64::from(*max);
                    info.max_valid &= sub.max_valid;
                }
                info.deterministic = false;
            }
            NodeKind::Atomic { body } => {
                let sub = study(graph, *body, None);
                info.min_length += sub.min_length;
                info.max_length += sub.max_length;
                info.max_valid &= sub.max_valid;
                info.deterministic &= sub.deterministic;
            }
            NodeKind::Branch { alts, conn } => {
                let mut branch_min = u64::MAX;
                let mut branch_max = 0u64;
                for &alt in alts {
                    let sub = study(graph, alt, Some(*conn));
                    branch_min = branch_min.min(sub.min_length);
                    branch_max = branch_max.max(sub.max_length);
                    info.max_valid &= sub.max_valid;
                }
                info.min_length += if alts.is_empty() { 0 } else { branch_min };
                info.max_length += branch_max;
                if alts.len() > 1 {
                    info.deterministic = false;
                }
                next = graph.node(*conn).next;
            }
            // zero-width assertions and bookkeeping nodes
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
            | NodeKind::LookBehindEnd => {}
            NodeKind::Start { .. } | NodeKind::Accept | NodeKind::LastAccept => {}
        }
        id = next;
    }
    info
}
