//! Post-parse analyzer wiring.
//!
//! A second, parallel linking of the graph: `direct_next` follows the
//! control path the way an attacker-supplied input experiences it (loop
//! controllers appear as single steps, a repetition body's tail links back
//! to its controller), while `sub_next` descends into repetition bodies,
//! alternation branches, and lookaround conditions. `direct_prev` and
//! `direct_parent` invert those edges so the analyzer can walk outward from
//! any node. Established once, by a single pass after parsing.

use super::node::{ACCEPT, Graph, LAST_ACCEPT, NodeId, NodeKind};

/// Analyzer-facing edges for one node.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectInfo {
    /// Next node on the attacker's control path; `None` at pattern end.
    /// For the last node of a repetition body this is the controller.
    pub direct_next: Option<NodeId>,
    /// Entry of the sub-graph (body / first branch / condition).
    pub sub_next: Option<NodeId>,
    /// Previous node within the same chain.
    pub direct_prev: Option<NodeId>,
    /// Enclosing container node, if any.
    pub direct_parent: Option<NodeId>,
}

/// Side table of [`DirectInfo`], indexed by `NodeId`. Kept out of the
/// execution graph so the interpreter's nodes stay minimal.
#[derive(Debug, Clone)]
pub struct Wiring {
    info: Vec<DirectInfo>,
}

impl Wiring {
    pub fn info(&self, id: NodeId) -> &DirectInfo {
        &self.info[id as usize]
    }

    pub fn direct_next(&self, id: NodeId) -> Option<NodeId> {
        self.info[id as usize].direct_next
    }

    pub fn sub_next(&self, id: NodeId) -> Option<NodeId> {
        self.info[id as usize].sub_next
    }

    pub fn direct_prev(&self, id: NodeId) -> Option<NodeId> {
        self.info[id as usize].direct_prev
    }

    pub fn direct_parent(&self, id: NodeId) -> Option<NodeId> {
        self.info[id as usize].direct_parent
    }

    /// Walks `direct_parent` from `id` upward, including `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut cur = id;
        while let Some(parent) = self.direct_parent(cur) {
            out.push(parent);
            cur = parent;
        }
        out
    }
}

/// Builds the side table for the graph reachable from `root`.
pub fn wire(graph: &Graph, root: NodeId) -> Wiring {
    let mut pass = WirePass {
        graph,
        info: vec![DirectInfo::default(); graph.len()],
        visited: vec![false; graph.len()],
    };
    pass.chain(root, None, None, None);
    Wiring { info: pass.info }
}

struct WirePass<'g> {
    graph: &'g Graph,
    info: Vec<DirectInfo>,
    visited: Vec<bool>,
}

impl WirePass<'_> {
    /// Wires the chain starting at `entry`, stopping at the terminals or at
    /// `stop` (a loop controller the chain cycles back to). `following` is
    /// where control continues once this chain is exhausted.
    fn chain(
        &mut self,
        entry: NodeId,
        stop: Option<NodeId>,
        parent: Option<NodeId>,
        following: Option<NodeId>,
    ) {
        let mut id = entry;
        let mut prev: Option<NodeId> = None;

        while id != ACCEPT && id != LAST_ACCEPT && Some(id) != stop {
            if self.visited[id as usize] {
                return;
            }
            self.visited[id as usize] = true;

            let walk_next = match &self.graph.node(id).kind {
                NodeKind::Branch { conn, .. } => self.graph.node(*conn).next,
                NodeKind::Prolog { loop_node } => *loop_node,
                _ => self.graph.node(id).next,
            };
            let direct_next = self.resolve(walk_next, stop, following);

            self.info[id as usize] = DirectInfo {
                direct_next,
                sub_next: None,
                direct_prev: prev,
                direct_parent: parent,
            };

            match self.graph.node(id).kind.clone() {
                NodeKind::Ques { atom, .. } => {
                    self.info[id as usize].sub_next = Some(atom);
                    self.chain(atom, None, Some(id), direct_next);
                }
                NodeKind::Curly { atom, .. } | NodeKind::GroupCurly { atom, .. } => {
                    self.info[id as usize].sub_next = Some(atom);
                    // body completion returns to the controller
                    self.chain(atom, None, Some(id), Some(id));
                }
                NodeKind::Loop { body, .. } => {
                    self.info[id as usize].sub_next = Some(body);
                    self.chain(body, Some(id), Some(id), Some(id));
                }
                NodeKind::Atomic { body } => {
                    self.info[id as usize].sub_next = Some(body);
                    self.chain(body, None, Some(id), direct_next);
                }
                NodeKind::Branch { alts, conn } => {
                    self.info[id as usize].sub_next = alts.first().copied();
                    let cont = self.resolve(self.graph.node(conn).next, stop, following);
                    for alt in alts {
                        if alt != conn {
                            self.chain(alt, Some(conn), Some(id), cont);
                        }
                    }
                    if !self.visited[conn as usize] {
                        self.visited[conn as usize] = true;
                        self.info[conn as usize] = DirectInfo {
                            direct_next: cont,
                            sub_next: None,
                            direct_prev: Some(id),
                            direct_parent: parent,
                        };
                    }
                }
                NodeKind::LookAhead { cond, .. } => {
                    self.info[id as usize].sub_next = Some(cond);
                    self.chain(cond, None, Some(id), None);
                }
                NodeKind::LookBehind { cond, .. } => {
                    self.info[id as usize].sub_next = Some(cond);
                    self.chain(cond, None, Some(id), None);
                }
                _ => {}
            }

            prev = Some(id);
            id = walk_next;
        }
    }

    /// Maps an executable successor to the attacker-visible one.
    fn resolve(
        &self,
        next: NodeId,
        stop: Option<NodeId>,
        following: Option<NodeId>,
    ) -> Option<NodeId> {
        if Some(next) == stop {
            return stop;
        }
        if next == ACCEPT || next == LAST_ACCEPT {
            return following;
        }
        Some(next)
    }
}
