//! The match-node graph.
//!
//! Nodes live in a flat arena referenced by `NodeId`; cyclic wiring (a loop
//! body's tail pointing back at its controller) is just an index, so the
//! whole graph is dropped at once and cycles cost nothing. The executable
//! wiring is the `next` chain; a parallel analyzer wiring (`direct_next`,
//! `sub_next`, ...) lives in a side table built by [`wire::wire`] after
//! parsing.

mod node;
pub mod study;
pub mod wire;

#[cfg(test)]
mod node_tests;
#[cfg(test)]
mod wire_tests;

pub use node::{
    ACCEPT, BoundMode, ClassSet, FoldMode, Graph, LAST_ACCEPT, Node, NodeId, NodeKind, QuantMode,
    REP_UNBOUNDED,
};
pub use study::{StudyInfo, study};
pub use wire::{DirectInfo, Wiring, wire};
