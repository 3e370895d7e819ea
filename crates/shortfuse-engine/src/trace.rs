//! Match tracing.
//!
//! The tracer is threaded through every `match` recursion as a generic
//! parameter, so [`NoopTracer`]'s empty inline methods vanish at compile
//! time and no tracing state lives in the interpreter itself.

use shortfuse_syntax::graph::NodeId;

/// Instrumentation hooks. `visit` fires on every node entry (that is, once
/// per interpreter step); `accepted` fires when a terminal records a match.
pub trait Tracer {
    fn visit(&mut self, node: NodeId, pos: usize);

    fn accepted(&mut self, pos: usize);
}

/// Does nothing; optimized away entirely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn visit(&mut self, _node: NodeId, _pos: usize) {}

    #[inline(always)]
    fn accepted(&mut self, _pos: usize) {}
}

/// Records every `(node, position)` visit, for tests and analyzer
/// diagnostics.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    pub visits: Vec<(NodeId, usize)>,
    pub accepts: Vec<usize>,
}

impl RecordingTracer {
    pub fn new() -> RecordingTracer {
        RecordingTracer::default()
    }
}

impl Tracer for RecordingTracer {
    fn visit(&mut self, node: NodeId, pos: usize) {
        self.visits.push((node, pos));
    }

    fn accepted(&mut self, pos: usize) {
        self.accepts.push(pos);
    }
}
