//! Node variants and the arena they live in.

use rowan::TextRange;

use crate::charset::{CharSet, PredicateSet, Universe};

/// Index into [`Graph::nodes`].
pub type NodeId = u32;

/// Sub-match terminal: records the reached position and succeeds.
pub const ACCEPT: NodeId = 0;

/// Whole-match terminal: also enforces the end anchor when required.
pub const LAST_ACCEPT: NodeId = 1;

/// `max` sentinel for `{m,}`, `*`, `+`.
pub const REP_UNBOUNDED: u32 = u32::MAX;

/// Quantifier mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantMode {
    Greedy,
    Lazy,
    Possessive,
}

/// Case-comparison mode for back-references and slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMode {
    None,
    Ascii,
    Unicode,
}

/// Word-boundary mode: which transition(s) satisfy the assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundMode {
    /// `\b`: a word/non-word transition on either side.
    Both,
    /// `\B`: no transition.
    None,
    /// Start of a word.
    Left,
    /// End of a word.
    Right,
}

/// A character-class matcher: either a concrete set or a composition over
/// categorical predicates. Categorical leaves materialize lazily against the
/// bounded universe and cache the result.
#[derive(Debug, Clone)]
pub enum ClassSet {
    Literal(CharSet),
    Predicate(PredicateSet),
    Union(Vec<ClassSet>),
    Intersection(Box<ClassSet>, Box<ClassSet>),
    Complement(Box<ClassSet>),
}

impl ClassSet {
    pub fn contains(&self, cp: u32) -> bool {
        match self {
            ClassSet::Literal(set) => set.contains(cp),
            ClassSet::Predicate(pred) => pred.contains(cp),
            ClassSet::Union(parts) => parts.iter().any(|p| p.contains(cp)),
            ClassSet::Intersection(a, b) => a.contains(cp) && b.contains(cp),
            ClassSet::Complement(inner) => !inner.contains(cp),
        }
    }

    /// Enumerates against the universe. Predicate leaves cache their
    /// materialization; compositions are recomputed per call.
    pub fn char_set(&self, universe: &Universe) -> CharSet {
        match self {
            ClassSet::Literal(set) => set.clone(),
            ClassSet::Predicate(pred) => pred.char_set(universe).clone(),
            ClassSet::Union(parts) => parts
                .iter()
                .fold(CharSet::new(), |acc, p| acc.union(&p.char_set(universe))),
            ClassSet::Intersection(a, b) => a.char_set(universe).intersect(&b.char_set(universe)),
            ClassSet::Complement(inner) => {
                universe.char_set().difference(&inner.char_set(universe))
            }
        }
    }
}

/// A match node: kind + executable successor + the span of pattern text that
/// produced it.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub next: NodeId,
    pub span: TextRange,
}

impl Node {
    /// The pattern fragment this node was parsed from, for diagnostics and
    /// analyzer output.
    pub fn label<'p>(&self, pattern: &'p str) -> &'p str {
        let range: std::ops::Range<usize> = self.span.into();
        &pattern[range.start.min(pattern.len())..range.end.min(pattern.len())]
    }
}

/// Every construct the interpreter recognizes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Zero-width pass-through.
    Empty,
    /// Unanchored-search driver: tries `next` at every position up to
    /// `to - min_length`.
    Start { min_length: usize },
    Accept,
    LastAccept,

    /// Single code point.
    Char { cp: u32 },
    /// Case-insensitive pair (ASCII folding).
    CharFold { lo: u32, up: u32 },
    /// Unicode-case single: input folds to `folded`.
    CharUnicodeFold { folded: u32 },
    /// Literal run, one-shot comparison.
    Slice { chars: Vec<u32> },
    /// Literal run, ASCII-folded buffer.
    SliceFold { chars: Vec<u32> },
    /// Literal run, Unicode-folded buffer.
    SliceUnicodeFold { chars: Vec<u32> },
    /// Literal run with Boyer-Moore shift tables, used by the unanchored
    /// starter: `last_occ` is indexed by the low 7 bits of the code point.
    SliceBoyerMoore {
        chars: Vec<u32>,
        last_occ: Vec<i32>,
        good_suffix: Vec<usize>,
    },

    /// Character class.
    Class { set: ClassSet },
    /// `.` — excludes line terminators unless `dotall`.
    Dot { dotall: bool, unix_lines: bool },
    /// `\R`: any line ending, including the two-character `\r\n`.
    LineBreak,

    /// `\A`, or `^` without MULTILINE.
    Begin,
    /// `\z`.
    End,
    /// `^` with MULTILINE.
    Caret { unix: bool },
    /// `$`; `\Z` is the non-multiline form regardless of flags.
    Dollar { unix: bool, multiline: bool },
    /// `\b` / `\B`.
    WordBoundary { mode: BoundMode },
    /// `\G`.
    LastMatch,

    GroupHead { local: u32 },
    GroupTail { local: u32, group: u32 },
    BackRef { group: u32, fold: FoldMode },

    /// 0-or-1.
    Ques { atom: NodeId, mode: QuantMode },
    /// Bounded repetition over a deterministic, non-capturing body.
    Curly {
        atom: NodeId,
        min: u32,
        max: u32,
        mode: QuantMode,
    },
    /// Bounded repetition that manages its capturing group's slots itself.
    GroupCurly {
        atom: NodeId,
        min: u32,
        max: u32,
        mode: QuantMode,
        local: u32,
        group: u32,
        capture: bool,
    },
    /// Seeds the loop counter, then hands off to its [`NodeKind::Loop`].
    Prolog { loop_node: NodeId },
    /// Non-deterministic repetition with an explicit counter. The body's
    /// terminal `next` points back here.
    Loop {
        body: NodeId,
        min: u32,
        max: u32,
        lazy: bool,
        count_local: u32,
        begin_local: u32,
    },
    /// `(?>...)`: the body's first match is committed.
    Atomic { body: NodeId },

    /// Alternation. Earlier branches are tried first; every branch funnels
    /// into `conn`.
    Branch { alts: Vec<NodeId>, conn: NodeId },
    BranchConn,

    LookAhead { cond: NodeId, negative: bool },
    LookBehind {
        cond: NodeId,
        negative: bool,
        min: u32,
        max: u32,
    },
    /// Terminal inside a look-behind condition: succeeds only at the
    /// position the look-behind was evaluated from.
    LookBehindEnd,
}

impl NodeKind {
    /// Does this node consume input on success?
    pub fn consumes(&self) -> bool {
        matches!(
            self,
            NodeKind::Char { .. }
                | NodeKind::CharFold { .. }
                | NodeKind::CharUnicodeFold { .. }
                | NodeKind::Slice { .. }
                | NodeKind::SliceFold { .. }
                | NodeKind::SliceUnicodeFold { .. }
                | NodeKind::SliceBoyerMoore { .. }
                | NodeKind::Class { .. }
                | NodeKind::Dot { .. }
                | NodeKind::LineBreak
                | NodeKind::BackRef { .. }
        )
    }

    /// The set of code points that can begin a successful match of this node
    /// alone. Empty for zero-width and back-reference nodes.
    pub fn first_chars(&self, universe: &Universe) -> CharSet {
        match self {
            NodeKind::Char { cp } => CharSet::single(*cp),
            NodeKind::CharFold { lo, up } => {
                let mut set = CharSet::single(*lo);
                set.add(*up);
                set
            }
            NodeKind::CharUnicodeFold { folded } => {
                let mut set = CharSet::single(*folded);
                for cp in crate::charset::fold_additions(*folded, true) {
                    set.add(cp);
                }
                set
            }
            NodeKind::Slice { chars } | NodeKind::SliceBoyerMoore { chars, .. } => {
                CharSet::single(chars[0])
            }
            NodeKind::SliceFold { chars } => {
                let mut set = CharSet::single(chars[0]);
                for cp in crate::charset::fold_additions(chars[0], false) {
                    set.add(cp);
                }
                set
            }
            NodeKind::SliceUnicodeFold { chars } => {
                let mut set = CharSet::single(chars[0]);
                for cp in crate::charset::fold_additions(chars[0], true) {
                    set.add(cp);
                }
                set
            }
            NodeKind::Class { set } => set.char_set(universe),
            NodeKind::Dot { dotall, unix_lines } => {
                if *dotall {
                    universe.char_set()
                } else if *unix_lines {
                    universe.char_set().difference(&CharSet::single(0x0A))
                } else {
                    let mut terminators = CharSet::single(0x0A);
                    terminators.add(0x0D);
                    terminators.add(0x85);
                    terminators.add_range(0x2028, 0x2029);
                    universe.char_set().difference(&terminators)
                }
            }
            NodeKind::LineBreak => {
                let mut set = CharSet::single(0x0A);
                set.add(0x0B);
                set.add(0x0C);
                set.add(0x0D);
                set.add(0x85);
                set.add_range(0x2028, 0x2029);
                set
            }
            _ => CharSet::new(),
        }
    }
}

/// Arena of match nodes. Slot 0 is [`ACCEPT`], slot 1 is [`LAST_ACCEPT`].
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl Graph {
    pub fn new() -> Graph {
        let empty = TextRange::empty(0.into());
        Graph {
            nodes: vec![
                Node {
                    kind: NodeKind::Accept,
                    next: ACCEPT,
                    span: empty,
                },
                Node {
                    kind: NodeKind::LastAccept,
                    next: LAST_ACCEPT,
                    span: empty,
                },
            ],
        }
    }

    /// Adds a node with its successor unset (pointing at [`ACCEPT`]).
    pub fn add(&mut self, kind: NodeKind, span: TextRange) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            kind,
            next: ACCEPT,
            span,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    pub fn set_next(&mut self, id: NodeId, next: NodeId) {
        self.nodes[id as usize].next = next;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }

    /// Formatted node listing for snapshots and debugging.
    pub fn dump(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for (id, node) in self.iter().skip(2) {
            write!(out, "N{}: {}", id, summarize(&node.kind)).expect("write to String");
            match node.next {
                ACCEPT => out.push_str(" → ✓"),
                LAST_ACCEPT => out.push_str(" → $✓"),
                next => {
                    write!(out, " → N{}", next).expect("write to String");
                }
            }
            out.push('\n');
        }
        out
    }
}

fn summarize(kind: &NodeKind) -> String {
    fn cp_str(cp: u32) -> String {
        match char::from_u32(cp) {
            Some(c) if !c.is_control() => format!("'{}'", c),
            _ => format!("{:#x}", cp),
        }
    }
    fn max_str(max: u32) -> String {
        if max == REP_UNBOUNDED {
            "∞".to_string()
        } else {
            max.to_string()
        }
    }

    match kind {
        NodeKind::Empty => "Empty".into(),
        NodeKind::Start { min_length } => format!("Start(min_len={})", min_length),
        NodeKind::Accept => "Accept".into(),
        NodeKind::LastAccept => "LastAccept".into(),
        NodeKind::Char { cp } => format!("Char({})", cp_str(*cp)),
        NodeKind::CharFold { lo, up } => format!("CharFold({}, {})", cp_str(*lo), cp_str(*up)),
        NodeKind::CharUnicodeFold { folded } => format!("CharUFold({})", cp_str(*folded)),
        NodeKind::Slice { chars } => format!("Slice({})", chars_str(chars)),
        NodeKind::SliceFold { chars } => format!("SliceFold({})", chars_str(chars)),
        NodeKind::SliceUnicodeFold { chars } => format!("SliceUFold({})", chars_str(chars)),
        NodeKind::SliceBoyerMoore { chars, .. } => format!("SliceBM({})", chars_str(chars)),
        NodeKind::Class { set } => format!("Class({:?})", set),
        NodeKind::Dot { dotall, unix_lines } => match (dotall, unix_lines) {
            (true, _) => "All".into(),
            (false, true) => "UnixDot".into(),
            (false, false) => "Dot".into(),
        },
        NodeKind::LineBreak => "LineBreak".into(),
        NodeKind::Begin => "Begin".into(),
        NodeKind::End => "End".into(),
        NodeKind::Caret { unix } => format!("Caret(unix={})", unix),
        NodeKind::Dollar { unix, multiline } => {
            format!("Dollar(unix={}, multiline={})", unix, multiline)
        }
        NodeKind::WordBoundary { mode } => format!("Bound({:?})", mode),
        NodeKind::LastMatch => "LastMatch".into(),
        NodeKind::GroupHead { local } => format!("GroupHead(local={})", local),
        NodeKind::GroupTail { local, group } => {
            format!("GroupTail(local={}, group={})", local, group)
        }
        NodeKind::BackRef { group, fold } => format!("BackRef({}, {:?})", group, fold),
        NodeKind::Ques { atom, mode } => format!("Ques(N{}, {:?})", atom, mode),
        NodeKind::Curly {
            atom,
            min,
            max,
            mode,
        } => format!("Curly(N{}, {}..{}, {:?})", atom, min, max_str(*max), mode),
        NodeKind::GroupCurly {
            atom,
            min,
            max,
            mode,
            group,
            ..
        } => format!(
            "GroupCurly(N{}, {}..{}, {:?}, group={})",
            atom,
            min,
            max_str(*max),
            mode,
            group
        ),
        NodeKind::Prolog { loop_node } => format!("Prolog(N{})", loop_node),
        NodeKind::Loop {
            body,
            min,
            max,
            lazy,
            ..
        } => format!(
            "{}(N{}, {}..{})",
            if *lazy { "LazyLoop" } else { "Loop" },
            body,
            min,
            max_str(*max)
        ),
        NodeKind::Atomic { body } => format!("Atomic(N{})", body),
        NodeKind::Branch { alts, conn } => {
            let alts = alts
                .iter()
                .map(|a| format!("N{}", a))
                .collect::<Vec<_>>()
                .join(" ");
            format!("Branch({} ⇒ N{})", alts, conn)
        }
        NodeKind::BranchConn => "BranchConn".into(),
        NodeKind::LookAhead { cond, negative } => format!(
            "{}LookAhead(N{})",
            if *negative { "Not" } else { "" },
            cond
        ),
        NodeKind::LookBehind {
            cond,
            negative,
            min,
            max,
        } => format!(
            "{}LookBehind(N{}, {}..{})",
            if *negative { "Not" } else { "" },
            cond,
            min,
            max
        ),
        NodeKind::LookBehindEnd => "LookBehindEnd".into(),
    }
}

fn chars_str(chars: &[u32]) -> String {
    let text: String = chars
        .iter()
        .map(|&cp| char::from_u32(cp).unwrap_or('\u{FFFD}'))
        .collect();
    format!("{:?}", text)
}
