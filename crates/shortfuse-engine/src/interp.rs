//! The recursive backtracking matcher.
//!
//! Each node variant matches at a position and, on success, recurses into
//! its successor; failure returns `Ok(false)` with any state changes undone.
//! Every entry counts one step against the budget; exhaustion surfaces as
//! `Err(BudgetExceeded)` and propagates through every frame without further
//! work.

use shortfuse_syntax::charset::simple_fold;
use shortfuse_syntax::graph::{
    BoundMode, FoldMode, Graph, NodeId, NodeKind, QuantMode, REP_UNBOUNDED,
};

use crate::error::EngineError;
use crate::state::MatchState;
use crate::trace::Tracer;

pub(crate) struct Interp<'a, T: Tracer> {
    pub graph: &'a Graph,
    pub input: &'a [char],
    pub state: &'a mut MatchState,
    pub tracer: &'a mut T,
}

type MatchResult = Result<bool, EngineError>;

impl<'a, T: Tracer> Interp<'a, T> {
    /// Matches the node at `id` against position `pos`.
    pub fn run(&mut self, id: NodeId, pos: usize) -> MatchResult {
        self.state.step_count += 1;
        if self.state.step_budget != 0 && self.state.step_count > self.state.step_budget {
            return Err(EngineError::BudgetExceeded {
                steps: self.state.step_count,
            });
        }
        self.tracer.visit(id, pos);

        let node = self.graph.node(id);
        let next = node.next;
        match &node.kind {
            NodeKind::Accept => {
                self.state.last = pos;
                self.tracer.accepted(pos);
                Ok(true)
            }
            NodeKind::LastAccept => {
                if self.state.anchored_end && pos != self.state.to {
                    self.state.hit_end = true;
                    return Ok(false);
                }
                self.state.last = pos;
                self.tracer.accepted(pos);
                Ok(true)
            }
            NodeKind::Empty | NodeKind::BranchConn => self.run(next, pos),

            NodeKind::Start { min_length } => self.start(next, pos, *min_length),

            NodeKind::Char { cp } => {
                if pos < self.state.to && self.cp_at(pos) == *cp {
                    return self.run(next, pos + 1);
                }
                self.fail_consuming(pos, 1)
            }
            NodeKind::CharFold { lo, up } => {
                if pos < self.state.to {
                    let c = self.cp_at(pos);
                    if c == *lo || c == *up {
                        return self.run(next, pos + 1);
                    }
                }
                self.fail_consuming(pos, 1)
            }
            NodeKind::CharUnicodeFold { folded } => {
                if pos < self.state.to && simple_fold(self.cp_at(pos)) == *folded {
                    return self.run(next, pos + 1);
                }
                self.fail_consuming(pos, 1)
            }

            NodeKind::Slice { chars } => self.slice(next, pos, chars, |c| c),
            NodeKind::SliceFold { chars } => self.slice(next, pos, chars, |c| {
                if char::from_u32(c).is_some_and(|ch| ch.is_ascii_uppercase()) {
                    c | 0x20
                } else {
                    c
                }
            }),
            NodeKind::SliceUnicodeFold { chars } => self.slice(next, pos, chars, simple_fold),
            NodeKind::SliceBoyerMoore {
                chars,
                last_occ,
                good_suffix,
            } => self.boyer_moore(next, pos, chars, last_occ, good_suffix),

            NodeKind::Class { set } => {
                if pos < self.state.to && set.contains(self.cp_at(pos)) {
                    return self.run(next, pos + 1);
                }
                self.fail_consuming(pos, 1)
            }
            NodeKind::Dot { dotall, unix_lines } => {
                if pos < self.state.to {
                    let c = self.cp_at(pos);
                    let excluded = !dotall
                        && if *unix_lines {
                            c == 0x0A
                        } else {
                            matches!(c, 0x0A | 0x0D | 0x85 | 0x2028 | 0x2029)
                        };
                    if !excluded {
                        return self.run(next, pos + 1);
                    }
                    return Ok(false);
                }
                self.fail_consuming(pos, 1)
            }
            NodeKind::LineBreak => self.line_break(next, pos),

            NodeKind::Begin => {
                if pos == self.state.from {
                    self.run(next, pos)
                } else {
                    Ok(false)
                }
            }
            NodeKind::End => {
                if pos == self.state.to {
                    self.state.hit_end = true;
                    return self.run(next, pos);
                }
                Ok(false)
            }
            NodeKind::Caret { unix } => self.caret(next, pos, *unix),
            NodeKind::Dollar { unix, multiline } => self.dollar(next, pos, *unix, *multiline),
            NodeKind::WordBoundary { mode } => self.word_boundary(next, pos, *mode),
            NodeKind::LastMatch => {
                let anchor = self.state.last_match_end.unwrap_or(self.state.from);
                if pos == anchor {
                    self.run(next, pos)
                } else {
                    Ok(false)
                }
            }

            NodeKind::GroupHead { local } => {
                let local = *local as usize;
                let save = self.state.locals[local];
                self.state.locals[local] = pos as i32;
                let ret = self.run(next, pos)?;
                self.state.locals[local] = save;
                Ok(ret)
            }
            NodeKind::GroupTail { local, group } => {
                let start = self.state.locals[*local as usize];
                if start < 0 {
                    // an enclosing GroupCurly owns the bookkeeping; the tail
                    // just reports where the body ended
                    self.state.last = pos;
                    return Ok(true);
                }
                let slot = (*group * 2) as usize;
                let saved = (self.state.groups[slot], self.state.groups[slot + 1]);
                self.state.groups[slot] = start;
                self.state.groups[slot + 1] = pos as i32;
                let ret = self.run(next, pos)?;
                if !ret {
                    self.state.groups[slot] = saved.0;
                    self.state.groups[slot + 1] = saved.1;
                }
                Ok(ret)
            }
            NodeKind::BackRef { group, fold } => self.backref(next, pos, *group, *fold),

            NodeKind::Ques { atom, mode } => self.ques(next, pos, *atom, *mode),
            NodeKind::Curly {
                atom,
                min,
                max,
                mode,
            } => self.curly(next, pos, *atom, *min, *max, *mode),
            NodeKind::GroupCurly {
                atom,
                min,
                max,
                mode,
                local,
                group,
                capture,
            } => {
                let params = GroupCurlyParams {
                    atom: *atom,
                    min: *min,
                    max: *max,
                    mode: *mode,
                    local: *local as usize,
                    slot: (*group * 2) as usize,
                    capture: *capture,
                };
                self.group_curly(next, pos, params)
            }
            NodeKind::Prolog { loop_node } => self.loop_init(*loop_node, pos),
            NodeKind::Loop { .. } => self.loop_iterate(id, pos),
            NodeKind::Atomic { body } => {
                if self.run(*body, pos)? {
                    let end = self.state.last;
                    return self.run(next, end);
                }
                Ok(false)
            }

            NodeKind::Branch { alts, .. } => {
                for &alt in alts {
                    if self.run(alt, pos)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }

            NodeKind::LookAhead { cond, negative } => {
                let matched = self.run(*cond, pos)?;
                if matched != *negative {
                    self.run(next, pos)
                } else {
                    Ok(false)
                }
            }
            NodeKind::LookBehind {
                cond,
                negative,
                min,
                max,
            } => self.look_behind(next, pos, *cond, *negative, *min, *max),
            NodeKind::LookBehindEnd => {
                if pos == self.state.lookbehind_to {
                    self.run(next, pos)
                } else {
                    Ok(false)
                }
            }
        }
    }

    #[inline]
    fn cp_at(&self, pos: usize) -> u32 {
        self.input[pos] as u32
    }

    /// Shared failure path for consuming nodes: note when the region end is
    /// what stopped us.
    fn fail_consuming(&mut self, pos: usize, need: usize) -> MatchResult {
        if pos + need > self.state.to {
            self.state.hit_end = true;
        }
        Ok(false)
    }

    /// Unanchored search driver: try every start position up to
    /// `to - min_length`.
    fn start(&mut self, next: NodeId, pos: usize, min_length: usize) -> MatchResult {
        if self.state.to < min_length || pos > self.state.to - min_length {
            self.state.hit_end = true;
            return Ok(false);
        }
        let guard = self.state.to - min_length;
        for i in pos..=guard {
            if self.run(next, i)? {
                self.state.first = i;
                return Ok(true);
            }
        }
        self.state.hit_end = true;
        Ok(false)
    }

    fn slice(
        &mut self,
        next: NodeId,
        pos: usize,
        chars: &[u32],
        fold: impl Fn(u32) -> u32,
    ) -> MatchResult {
        for (j, &expected) in chars.iter().enumerate() {
            if pos + j >= self.state.to {
                self.state.hit_end = true;
                return Ok(false);
            }
            if fold(self.cp_at(pos + j)) != expected {
                return Ok(false);
            }
        }
        self.run(next, pos + chars.len())
    }

    /// Boyer-Moore scan for a leading literal: searches forward from `pos`,
    /// shifting by the larger of the bad-character and good-suffix tables.
    fn boyer_moore(
        &mut self,
        next: NodeId,
        pos: usize,
        chars: &[u32],
        last_occ: &[i32],
        good_suffix: &[usize],
    ) -> MatchResult {
        let n = chars.len();
        let mut i = pos;
        'search: while i + n <= self.state.to {
            let mut j = n;
            while j > 0 {
                j -= 1;
                let ch = self.cp_at(i + j);
                if ch != chars[j] {
                    let bad = (j as i64 + 1) - i64::from(last_occ[(ch & 0x7F) as usize]);
                    let shift = bad.max(good_suffix[j] as i64) as usize;
                    i += shift.max(1);
                    continue 'search;
                }
            }
            if self.run(next, i + n)? {
                self.state.first = i;
                return Ok(true);
            }
            i += 1;
        }
        self.state.hit_end = true;
        Ok(false)
    }

    fn line_break(&mut self, next: NodeId, pos: usize) -> MatchResult {
        if pos >= self.state.to {
            self.state.hit_end = true;
            return Ok(false);
        }
        let c = self.cp_at(pos);
        match c {
            0x0A | 0x0B | 0x0C | 0x85 | 0x2028 | 0x2029 => self.run(next, pos + 1),
            0x0D => {
                if pos + 1 < self.state.to
                    && self.cp_at(pos + 1) == 0x0A
                    && self.run(next, pos + 2)?
                {
                    return Ok(true);
                }
                self.run(next, pos + 1)
            }
            _ => Ok(false),
        }
    }

    fn caret(&mut self, next: NodeId, pos: usize, unix: bool) -> MatchResult {
        // a multiline ^ never matches at the very end of input
        if pos == self.state.to {
            self.state.hit_end = true;
            return Ok(false);
        }
        if pos > self.state.from {
            let prev = self.cp_at(pos - 1);
            let is_terminator = if unix {
                prev == 0x0A
            } else {
                matches!(prev, 0x0A | 0x0D | 0x85 | 0x2028 | 0x2029)
            };
            if !is_terminator {
                return Ok(false);
            }
            // \r\n is one line break; no line starts between the two
            if prev == 0x0D && self.cp_at(pos) == 0x0A {
                return Ok(false);
            }
        }
        self.run(next, pos)
    }

    fn dollar(&mut self, next: NodeId, pos: usize, unix: bool, multiline: bool) -> MatchResult {
        let end = self.state.to;
        if !multiline {
            if pos + 2 < end {
                return Ok(false);
            }
            if pos + 2 == end && (self.cp_at(pos) != 0x0D || self.cp_at(pos + 1) != 0x0A) {
                return Ok(false);
            }
        }
        if pos < end {
            let c = self.cp_at(pos);
            let at_terminator = if unix {
                c == 0x0A
            } else {
                matches!(c, 0x0A | 0x0D | 0x85 | 0x2028 | 0x2029)
            };
            if !at_terminator {
                return Ok(false);
            }
            if c == 0x0A && pos > self.state.from && self.cp_at(pos - 1) == 0x0D {
                // no match between \r and \n
                return Ok(false);
            }
            if multiline {
                return self.run(next, pos);
            }
        }
        // matching here depends on where the input ends
        self.state.hit_end = true;
        self.state.require_end = true;
        self.run(next, pos)
    }

    fn word_boundary(&mut self, next: NodeId, pos: usize, mode: BoundMode) -> MatchResult {
        let is_word = |c: u32| char::from_u32(c).is_some_and(|ch| ch.is_alphanumeric() || ch == '_');
        let left = pos > self.state.from && is_word(self.cp_at(pos - 1));
        let right = if pos < self.state.to {
            is_word(self.cp_at(pos))
        } else {
            self.state.hit_end = true;
            false
        };
        let ok = match mode {
            BoundMode::Both => left != right,
            BoundMode::None => left == right,
            BoundMode::Left => !left && right,
            BoundMode::Right => left && !right,
        };
        if ok { self.run(next, pos) } else { Ok(false) }
    }

    fn backref(&mut self, next: NodeId, pos: usize, group: u32, fold: FoldMode) -> MatchResult {
        let slot = (group * 2) as usize;
        let (start, end) = (self.state.groups[slot], self.state.groups[slot + 1]);
        // a group that never matched cannot be referenced back
        if start < 0 || end < 0 {
            return Ok(false);
        }
        let (start, end) = (start as usize, end as usize);
        let len = end - start;
        if pos + len > self.state.to {
            self.state.hit_end = true;
            return Ok(false);
        }
        for k in 0..len {
            let a = self.cp_at(start + k);
            let b = self.cp_at(pos + k);
            let equal = match fold {
                FoldMode::None => a == b,
                FoldMode::Ascii => ascii_fold(a) == ascii_fold(b),
                FoldMode::Unicode => simple_fold(a) == simple_fold(b),
            };
            if !equal {
                return Ok(false);
            }
        }
        self.run(next, pos + len)
    }

    // --- repetition -------------------------------------------------------

    fn ques(&mut self, next: NodeId, pos: usize, atom: NodeId, mode: QuantMode) -> MatchResult {
        match mode {
            QuantMode::Greedy => {
                if self.run(atom, pos)? {
                    let end = self.state.last;
                    if self.run(next, end)? {
                        return Ok(true);
                    }
                }
                self.run(next, pos)
            }
            QuantMode::Lazy => {
                if self.run(next, pos)? {
                    return Ok(true);
                }
                if self.run(atom, pos)? {
                    let end = self.state.last;
                    return self.run(next, end);
                }
                Ok(false)
            }
            QuantMode::Possessive => {
                let i = if self.run(atom, pos)? {
                    self.state.last
                } else {
                    pos
                };
                self.run(next, i)
            }
        }
    }

    fn curly(
        &mut self,
        next: NodeId,
        pos: usize,
        atom: NodeId,
        min: u32,
        max: u32,
        mode: QuantMode,
    ) -> MatchResult {
        let mut i = pos;
        for _ in 0..min {
            if !self.run(atom, i)? {
                return Ok(false);
            }
            i = self.state.last;
        }
        match mode {
            QuantMode::Greedy => self.curly_greedy(next, i, atom, min, max),
            QuantMode::Lazy => self.curly_lazy(next, i, atom, min, max),
            QuantMode::Possessive => {
                let mut j = min;
                while j < max {
                    if !self.run(atom, i)? {
                        break;
                    }
                    if self.state.last == i {
                        break;
                    }
                    i = self.state.last;
                    j += 1;
                }
                self.run(next, i)
            }
        }
    }

    /// Extend first, give back one iteration at a time when the
    /// continuation fails.
    fn curly_greedy(
        &mut self,
        next: NodeId,
        pos: usize,
        atom: NodeId,
        count: u32,
        max: u32,
    ) -> MatchResult {
        if count < max && self.run(atom, pos)? {
            let end = self.state.last;
            if end != pos && self.curly_greedy(next, end, atom, count + 1, max)? {
                return Ok(true);
            }
        }
        self.run(next, pos)
    }

    /// Try the continuation first, grow only on demand.
    fn curly_lazy(
        &mut self,
        next: NodeId,
        pos: usize,
        atom: NodeId,
        count: u32,
        max: u32,
    ) -> MatchResult {
        let mut i = pos;
        let mut j = count;
        loop {
            if self.run(next, i)? {
                return Ok(true);
            }
            if j >= max {
                return Ok(false);
            }
            if !self.run(atom, i)? {
                return Ok(false);
            }
            if self.state.last == i {
                return Ok(false);
            }
            i = self.state.last;
            j += 1;
        }
    }

    fn group_curly(
        &mut self,
        next: NodeId,
        pos: usize,
        params: GroupCurlyParams,
    ) -> MatchResult {
        let save_local = self.state.locals[params.local];
        let save_group = if params.capture {
            Some((
                self.state.groups[params.slot],
                self.state.groups[params.slot + 1],
            ))
        } else {
            None
        };
        self.state.locals[params.local] = -1;

        let mut i = pos;
        let mut ok = true;
        for _ in 0..params.min {
            if self.run(params.atom, i)? {
                if params.capture {
                    self.state.groups[params.slot] = i as i32;
                    self.state.groups[params.slot + 1] = self.state.last as i32;
                }
                i = self.state.last;
            } else {
                ok = false;
                break;
            }
        }
        let ret = if !ok {
            Ok(false)
        } else {
            match params.mode {
                QuantMode::Greedy => self.group_curly_greedy(next, i, &params, params.min),
                QuantMode::Lazy => self.group_curly_lazy(next, i, &params, params.min),
                QuantMode::Possessive => {
                    let mut j = params.min;
                    while j < params.max {
                        if !self.run(params.atom, i)? {
                            break;
                        }
                        if params.capture {
                            self.state.groups[params.slot] = i as i32;
                            self.state.groups[params.slot + 1] = self.state.last as i32;
                        }
                        if self.state.last == i {
                            break;
                        }
                        i = self.state.last;
                        j += 1;
                    }
                    self.run(next, i)
                }
            }
        }?;

        if !ret {
            self.state.locals[params.local] = save_local;
            if let Some((s, e)) = save_group {
                self.state.groups[params.slot] = s;
                self.state.groups[params.slot + 1] = e;
            }
        }
        Ok(ret)
    }

    fn group_curly_greedy(
        &mut self,
        next: NodeId,
        pos: usize,
        params: &GroupCurlyParams,
        count: u32,
    ) -> MatchResult {
        if count < params.max {
            let saved = (
                self.state.groups.get(params.slot).copied(),
                self.state.groups.get(params.slot + 1).copied(),
            );
            if self.run(params.atom, pos)? {
                let end = self.state.last;
                if end != pos {
                    if params.capture {
                        self.state.groups[params.slot] = pos as i32;
                        self.state.groups[params.slot + 1] = end as i32;
                    }
                    if self.group_curly_greedy(next, end, params, count + 1)? {
                        return Ok(true);
                    }
                    // gave the iteration back: restore the capture
                    if params.capture {
                        if let (Some(s), Some(e)) = saved {
                            self.state.groups[params.slot] = s;
                            self.state.groups[params.slot + 1] = e;
                        }
                    }
                } else if params.capture {
                    // a zero-length final iteration still captures
                    self.state.groups[params.slot] = pos as i32;
                    self.state.groups[params.slot + 1] = end as i32;
                }
            }
        }
        self.run(next, pos)
    }

    fn group_curly_lazy(
        &mut self,
        next: NodeId,
        pos: usize,
        params: &GroupCurlyParams,
        count: u32,
    ) -> MatchResult {
        let mut i = pos;
        let mut j = count;
        loop {
            if self.run(next, i)? {
                return Ok(true);
            }
            if j >= params.max {
                return Ok(false);
            }
            if !self.run(params.atom, i)? {
                return Ok(false);
            }
            if self.state.last == i {
                return Ok(false);
            }
            if params.capture {
                self.state.groups[params.slot] = i as i32;
                self.state.groups[params.slot + 1] = self.state.last as i32;
            }
            i = self.state.last;
            j += 1;
        }
    }

    // --- non-deterministic loops ------------------------------------------

    /// `Prolog`: seed the counter and run the first iteration (or, for
    /// `min == 0`, offer the empty match too).
    fn loop_init(&mut self, loop_id: NodeId, pos: usize) -> MatchResult {
        let &NodeKind::Loop {
            body,
            min,
            lazy,
            count_local,
            begin_local,
            ..
        } = &self.graph.node(loop_id).kind
        else {
            unreachable!("prolog must point at a loop");
        };
        let next = self.graph.node(loop_id).next;
        let count_local = count_local as usize;
        let save = self.state.locals[count_local];

        let ret = if lazy {
            if min > 0 {
                self.state.locals[count_local] = 1;
                self.body_attempt(body, begin_local, pos)?
            } else if self.run(next, pos)? {
                true
            } else {
                self.state.locals[count_local] = 1;
                self.body_attempt(body, begin_local, pos)?
            }
        } else {
            self.state.locals[count_local] = 1;
            let mut ret = self.body_attempt(body, begin_local, pos)?;
            if !ret && min == 0 {
                ret = self.run(next, pos)?;
            }
            ret
        };

        self.state.locals[count_local] = save;
        Ok(ret)
    }

    /// `Loop`: an iteration just completed at `pos`; decide between another
    /// round and the continuation.
    fn loop_iterate(&mut self, loop_id: NodeId, pos: usize) -> MatchResult {
        let &NodeKind::Loop {
            body,
            min,
            max,
            lazy,
            count_local,
            begin_local,
        } = &self.graph.node(loop_id).kind
        else {
            unreachable!("loop_iterate on a non-loop");
        };
        let next = self.graph.node(loop_id).next;
        let count_local = count_local as usize;
        let unbounded = max == REP_UNBOUNDED;

        // zero-length iterations break out to avoid spinning forever
        if pos as i32 > self.state.locals[begin_local as usize] {
            let count = self.state.locals[count_local] as u32;
            if count < min {
                self.state.locals[count_local] = (count + 1) as i32;
                let ok = self.body_attempt(body, begin_local, pos)?;
                if !ok {
                    self.state.locals[count_local] = count as i32;
                }
                return Ok(ok);
            }
            if lazy {
                if self.run(next, pos)? {
                    return Ok(true);
                }
                if unbounded || count < max {
                    self.state.locals[count_local] = (count + 1) as i32;
                    let ok = self.body_attempt(body, begin_local, pos)?;
                    if !ok {
                        self.state.locals[count_local] = count as i32;
                    }
                    return Ok(ok);
                }
                return Ok(false);
            }
            if unbounded || count < max {
                self.state.locals[count_local] = (count + 1) as i32;
                if self.body_attempt(body, begin_local, pos)? {
                    return Ok(true);
                }
                self.state.locals[count_local] = count as i32;
            }
        }
        self.run(next, pos)
    }

    /// One body attempt, with the iteration start recorded for the
    /// zero-length check.
    fn body_attempt(&mut self, body: NodeId, begin_local: u32, pos: usize) -> MatchResult {
        let begin_local = begin_local as usize;
        let save = self.state.locals[begin_local];
        self.state.locals[begin_local] = pos as i32;
        let ret = self.run(body, pos)?;
        if !ret {
            self.state.locals[begin_local] = save;
        }
        Ok(ret)
    }

    // --- lookaround -------------------------------------------------------

    fn look_behind(
        &mut self,
        next: NodeId,
        pos: usize,
        cond: NodeId,
        negative: bool,
        min: u32,
        max: u32,
    ) -> MatchResult {
        let lower = pos.saturating_sub(max as usize).max(self.state.from);
        let saved_lbt = self.state.lookbehind_to;
        self.state.lookbehind_to = pos;

        let mut matched = false;
        if pos >= min as usize {
            let mut j = pos - min as usize;
            loop {
                if j < lower {
                    break;
                }
                if self.run(cond, j)? {
                    matched = true;
                    break;
                }
                if j == 0 {
                    break;
                }
                j -= 1;
            }
        }

        self.state.lookbehind_to = saved_lbt;
        if matched != negative {
            self.run(next, pos)
        } else {
            Ok(false)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupCurlyParams {
    atom: NodeId,
    min: u32,
    max: u32,
    mode: QuantMode,
    local: usize,
    slot: usize,
    capture: bool,
}

fn ascii_fold(cp: u32) -> u32 {
    if char::from_u32(cp).is_some_and(|c| c.is_ascii_uppercase()) {
        cp | 0x20
    } else {
        cp
    }
}
