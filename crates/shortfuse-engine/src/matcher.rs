//! The public matching interface.
//!
//! A [`Matcher`] binds a compiled pattern to one input. `matches` anchors at
//! both ends of the region; `find` searches forward from the last match.
//! `split` and `replace_all` are derived from `find`. Every operation
//! reports [`EngineError::BudgetExceeded`] instead of looping forever when
//! a budget is set.

use shortfuse_syntax::Pattern;

use crate::error::EngineError;
use crate::interp::Interp;
use crate::limits::StepLimits;
use crate::state::MatchState;
use crate::trace::{NoopTracer, Tracer};

/// A successful match, in code-point and byte coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// Start, code-point index.
    pub start: usize,
    /// End, code-point index (exclusive).
    pub end: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// One pattern bound to one input. Holds the per-call scratch state; it is
/// cheap to construct and must not be shared across threads.
pub struct Matcher<'p, 'i> {
    pattern: &'p Pattern,
    input: &'i str,
    chars: Vec<char>,
    /// `byte_offsets[i]` is the byte offset of code point `i`;
    /// one extra slot holds the input length.
    byte_offsets: Vec<usize>,
    limits: StepLimits,
    state: MatchState,
    /// End of the previous successful `find`, for iteration and `\G`.
    search_from: usize,
}

impl<'p, 'i> Matcher<'p, 'i> {
    pub fn new(pattern: &'p Pattern, input: &'i str) -> Matcher<'p, 'i> {
        let chars: Vec<char> = input.chars().collect();
        let mut byte_offsets: Vec<usize> = input.char_indices().map(|(i, _)| i).collect();
        byte_offsets.push(input.len());
        let state = MatchState::new(
            chars.len(),
            pattern.group_count(),
            pattern.local_count(),
            StepLimits::default(),
        );
        Matcher {
            pattern,
            input,
            chars,
            byte_offsets,
            limits: StepLimits::default(),
            state,
            search_from: 0,
        }
    }

    pub fn with_limits(mut self, limits: StepLimits) -> Matcher<'p, 'i> {
        self.limits = limits;
        self.state.step_budget = limits.step_budget;
        self
    }

    /// Narrows the region, in code-point indices.
    pub fn with_region(mut self, from: usize, to: usize) -> Matcher<'p, 'i> {
        let len = self.chars.len();
        self.state.from = from.min(len);
        self.state.to = to.min(len);
        self.search_from = self.state.from;
        self
    }

    /// Steps consumed so far, observable even after `BudgetExceeded`.
    pub fn steps(&self) -> u64 {
        self.state.step_count
    }

    pub fn hit_end(&self) -> bool {
        self.state.hit_end
    }

    pub fn require_end(&self) -> bool {
        self.state.require_end
    }

    /// Forgets previous matches and step counts.
    pub fn reset(&mut self) {
        self.state = MatchState::new(
            self.chars.len(),
            self.pattern.group_count(),
            self.pattern.local_count(),
            self.limits,
        );
        self.search_from = self.state.from;
    }

    /// Anchored match: succeeds only if the entire region is consumed.
    pub fn matches(&mut self) -> Result<bool, EngineError> {
        self.matches_with(&mut NoopTracer)
    }

    pub fn matches_with<T: Tracer>(&mut self, tracer: &mut T) -> Result<bool, EngineError> {
        self.state.reset_captures();
        self.state.anchored_end = true;
        let from = self.state.from;
        let result = self.execute(self.pattern.match_root(), from, tracer);
        self.state.anchored_end = false;
        let ok = result?;
        if ok {
            self.state.first = from;
            self.record_whole_match();
        }
        Ok(ok)
    }

    /// Anchored at the region start only.
    pub fn looking_at(&mut self) -> Result<bool, EngineError> {
        self.state.reset_captures();
        let from = self.state.from;
        let ok = self.execute(self.pattern.match_root(), from, &mut NoopTracer)?;
        if ok {
            self.state.first = from;
            self.record_whole_match();
        }
        Ok(ok)
    }

    /// Finds the next match at or after the previous one.
    pub fn find(&mut self) -> Result<Option<MatchSpan>, EngineError> {
        let from = self.search_from;
        self.find_from(from)
    }

    /// Finds the first match at or after `pos` (code-point index).
    pub fn find_from(&mut self, pos: usize) -> Result<Option<MatchSpan>, EngineError> {
        self.find_from_with(pos, &mut NoopTracer)
    }

    pub fn find_from_with<T: Tracer>(
        &mut self,
        pos: usize,
        tracer: &mut T,
    ) -> Result<Option<MatchSpan>, EngineError> {
        self.state.reset_captures();
        let pos = pos.max(self.state.from);
        let ok = self.execute(self.pattern.root(), pos, tracer)?;
        if !ok {
            return Ok(None);
        }
        self.record_whole_match();
        let (start, end) = (self.state.first, self.state.last);
        self.state.last_match_end = Some(end);
        // a zero-length match must not pin the iteration in place
        self.search_from = if end == start { end + 1 } else { end };
        Ok(Some(self.span(start, end)))
    }

    /// Capture span of a group, after a successful operation.
    pub fn group(&self, group: u32) -> Option<MatchSpan> {
        let (start, end) = self.state.group_span(group)?;
        Some(self.span(start, end))
    }

    /// Capture text of a group.
    pub fn group_str(&self, group: u32) -> Option<&'i str> {
        let span = self.group(group)?;
        Some(&self.input[span.byte_start..span.byte_end])
    }

    /// Capture text of a named group.
    pub fn group_name(&self, name: &str) -> Option<&'i str> {
        self.group_str(self.pattern.group_index(name)?)
    }

    /// All non-overlapping matches, left to right.
    pub fn find_all(&mut self) -> Result<Vec<MatchSpan>, EngineError> {
        let mut out = Vec::new();
        while let Some(span) = self.find()? {
            out.push(span);
            if self.search_from > self.state.to {
                break;
            }
        }
        Ok(out)
    }

    /// Splits the input around matches. Trailing empty fields are kept;
    /// a zero-length match contributes a split point like any other.
    pub fn split(&mut self) -> Result<Vec<&'i str>, EngineError> {
        let mut out = Vec::new();
        let mut field_start = self.byte_offsets[self.state.from];
        for span in self.find_all()? {
            out.push(&self.input[field_start..span.byte_start]);
            field_start = span.byte_end;
        }
        out.push(&self.input[field_start..self.byte_offsets[self.state.to]]);
        Ok(out)
    }

    /// Replaces every match with `replacement`, expanding `$0`..`$9` to
    /// capture text.
    pub fn replace_all(&mut self, replacement: &str) -> Result<String, EngineError> {
        let mut out = String::new();
        let mut copied = self.byte_offsets[self.state.from];
        while let Some(span) = self.find()? {
            out.push_str(&self.input[copied..span.byte_start]);
            self.expand_replacement(replacement, &mut out);
            copied = span.byte_end;
            if self.search_from > self.state.to {
                break;
            }
        }
        out.push_str(&self.input[copied..self.byte_offsets[self.state.to]]);
        Ok(out)
    }

    fn expand_replacement(&self, replacement: &str, out: &mut String) {
        let mut chars = replacement.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '$' {
                if let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    chars.next();
                    if let Some(text) = self.group_str(d) {
                        out.push_str(text);
                    }
                    continue;
                }
            }
            if c == '\\' {
                if let Some(&escaped) = chars.peek() {
                    chars.next();
                    out.push(escaped);
                    continue;
                }
            }
            out.push(c);
        }
    }

    fn record_whole_match(&mut self) {
        self.state.groups[0] = self.state.first as i32;
        self.state.groups[1] = self.state.last as i32;
    }

    fn span(&self, start: usize, end: usize) -> MatchSpan {
        MatchSpan {
            start,
            end,
            byte_start: self.byte_offsets[start],
            byte_end: self.byte_offsets[end],
        }
    }

    fn execute<T: Tracer>(
        &mut self,
        entry: shortfuse_syntax::graph::NodeId,
        pos: usize,
        tracer: &mut T,
    ) -> Result<bool, EngineError> {
        let mut interp = Interp {
            graph: self.pattern.graph(),
            input: &self.chars,
            state: &mut self.state,
            tracer,
        };
        interp.run(entry, pos)
    }
}

/// Convenience predicate: does the pattern match anywhere in `input`?
pub fn is_match(pattern: &Pattern, input: &str) -> Result<bool, EngineError> {
    Ok(Matcher::new(pattern, input).find()?.is_some())
}
