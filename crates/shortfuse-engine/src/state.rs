//! Per-call match state.
//!
//! One scratch object per match call; never shared. The input itself is
//! passed alongside (the interpreter borrows both), so the state holds only
//! region bounds, capture slots, loop locals, and the step accounting.

use crate::limits::StepLimits;

/// Scratch state for a single match call.
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Region start (inclusive, code-point index).
    pub from: usize,
    /// Region end (exclusive).
    pub to: usize,
    /// Start of the successful match; meaningful only after success.
    pub first: usize,
    /// End position recorded by the accept terminal.
    pub last: usize,
    /// Capture slots: `[start, end]` per group, `-1` when unset. Slot pair
    /// 0 is the whole match.
    pub groups: Vec<i32>,
    /// Loop counters and group-entry positions.
    pub locals: Vec<i32>,
    /// The matcher read (or depended on) the region end.
    pub hit_end: bool,
    /// Success would be invalidated by more input.
    pub require_end: bool,
    /// Whole-input matching: the accept terminal also requires `last == to`.
    pub anchored_end: bool,
    /// End anchor for an in-flight look-behind condition.
    pub lookbehind_to: usize,
    /// Where the previous match ended (`\G`).
    pub last_match_end: Option<usize>,
    pub step_count: u64,
    pub step_budget: u64,
}

impl MatchState {
    pub fn new(input_len: usize, group_count: u32, local_count: u32, limits: StepLimits) -> Self {
        MatchState {
            from: 0,
            to: input_len,
            first: 0,
            last: 0,
            groups: vec![-1; ((group_count + 1) * 2) as usize],
            locals: vec![-1; local_count as usize],
            hit_end: false,
            require_end: false,
            anchored_end: false,
            lookbehind_to: 0,
            last_match_end: None,
            step_count: 0,
            step_budget: limits.step_budget,
        }
    }

    /// Clears per-attempt state, keeping the region, the step accounting,
    /// and the `\G` anchor.
    pub fn reset_captures(&mut self) {
        self.groups.fill(-1);
        self.locals.fill(-1);
        self.hit_end = false;
        self.require_end = false;
    }

    /// Capture span of a group, if it participated in the match.
    pub fn group_span(&self, group: u32) -> Option<(usize, usize)> {
        let i = (group * 2) as usize;
        let (start, end) = (*self.groups.get(i)?, *self.groups.get(i + 1)?);
        if start < 0 || end < 0 {
            return None;
        }
        Some((start as usize, end as usize))
    }
}
