//! Character-set algebra over Unicode code points.
//!
//! Sets are stored as sorted, disjoint, inclusive ranges plus a `complemented`
//! flag that is applied lazily at membership time. Binary operations
//! materialize both operands against the full code space and return concrete
//! results, so operands are never mutated.
//!
//! An empty range list with `complemented = true` is the *unsatisfiable*
//! sentinel: it means "no literal character satisfies me" (the result of an
//! empty intersection between categorical sets). Callers that need a witness
//! character consult [`CharSet::default_hint`] in that case.

use std::sync::{Arc, OnceLock};

/// Largest valid code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// Reverse range (`lo > hi`) handed to [`CharSet::checked_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid character range: {lo:#x} > {hi:#x}")]
pub struct InvalidRange {
    pub lo: u32,
    pub hi: u32,
}

/// A set of code points.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CharSet {
    ranges: Vec<(u32, u32)>,
    complemented: bool,
    default_hint: Option<u32>,
}

impl CharSet {
    pub fn new() -> CharSet {
        CharSet::default()
    }

    pub fn single(cp: u32) -> CharSet {
        CharSet {
            ranges: vec![(cp, cp)],
            complemented: false,
            default_hint: None,
        }
    }

    pub fn range(lo: u32, hi: u32) -> CharSet {
        debug_assert!(lo <= hi, "reversed range; use checked_range");
        CharSet {
            ranges: vec![(lo, hi)],
            complemented: false,
            default_hint: None,
        }
    }

    /// Range constructor that rejects reversed bounds.
    pub fn checked_range(lo: u32, hi: u32) -> Result<CharSet, InvalidRange> {
        if lo > hi {
            return Err(InvalidRange { lo, hi });
        }
        Ok(CharSet::range(lo, hi))
    }

    /// The unsatisfiable sentinel: empty, but with a non-trivial predicate
    /// behind it. `contains` is false for every code point.
    pub fn unsatisfiable(default_hint: Option<u32>) -> CharSet {
        CharSet {
            ranges: Vec::new(),
            complemented: true,
            default_hint,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && !self.complemented
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.ranges.is_empty() && self.complemented
    }

    pub fn is_complemented(&self) -> bool {
        self.complemented
    }

    pub fn default_hint(&self) -> Option<u32> {
        self.default_hint
    }

    pub fn with_default_hint(mut self, hint: u32) -> CharSet {
        self.default_hint = Some(hint);
        self
    }

    pub fn add(&mut self, cp: u32) {
        self.add_range(cp, cp);
    }

    /// Inserts an inclusive range, merging with neighbors.
    pub fn add_range(&mut self, lo: u32, hi: u32) {
        debug_assert!(lo <= hi, "reversed range");
        debug_assert!(!self.complemented, "mutating a complemented set");
        let idx = self.ranges.partition_point(|&(_, h)| h.saturating_add(1) < lo);
        let mut lo = lo;
        let mut hi = hi;
        let mut end = idx;
        while end < self.ranges.len() && self.ranges[end].0 <= hi.saturating_add(1) {
            lo = lo.min(self.ranges[end].0);
            hi = hi.max(self.ranges[end].1);
            end += 1;
        }
        self.ranges.splice(idx..end, [(lo, hi)]);
    }

    /// Membership test. O(log n) over the range list.
    pub fn contains(&self, cp: u32) -> bool {
        if self.is_unsatisfiable() {
            return false;
        }
        let inside = self
            .ranges
            .binary_search_by(|&(lo, hi)| {
                if cp < lo {
                    std::cmp::Ordering::Greater
                } else if cp > hi {
                    std::cmp::Ordering::Less
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok();
        inside != self.complemented
    }

    /// Concrete ranges with the complement flag applied.
    fn materialize(&self) -> Vec<(u32, u32)> {
        if self.is_unsatisfiable() {
            return Vec::new();
        }
        if self.complemented {
            ranges_complement(&self.ranges)
        } else {
            self.ranges.clone()
        }
    }

    pub fn union(&self, other: &CharSet) -> CharSet {
        let merged = ranges_union(&self.materialize(), &other.materialize());
        CharSet {
            ranges: merged,
            complemented: false,
            default_hint: self.default_hint.or(other.default_hint),
        }
    }

    /// Intersection. An empty result is returned as the unsatisfiable
    /// sentinel so callers can fall back to a default hint.
    pub fn intersect(&self, other: &CharSet) -> CharSet {
        let merged = ranges_intersect(&self.materialize(), &other.materialize());
        let hint = self.default_hint.or(other.default_hint);
        if merged.is_empty() {
            return CharSet::unsatisfiable(hint);
        }
        CharSet {
            ranges: merged,
            complemented: false,
            default_hint: hint,
        }
    }

    pub fn difference(&self, other: &CharSet) -> CharSet {
        let merged = ranges_intersect(&self.materialize(), &ranges_complement(&other.materialize()));
        CharSet {
            ranges: merged,
            complemented: false,
            default_hint: self.default_hint,
        }
    }

    /// Lazy complement: flips the flag without touching the range list.
    pub fn complement(&self) -> CharSet {
        CharSet {
            ranges: self.ranges.clone(),
            complemented: !self.complemented,
            default_hint: self.default_hint,
        }
    }

    /// Number of code points in the set, clipped to the given universe.
    pub fn cardinality_in(&self, universe: &Universe) -> usize {
        universe.iter().filter(|&cp| self.contains(cp)).count()
    }

    /// Smallest member within the universe; falls back to the default hint
    /// for unsatisfiable or universe-disjoint sets.
    pub fn representative(&self, universe: &Universe) -> Option<u32> {
        universe
            .iter()
            .find(|&cp| self.contains(cp))
            .or(self.default_hint)
    }

    /// Iterates the concrete ranges (complement applied).
    pub fn iter_ranges(&self) -> impl Iterator<Item = (u32, u32)> {
        self.materialize().into_iter()
    }
}

impl std::fmt::Debug for CharSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unsatisfiable() {
            return write!(f, "CharSet(∅!)");
        }
        write!(f, "CharSet(")?;
        if self.complemented {
            write!(f, "^")?;
        }
        for (i, &(lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if lo == hi {
                write!(f, "{:#x}", lo)?;
            } else {
                write!(f, "{:#x}-{:#x}", lo, hi)?;
            }
        }
        write!(f, ")")
    }
}

fn ranges_union(a: &[(u32, u32)], b: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut all: Vec<(u32, u32)> = a.iter().chain(b.iter()).copied().collect();
    all.sort_unstable();
    let mut out: Vec<(u32, u32)> = Vec::with_capacity(all.len());
    for (lo, hi) in all {
        match out.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => out.push((lo, hi)),
        }
    }
    out
}

fn ranges_intersect(a: &[(u32, u32)], b: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let lo = a[i].0.max(b[j].0);
        let hi = a[i].1.min(b[j].1);
        if lo <= hi {
            out.push((lo, hi));
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

fn ranges_complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut next = 0u32;
    for &(lo, hi) in ranges {
        if lo > next {
            out.push((next, lo - 1));
        }
        next = hi.saturating_add(1);
        if next > MAX_CODE_POINT {
            return out;
        }
    }
    out.push((next, MAX_CODE_POINT));
    out
}

/// The implementation-fixed bounded alphabet categorical sets materialize
/// against: ASCII letters, digits, punctuation, common whitespace, and a few
/// control characters, in code-point order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Universe;

impl Universe {
    /// Members in ascending code-point order.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        const LOW: [u32; 8] = [0x00, 0x07, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x1B];
        LOW.into_iter().chain(0x20..0x7F)
    }

    pub fn contains(&self, cp: u32) -> bool {
        matches!(cp, 0x00 | 0x07 | 0x1B | 0x09..=0x0D | 0x20..=0x7E)
    }

    pub fn char_set(&self) -> CharSet {
        let mut set = CharSet::new();
        for cp in self.iter() {
            set.add(cp);
        }
        set
    }

    /// Smallest *printable* member not contained in `avoid`, preferred when
    /// synthesizing witness characters; falls back to any member.
    pub fn witness_outside(&self, avoid: &CharSet) -> Option<u32> {
        self.iter()
            .filter(|&cp| cp >= 0x21)
            .find(|&cp| !avoid.contains(cp))
            .or_else(|| self.iter().find(|&cp| !avoid.contains(cp)))
    }
}

/// Capability interface for categorical sets (Unicode category / block /
/// script / POSIX class). `contains` answers membership directly;
/// `enumerate` materializes against the bounded universe.
pub trait ClassPredicate: Send + Sync {
    fn contains(&self, cp: u32) -> bool;

    fn enumerate(&self, universe: &Universe) -> CharSet {
        let mut set = CharSet::new();
        for cp in universe.iter() {
            if self.contains(cp) {
                set.add(cp);
            }
        }
        set
    }
}

impl<F: Fn(u32) -> bool + Send + Sync> ClassPredicate for F {
    fn contains(&self, cp: u32) -> bool {
        self(cp)
    }
}

/// A categorical set: a named predicate plus a lazily materialized
/// enumeration. The cache write is idempotent, so racing materializations
/// are benign; `OnceLock` publishes the winner with release/acquire.
#[derive(Clone)]
pub struct PredicateSet {
    name: String,
    predicate: Arc<dyn ClassPredicate>,
    negated: bool,
    default_hint: Option<u32>,
    materialized: Arc<OnceLock<CharSet>>,
}

impl PredicateSet {
    pub fn new(name: impl Into<String>, predicate: Arc<dyn ClassPredicate>) -> PredicateSet {
        PredicateSet {
            name: name.into(),
            predicate,
            negated: false,
            default_hint: None,
            materialized: Arc::new(OnceLock::new()),
        }
    }

    pub fn with_default_hint(mut self, hint: u32) -> PredicateSet {
        self.default_hint = Some(hint);
        self
    }

    /// Negated view sharing the same predicate. The materialization cache is
    /// not shared: the negated enumeration is its own set.
    pub fn negate(&self) -> PredicateSet {
        PredicateSet {
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
            negated: !self.negated,
            default_hint: self.default_hint,
            materialized: Arc::new(OnceLock::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, cp: u32) -> bool {
        self.predicate.contains(cp) != self.negated
    }

    /// Materializes against the universe, caching the first computation.
    pub fn char_set(&self, universe: &Universe) -> &CharSet {
        self.materialized.get_or_init(|| {
            let base = self.predicate.enumerate(universe);
            let set = if self.negated {
                universe.char_set().difference(&base)
            } else {
                base
            };
            if set.is_empty() {
                return CharSet::unsatisfiable(self.default_hint);
            }
            match self.default_hint {
                Some(hint) => set.with_default_hint(hint),
                None => set,
            }
        })
    }
}

impl std::fmt::Debug for PredicateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PredicateSet({}{})",
            if self.negated { "^" } else { "" },
            self.name
        )
    }
}

/// Case-folded companions of `cp`: ASCII folding always, Unicode simple
/// folding (single-char mappings only) when `unicode` is set.
pub fn fold_additions(cp: u32, unicode: bool) -> Vec<u32> {
    let mut out = Vec::new();
    if let Some(ch) = char::from_u32(cp) {
        if ch.is_ascii_uppercase() {
            out.push(cp + 0x20);
        } else if ch.is_ascii_lowercase() {
            out.push(cp - 0x20);
        } else if unicode {
            let mut lower = ch.to_lowercase();
            let mut upper = ch.to_uppercase();
            if let (Some(l), None) = (lower.next(), lower.next()) {
                if l != ch {
                    out.push(l as u32);
                }
            }
            if let (Some(u), None) = (upper.next(), upper.next()) {
                if u != ch {
                    out.push(u as u32);
                }
            }
        }
    }
    out
}

/// Single-character simple fold used by the matcher for Unicode
/// case-insensitive comparisons: lowercase of the uppercase mapping, the way
/// two-way folding is conventionally normalized.
pub fn simple_fold(cp: u32) -> u32 {
    let Some(ch) = char::from_u32(cp) else {
        return cp;
    };
    let mut upper = ch.to_uppercase();
    let up = match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => ch,
    };
    let mut lower = up.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l as u32,
        _ => cp,
    }
}
