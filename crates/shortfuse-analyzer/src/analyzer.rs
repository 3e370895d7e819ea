//! The vulnerability scan: candidates in, confirmed findings out.

use std::collections::HashSet;

use shortfuse_engine::{EngineError, Matcher, StepLimits};
use shortfuse_syntax::Pattern;
use shortfuse_syntax::charset::{CharSet, Universe};
use shortfuse_syntax::graph::NodeKind;

use crate::config::AnalyzerConfig;
use crate::finding::Finding;
use crate::pumps::{Repetition, candidates, collect_repetitions, min_string};
use crate::sets::{FollowInfo, first_set, follow_set};

/// Analyzes a compiled pattern for catastrophic backtracking.
///
/// Every non-possessive repetition is examined; a finding is emitted only
/// when a synthesized `prefix · pump^k · suffix` input actually drives the
/// interpreter past `config.step_threshold` steps. Non-vulnerable patterns
/// produce an empty list, never an error.
pub fn analyze(pattern: &Pattern, config: &AnalyzerConfig) -> Vec<Finding> {
    let mut findings: Vec<Finding> = Vec::new();
    let mut attacks_seen: HashSet<(String, String, String)> = HashSet::new();

    for rep in collect_repetitions(pattern) {
        if findings.len() >= config.max_findings {
            break;
        }
        let follow = follow_set(pattern, rep.id);
        let body_first = first_set(pattern.graph(), rep.body, rep.body_stop);
        let prefix = build_prefix(pattern, &rep);
        let suffix = build_suffix(&follow, &body_first);

        for pump in candidates(pattern, &rep) {
            let key = (prefix.clone(), pump.clone(), suffix.clone());
            if attacks_seen.contains(&key) {
                break;
            }
            if let Some(steps) = validate(pattern, &prefix, &pump, &suffix, config) {
                attacks_seen.insert(key);
                findings.push(Finding {
                    prefix: prefix.clone(),
                    pump,
                    suffix: suffix.clone(),
                    steps,
                    node_span: rep.span,
                });
                break;
            }
        }
    }

    findings.sort_by_key(|f| f.node_span);
    findings
}

/// Required input that reaches the repetition: walk the attacker path
/// backwards through `direct_prev`/`direct_parent`, emitting the minimal
/// contribution of every node that precedes the repetition at each nesting
/// level. Optional and zero-width nodes contribute nothing.
fn build_prefix(pattern: &Pattern, rep: &Repetition) -> String {
    let graph = pattern.graph();
    let wiring = pattern.wiring();
    let mut pieces_rev: Vec<String> = Vec::new();
    let mut cur = rep.id;
    loop {
        let mut prev = wiring.direct_prev(cur);
        while let Some(node) = prev {
            pieces_rev.push(node_min_contribution(pattern, node));
            prev = wiring.direct_prev(node);
        }
        match wiring.direct_parent(cur) {
            Some(parent) => cur = parent,
            None => break,
        }
    }
    pieces_rev.reverse();
    pieces_rev.concat()
}

/// Minimal text one chain node must consume, without walking past it.
fn node_min_contribution(pattern: &Pattern, id: shortfuse_syntax::graph::NodeId) -> String {
    let graph = pattern.graph();
    match &graph.node(id).kind {
        NodeKind::Prolog { .. } => String::new(),
        NodeKind::Branch { alts, conn } => alts
            .iter()
            .map(|&alt| min_string(graph, alt, Some(*conn)))
            .min_by_key(|s| s.chars().count())
            .unwrap_or_default(),
        _ => min_string(graph, id, Some(graph.node(id).next)),
    }
}

/// A character that neither continues the match after the repetition nor
/// feeds another iteration. When every universe character would continue,
/// fall back to one merely outside the follow-set, then to `!`.
fn build_suffix(follow: &FollowInfo, body_first: &CharSet) -> String {
    let universe = Universe;
    let avoid = follow.chars.union(body_first);
    let witness = universe
        .witness_outside(&avoid)
        .or_else(|| universe.witness_outside(&follow.chars))
        .unwrap_or('!' as u32);
    char::from_u32(witness).map(String::from).unwrap_or_default()
}

/// Runs the interpreter on the synthesized attack under the threshold
/// budget. `Some(steps)` when the budget blew, `None` otherwise.
fn validate(
    pattern: &Pattern,
    prefix: &str,
    pump: &str,
    suffix: &str,
    config: &AnalyzerConfig,
) -> Option<u64> {
    let mut input =
        String::with_capacity(prefix.len() + pump.len() * config.pump_count as usize + suffix.len());
    input.push_str(prefix);
    for _ in 0..config.pump_count {
        input.push_str(pump);
    }
    input.push_str(suffix);

    let mut matcher =
        Matcher::new(pattern, &input).with_limits(StepLimits::budget(config.step_threshold));
    match matcher.matches() {
        Err(EngineError::BudgetExceeded { steps }) => Some(steps),
        Ok(_) => None,
    }
}
