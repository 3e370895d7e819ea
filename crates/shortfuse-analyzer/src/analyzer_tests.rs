//! End-to-end analysis scenarios.

use shortfuse_engine::{Matcher, StepLimits};
use shortfuse_syntax::Pattern;

use crate::analyzer::analyze;
use crate::config::AnalyzerConfig;
use crate::finding::Finding;

fn compile(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("pattern compiles")
}

/// Wide margins: at 16 pumps an exponential blowup sails past 50k steps
/// while linear and bounded patterns stay in the tens.
fn config() -> AnalyzerConfig {
    AnalyzerConfig::default()
        .with_threshold(50_000)
        .with_pump_count(16)
}

fn analyze_str(pattern: &str) -> Vec<Finding> {
    analyze(&compile(pattern), &config())
}

#[test]
fn nested_plus_is_vulnerable() {
    let findings = analyze_str(r"^(a+)+$");
    assert_eq!(findings.len(), 1, "findings: {:?}", findings);
    let f = &findings[0];
    assert_eq!(f.prefix, "");
    assert_eq!(f.pump, "a");
    assert_eq!(f.suffix, "!");
    assert!(f.steps > 50_000);
}

#[test]
fn overlapping_alternation_is_exponential() {
    let findings = analyze_str(r"^(a|a)+$");
    assert_eq!(findings.len(), 1, "findings: {:?}", findings);
    let f = &findings[0];
    assert_eq!(f.pump, "a");
    assert_eq!(f.suffix, "!");

    // doubling the pump count at least doubles the work
    let pattern = compile(r"^(a|a)+$");
    let steps_at = |k: u32| {
        let input = f.attack_input(k);
        let mut m = Matcher::new(&pattern, &input).with_limits(StepLimits::UNLIMITED);
        assert!(!m.matches().expect("unlimited budget"));
        m.steps()
    };
    let lo = steps_at(12);
    let hi = steps_at(13);
    assert!(hi * 10 >= lo * 18, "expected doubling, got {} -> {}", lo, hi);
}

#[test]
fn linear_patterns_are_clean() {
    for pattern in [r"a+", r"a*b", r"a{3,5}c", r"(?>a*)b", r"a*+b", r"abc|def"] {
        let findings = analyze_str(pattern);
        assert!(findings.is_empty(), "{pattern}: {:?}", findings);
    }
}

#[test]
fn possessive_wrapping_neutralizes_the_inner_loop() {
    // (?>a+)+ flattens to a+ once the atomic group commits
    let findings = analyze_str(r"(?>a+)+");
    assert!(findings.is_empty(), "findings: {:?}", findings);
}

#[test]
fn finding_includes_the_repetition_span() {
    let findings = analyze_str(r"^(a+)+$");
    let (begin, end) = findings[0].node_span;
    let pattern = r"^(a+)+$";
    assert_eq!(&pattern[begin..end], "(a+)+");
}

#[test]
fn prefix_reaches_the_repetition() {
    let findings = analyze_str(r"x-(a+)+$");
    assert_eq!(findings.len(), 1, "findings: {:?}", findings);
    assert_eq!(findings[0].prefix, "x-");
    assert_eq!(findings[0].pump, "a");
}

#[test]
fn suffix_avoids_the_follow_set() {
    // '!' would be consumed by the class, so the witness moves past it
    let findings = analyze_str(r"^([!a]+)+$");
    assert_eq!(findings.len(), 1, "findings: {:?}", findings);
    assert_ne!(findings[0].suffix, "!");
    assert_ne!(findings[0].suffix, "a");
    assert!(!findings[0].suffix.is_empty());
}

#[test]
fn flag_argument_tail_is_vulnerable() {
    // the argument of one flag can swallow the next flag entirely, so
    // iteration boundaries are ambiguous
    let pattern =
        r#"((?:^|[&(])[ \t]*)for(?: ?/[a-z?](?:[ :](?:"[^"]*"|\S+))?)* \S+ in \([^)]+\) do"#;
    let config = AnalyzerConfig::default()
        .with_threshold(10_000)
        .with_pump_count(20);
    let findings = analyze(&compile(pattern), &config);
    assert!(!findings.is_empty());
    let flagish = findings.iter().find(|f| f.pump.contains('/')).expect(
        "a finding whose pump is a flag-like fragment",
    );
    assert_eq!(flagish.prefix, "for");
}

#[test]
fn multiple_vulnerable_repetitions_each_report() {
    let findings = analyze_str(r"^(a+)+x(b|b)+$");
    assert!(findings.len() >= 2, "findings: {:?}", findings);
    assert!(findings.iter().any(|f| f.pump == "a"));
    assert!(findings.iter().any(|f| f.pump == "b"));
    // ordered by position in the pattern
    let spans: Vec<_> = findings.iter().map(|f| f.node_span.0).collect();
    let mut sorted = spans.clone();
    sorted.sort_unstable();
    assert_eq!(spans, sorted);
}

#[test]
fn duplicate_attacks_collapse() {
    // outer loop and inner curly produce the same attack string; only one
    // finding survives
    let findings = analyze_str(r"^(a+)+$");
    assert_eq!(findings.len(), 1);
}

#[test]
fn max_findings_caps_the_scan() {
    let config = config().with_max_findings(1);
    let findings = analyze(&compile(r"^(a+)+x(b|b)+$"), &config);
    assert_eq!(findings.len(), 1);
}

#[test]
fn findings_serialize_to_json() {
    let findings = analyze_str(r"^(a|a)+$");
    let json = serde_json::to_value(&findings[0]).expect("serializable");
    assert_eq!(json["pump"], "a");
    assert_eq!(json["suffix"], "!");
    assert!(json["steps"].as_u64().unwrap() > 0);
    assert!(json["node_span"].is_array());
}

#[test]
fn attack_input_assembles_the_triple() {
    let finding = Finding {
        prefix: "x".into(),
        pump: "ab".into(),
        suffix: "!".into(),
        steps: 0,
        node_span: (0, 0),
    };
    assert_eq!(finding.attack_input(3), "xababab!");
    assert_eq!(finding.attack_input(0), "x!");
}

#[test]
fn empty_and_anchor_only_patterns_are_clean() {
    for pattern in ["", "^", "$", r"\b"] {
        assert!(analyze_str(pattern).is_empty(), "{pattern:?}");
    }
}

#[test]
fn lazy_repetition_can_still_backtrack() {
    // lazy changes the visit order, not the amount of work on failure
    let findings = analyze_str(r"^(a+?)+$");
    assert_eq!(findings.len(), 1, "findings: {:?}", findings);
    assert_eq!(findings[0].pump, "a");
}
