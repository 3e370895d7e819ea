//! Interpreter semantics: quantifier modes, anchors, lookaround, references,
//! and the step budget.

use shortfuse_syntax::{Flags, Pattern};

use crate::error::EngineError;
use crate::limits::StepLimits;
use crate::matcher::Matcher;

fn compile(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("pattern compiles")
}

fn compile_flags(pattern: &str, flags: Flags) -> Pattern {
    Pattern::with_flags(pattern, flags).expect("pattern compiles")
}

fn find_span(pattern: &str, input: &str) -> Option<(usize, usize)> {
    let p = compile(pattern);
    let mut m = Matcher::new(&p, input);
    m.find()
        .expect("no budget set")
        .map(|span| (span.start, span.end))
}

fn full_match(pattern: &str, input: &str) -> bool {
    let p = compile(pattern);
    Matcher::new(&p, input).matches().expect("no budget set")
}

#[test]
fn literal_and_slice() {
    assert_eq!(find_span("abc", "xxabcx"), Some((2, 5)));
    assert_eq!(find_span("abc", "ab"), None);
    assert!(full_match("abc", "abc"));
    assert!(!full_match("abc", "abcd"));
}

#[test]
fn boyer_moore_leading_literal() {
    // 5 chars upgrades the unanchored search to a Boyer-Moore scan
    assert_eq!(find_span("hello", "say hello"), Some((4, 9)));
    assert_eq!(find_span("hello", "hellx hello"), Some((6, 11)));
    assert_eq!(find_span("hello", "hell"), None);
}

#[test]
fn greedy_takes_most() {
    let p = compile("a{2,3}");
    let mut m = Matcher::new(&p, "aaaa");
    let span = m.find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (0, 3));
}

#[test]
fn lazy_takes_least() {
    assert_eq!(find_span("a+?", "aaa"), Some((0, 1)));
    assert_eq!(find_span("a{2,3}?", "aaaa"), Some((0, 2)));
}

#[test]
fn possessive_never_gives_back() {
    assert!(!full_match("a*+a", "aaa"));
    assert!(full_match("a*+b", "aaab"));
}

#[test]
fn alternation_prefers_earlier_branches() {
    assert_eq!(find_span("foo|foobar", "foobar"), Some((0, 3)));
    // backtracking into the second branch when the continuation demands it
    assert!(full_match("(foo|foobar)bar", "foobarbar"));
    assert!(full_match("(foo|foobar)", "foobar"));
}

#[test]
fn atomic_group_commits() {
    assert!(full_match("(a|ab)c", "abc"));
    assert!(!full_match("(?>a|ab)c", "abc"));
    assert!(full_match("(?>ab|a)c", "abc"));
}

#[test]
fn backreference() {
    assert!(full_match(r"(ab)\1", "abab"));
    assert!(!full_match(r"(ab)\1", "abac"));
    // a group that did not participate cannot be referenced back
    assert!(!full_match(r"(a)?b\1", "b"));
    assert!(full_match(r"(a)?b\1", "aba"));
}

#[test]
fn named_backreference() {
    assert!(full_match(r"(?<word>ab)-\k<word>", "ab-ab"));
    assert!(!full_match(r"(?<word>ab)-\k<word>", "ab-ba"));
}

#[test]
fn begin_end_anchors() {
    assert!(full_match(r"\Aab\z", "ab"));
    assert_eq!(find_span("^b", "ab"), None);
    assert_eq!(find_span("b$", "ba b"), Some((3, 4)));
}

#[test]
fn multiline_caret_and_dollar() {
    let p = compile_flags("^b", Flags::MULTILINE);
    let mut m = Matcher::new(&p, "a\nb");
    let span = m.find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (2, 3));

    let p = compile_flags("a$", Flags::MULTILINE);
    let mut m = Matcher::new(&p, "a\nb");
    let span = m.find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (0, 1));
}

#[test]
fn dollar_before_final_newline() {
    // non-multiline $ matches before one trailing line terminator
    assert_eq!(find_span("a$", "a\n"), Some((0, 1)));
    assert_eq!(find_span("a$", "a\nb"), None);
}

#[test]
fn word_boundaries() {
    assert_eq!(find_span(r"\bfoo\b", "a foo bar"), Some((2, 5)));
    assert_eq!(find_span(r"\bfoo\b", "afoob"), None);
    assert_eq!(find_span(r"\Boo\B", "food"), Some((1, 3)));
}

#[test]
fn continuation_anchor() {
    let p = compile(r"\Ga");
    let mut m = Matcher::new(&p, "aaab");
    let spans: Vec<_> = m
        .find_all()
        .unwrap()
        .into_iter()
        .map(|s| (s.start, s.end))
        .collect();
    assert_eq!(spans, vec![(0, 1), (1, 2), (2, 3)]);
}

#[test]
fn lookahead() {
    assert_eq!(find_span("a(?=b)", "ab"), Some((0, 1)));
    assert_eq!(find_span("a(?=b)", "ac"), None);
    assert_eq!(find_span("a(?!b)", "ab ac"), Some((3, 4)));
}

#[test]
fn lookbehind() {
    assert_eq!(find_span("(?<=a)b", "ab cb"), Some((1, 2)));
    assert_eq!(find_span("(?<!a)b", "ab cb"), Some((4, 5)));
    // variable but bounded length
    assert_eq!(find_span("(?<=a{1,3})b", "aaab"), Some((3, 4)));
}

#[test]
fn dot_and_dotall() {
    assert_eq!(find_span(".", "\na"), Some((1, 2)));
    let p = compile_flags(".", Flags::DOTALL);
    let mut m = Matcher::new(&p, "\na");
    assert_eq!(m.find().unwrap().map(|s| (s.start, s.end)), Some((0, 1)));
}

#[test]
fn line_break_escape() {
    assert!(full_match(r"a\Rb", "a\nb"));
    // \r\n is consumed as one line break
    assert!(full_match(r"a\Rb", "a\r\nb"));
    assert!(!full_match(r"a\Rb", "a\tb"));
}

#[test]
fn case_insensitive_slice() {
    let p = compile_flags("abc", Flags::CASE_INSENSITIVE);
    assert!(Matcher::new(&p, "aBc").matches().unwrap());
    assert!(!Matcher::new(&p, "aBd").matches().unwrap());
}

#[test]
fn unicode_case_fold() {
    let flags = Flags::CASE_INSENSITIVE | Flags::UNICODE_CASE;
    let p = compile_flags("straße", flags);
    assert!(Matcher::new(&p, "STRAßE").matches().unwrap());
}

#[test]
fn character_classes() {
    assert_eq!(find_span("[b-d]+", "abcde"), Some((1, 4)));
    assert_eq!(find_span("[^a]+", "aab"), Some((2, 3)));
    assert_eq!(find_span(r"[\d]+", "ab123"), Some((2, 5)));
    assert_eq!(find_span("[a-c&&b-d]+", "abcd"), Some((1, 3)));
}

#[test]
fn doubly_negated_class() {
    // a class whose only item is a negated escape, itself negated
    assert_eq!(find_span(r"[^\W]+", "!!ab!"), Some((2, 4)));
    assert_eq!(find_span(r"[^\W]+", "!!!"), None);
}

#[test]
fn unicode_property_class() {
    assert_eq!(find_span(r"\p{Lu}+", "abcDEfg"), Some((3, 5)));
    assert_eq!(find_span(r"\P{Lu}+", "ABcdEF"), Some((2, 4)));
}

#[test]
fn zero_length_loop_terminates() {
    assert!(full_match("(a?)*", "aaa"));
    assert!(full_match("(a*)*", ""));
    assert_eq!(find_span("(?:a?)+", "b"), Some((0, 0)));
}

#[test]
fn quantified_group_captures_last_iteration() {
    let p = compile("(ab)+");
    let mut m = Matcher::new(&p, "ababab");
    m.find().unwrap().unwrap();
    let g = m.group(1).unwrap();
    assert_eq!((g.start, g.end), (4, 6));
}

#[test]
fn tracer_sees_every_step() {
    let p = compile("ab");
    let mut tracer = crate::trace::RecordingTracer::new();
    let mut m = Matcher::new(&p, "ab");
    assert!(m.matches_with(&mut tracer).unwrap());
    assert_eq!(tracer.visits.len() as u64, m.steps());
    assert_eq!(tracer.accepts, vec![2]);
}

#[test]
fn budget_exceeded_is_reported() {
    let p = compile("^(a+)+$");
    let input = format!("{}!", "a".repeat(24));
    let mut m = Matcher::new(&p, &input).with_limits(StepLimits::budget(10_000));
    let err = m.matches().unwrap_err();
    assert!(matches!(err, EngineError::BudgetExceeded { steps } if steps > 10_000));
    assert!(m.steps() > 10_000);
}

#[test]
fn budget_zero_is_unlimited() {
    let p = compile("a+b");
    let mut m = Matcher::new(&p, "aaab").with_limits(StepLimits::UNLIMITED);
    assert!(m.matches().unwrap());
}

#[test]
fn possessive_matching_stays_linear() {
    let p = compile("a*+b");
    let input = format!("{}c", "a".repeat(50));
    let mut m = Matcher::new(&p, &input);
    assert!(!m.matches().unwrap());
    // one pass over the input plus constant overhead, no backtracking
    assert!(m.steps() < 150, "steps = {}", m.steps());
}

#[test]
fn atomic_group_matching_stays_linear() {
    let p = compile("(?>a*)b");
    let input = format!("{}c", "a".repeat(50));
    let mut m = Matcher::new(&p, &input);
    assert!(!m.matches().unwrap());
    assert!(m.steps() < 200, "steps = {}", m.steps());
}

#[test]
fn disjoint_alternation_loop_stays_cheap() {
    // (a|b)* has a unique derivation per input, so the loop walks it once
    // and fails in linear time even without a match
    let p = compile("^(a|b)*c");
    let input = "a".repeat(26);
    let mut m = Matcher::new(&p, &input).with_limits(StepLimits::budget(100_000));
    assert_eq!(m.find().unwrap(), None);
}

#[test]
fn budget_aborts_ambiguous_alternation_loop() {
    // (a|aa)* derives a^n in Fibonacci-many ways; the budget cuts the
    // search off mid-explosion
    let p = compile("^(a|aa)*c");
    let input = "a".repeat(25);
    let mut m = Matcher::new(&p, &input).with_limits(StepLimits::budget(100_000));
    let result = m.find();
    assert!(matches!(result, Err(EngineError::BudgetExceeded { .. })));
}
