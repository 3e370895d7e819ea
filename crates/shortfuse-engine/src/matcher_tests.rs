//! Matcher operations derived from `find`: iteration, split, replace, and
//! the region/group accessors.

use shortfuse_syntax::Pattern;

use crate::limits::StepLimits;
use crate::matcher::{Matcher, is_match};

fn compile(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("pattern compiles")
}

#[test]
fn matches_iff_find_covers_the_input() {
    let p = compile("a*b");
    for input in ["b", "ab", "aaab"] {
        let mut m = Matcher::new(&p, input);
        assert!(m.matches().unwrap(), "matches {:?}", input);
        let mut m = Matcher::new(&p, input);
        let span = m.find().unwrap().expect("find succeeds where matches does");
        assert_eq!((span.start, span.end), (0, input.chars().count()));
    }

    let mut m = Matcher::new(&p, "aabx");
    assert!(!m.matches().unwrap());
    let span = Matcher::new(&p, "aabx").find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (0, 3));
}

#[test]
fn find_iterates_without_overlap() {
    let p = compile("a+");
    let spans: Vec<_> = Matcher::new(&p, "aa b aaa")
        .find_all()
        .unwrap()
        .into_iter()
        .map(|s| (s.start, s.end))
        .collect();
    assert_eq!(spans, vec![(0, 2), (5, 8)]);
}

#[test]
fn zero_length_matches_advance() {
    let p = compile("a*");
    let spans: Vec<_> = Matcher::new(&p, "ab")
        .find_all()
        .unwrap()
        .into_iter()
        .map(|s| (s.start, s.end))
        .collect();
    assert_eq!(spans, vec![(0, 1), (1, 1), (2, 2)]);
}

#[test]
fn groups_by_index_and_name() {
    let p = compile(r"(?<year>\d{4})-(\d{2})");
    let mut m = Matcher::new(&p, "on 2024-07 we");
    let span = m.find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (3, 10));
    assert_eq!(m.group_str(0), Some("2024-07"));
    assert_eq!(m.group_str(1), Some("2024"));
    assert_eq!(m.group_str(2), Some("07"));
    assert_eq!(m.group_name("year"), Some("2024"));
    assert_eq!(m.group_name("month"), None);
}

#[test]
fn unset_group_is_none() {
    let p = compile("(a)|(b)");
    let mut m = Matcher::new(&p, "b");
    m.find().unwrap().unwrap();
    assert_eq!(m.group_str(1), None);
    assert_eq!(m.group_str(2), Some("b"));
}

#[test]
fn split_concat_roundtrip() {
    let p = compile(",");
    let input = "a,bb,,c";
    let fields = Matcher::new(&p, input).split().unwrap();
    assert_eq!(fields, vec!["a", "bb", "", "c"]);

    // interleaving fields with the separators reconstructs the input
    let matches = Matcher::new(&p, input).find_all().unwrap();
    let mut rebuilt = String::new();
    for (i, field) in fields.iter().enumerate() {
        rebuilt.push_str(field);
        if let Some(span) = matches.get(i) {
            rebuilt.push_str(&input[span.byte_start..span.byte_end]);
        }
    }
    assert_eq!(rebuilt, input);
}

#[test]
fn replace_all_with_group_expansion() {
    let p = compile("(a+)");
    let out = Matcher::new(&p, "caat baaad").replace_all("<$1>").unwrap();
    assert_eq!(out, "c<aa>t b<aaa>d");

    let p = compile("x");
    let out = Matcher::new(&p, "axbxc").replace_all("-").unwrap();
    assert_eq!(out, "a-b-c");
}

#[test]
fn split_on_line_breaks() {
    let p = compile(r"\R");
    let input = indoc::indoc! {"
        alpha
        beta
        gamma"};
    let fields = Matcher::new(&p, input).split().unwrap();
    assert_eq!(fields, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn region_narrows_the_search() {
    let p = compile("a");
    let mut m = Matcher::new(&p, "a a a").with_region(1, 4);
    let span = m.find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (2, 3));

    let mut m = Matcher::new(&p, "a a a").with_region(1, 2);
    assert_eq!(m.find().unwrap(), None);
}

#[test]
fn non_ascii_byte_offsets() {
    let p = compile("é+");
    let input = "caféé!";
    let mut m = Matcher::new(&p, input);
    let span = m.find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (3, 5));
    assert_eq!(&input[span.byte_start..span.byte_end], "éé");
}

#[test]
fn predicate_helper() {
    let p = compile("b+");
    assert!(is_match(&p, "abc").unwrap());
    assert!(!is_match(&p, "acd").unwrap());
}

#[test]
fn steps_accumulate_across_finds() {
    let p = compile("a");
    let mut m = Matcher::new(&p, "aaa").with_limits(StepLimits::budget(1_000));
    m.find_all().unwrap();
    assert!(m.steps() > 0);
    m.reset();
    assert_eq!(m.steps(), 0);
}

#[test]
fn empty_pattern_and_empty_input() {
    let p = compile("");
    assert!(Matcher::new(&p, "").matches().unwrap());
    let span = Matcher::new(&p, "xy").find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (0, 0));

    let p = compile("a");
    assert!(!Matcher::new(&p, "").matches().unwrap());
    assert_eq!(Matcher::new(&p, "").find().unwrap(), None);
}

#[test]
fn single_anchor_pattern() {
    let p = compile("^");
    assert!(Matcher::new(&p, "").matches().unwrap());
    let span = Matcher::new(&p, "ab").find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (0, 0));

    let p = compile("$");
    let span = Matcher::new(&p, "ab").find().unwrap().unwrap();
    assert_eq!((span.start, span.end), (2, 2));
}
