//! First/follow computation over compiled patterns.

use shortfuse_syntax::Pattern;
use shortfuse_syntax::charset::Universe;
use shortfuse_syntax::graph::{NodeKind, QuantMode};

use crate::sets::{first_set, follow_set};

fn compile(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("pattern compiles")
}

fn cp(c: char) -> u32 {
    c as u32
}

#[test]
fn first_of_a_chain_is_its_head() {
    let p = compile("abc");
    let set = first_set(p.graph(), p.match_root(), None);
    assert!(set.contains(cp('a')));
    assert!(!set.contains(cp('b')));
}

#[test]
fn first_skips_optional_heads() {
    let p = compile("x?y");
    let set = first_set(p.graph(), p.match_root(), None);
    assert!(set.contains(cp('x')));
    assert!(set.contains(cp('y')));
}

#[test]
fn first_unions_branches() {
    let p = compile("ab|cd");
    let set = first_set(p.graph(), p.match_root(), None);
    assert!(set.contains(cp('a')));
    assert!(set.contains(cp('c')));
    assert!(!set.contains(cp('b')));
}

#[test]
fn first_skips_anchors_and_groups() {
    let p = compile(r"^\b(q)r");
    let set = first_set(p.graph(), p.match_root(), None);
    assert!(set.contains(cp('q')));
    assert!(!set.contains(cp('r')));
}

fn sole_repetition(p: &Pattern) -> u32 {
    p.graph()
        .iter()
        .find_map(|(id, node)| match node.kind {
            NodeKind::Curly { mode, .. } if mode != QuantMode::Possessive => Some(id),
            NodeKind::Loop { .. } => Some(id),
            _ => None,
        })
        .expect("pattern has a repetition")
}

#[test]
fn follow_includes_continuation_and_reentry() {
    let p = compile("a*b");
    let rep = sole_repetition(&p);
    let follow = follow_set(&p, rep);
    assert!(follow.chars.contains(cp('b')), "continuation");
    assert!(follow.chars.contains(cp('a')), "re-entry");
    assert!(!follow.chars.contains(cp('c')));
    assert!(!follow.at_end);
}

#[test]
fn follow_sees_through_the_group_tail() {
    let p = compile("^(a+)+$");
    let rep = sole_repetition(&p); // the inner curly
    let follow = follow_set(&p, rep);
    // after the inner a+, either the outer loop re-enters on 'a' or the
    // pattern ends
    assert!(follow.chars.contains(cp('a')));
    assert!(follow.at_end);
    let witness = Universe.witness_outside(&follow.chars);
    assert_eq!(witness, Some(cp('!')));
}

#[test]
fn negative_lookahead_subtracts_from_follow() {
    let p = compile("a*(?!x)[xy]");
    let rep = sole_repetition(&p);
    let follow = follow_set(&p, rep);
    assert!(follow.chars.contains(cp('y')));
    assert!(!follow.chars.contains(cp('x')), "forbidden by the lookahead");
}

#[test]
fn end_anchored_follow_is_empty_but_at_end() {
    let p = compile("a*$");
    let rep = sole_repetition(&p);
    let follow = follow_set(&p, rep);
    assert!(follow.at_end);
    assert!(!follow.chars.contains(cp('b')));
}
