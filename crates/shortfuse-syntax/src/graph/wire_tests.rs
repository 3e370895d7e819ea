//! The analyzer wiring side table.

use crate::graph::{NodeId, NodeKind};
use crate::pattern::Pattern;

fn compile(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("pattern compiles")
}

fn find_node(p: &Pattern, pred: impl Fn(&NodeKind) -> bool) -> NodeId {
    p.graph()
        .iter()
        .find_map(|(id, node)| pred(&node.kind).then_some(id))
        .expect("node present")
}

#[test]
fn chain_links_follow_pattern_order() {
    let p = compile("ab*c");
    let w = p.wiring();
    let a = find_node(&p, |k| matches!(k, NodeKind::Char { cp } if *cp == 'a' as u32));
    let rep = find_node(&p, |k| matches!(k, NodeKind::Curly { .. }));
    let c = find_node(&p, |k| matches!(k, NodeKind::Char { cp } if *cp == 'c' as u32));

    assert_eq!(w.direct_next(a), Some(rep));
    assert_eq!(w.direct_next(rep), Some(c));
    assert_eq!(w.direct_next(c), None, "pattern end");
    assert_eq!(w.direct_prev(c), Some(rep));
    assert_eq!(w.direct_prev(rep), Some(a));
}

#[test]
fn sub_next_descends_into_bodies() {
    let p = compile("a(b|c)*");
    let w = p.wiring();
    let loop_node = find_node(&p, |k| matches!(k, NodeKind::Loop { .. }));
    let branch = find_node(&p, |k| matches!(k, NodeKind::Branch { .. }));
    let prolog = find_node(&p, |k| matches!(k, NodeKind::Prolog { .. }));

    // the attacker sees the loop as one step, entered via the prolog
    assert_eq!(w.direct_next(prolog), Some(loop_node));
    // descending: loop -> group head -> branch
    let head = w.sub_next(loop_node).expect("loop body");
    assert!(matches!(p.graph().node(head).kind, NodeKind::GroupHead { .. }));
    assert_eq!(w.direct_next(head), Some(branch));
}

#[test]
fn body_tail_cycles_back_to_its_controller() {
    let p = compile("(a|b)+x");
    let w = p.wiring();
    let loop_node = find_node(&p, |k| matches!(k, NodeKind::Loop { .. }));
    let tail = find_node(&p, |k| matches!(k, NodeKind::GroupTail { .. }));

    assert_eq!(w.direct_next(tail), Some(loop_node));
    assert_eq!(w.direct_parent(tail), Some(loop_node));
}

#[test]
fn ancestors_reach_the_top() {
    let p = compile("((a+)b)+");
    let w = p.wiring();
    let inner = find_node(&p, |k| matches!(k, NodeKind::Curly { .. }));

    let ancestors = w.ancestors(inner);
    assert_eq!(ancestors[0], inner);
    let outer = *ancestors.last().expect("non-empty");
    assert!(matches!(p.graph().node(outer).kind, NodeKind::Loop { .. }));
    assert_eq!(w.direct_parent(outer), None);
}

#[test]
fn branch_alternatives_share_the_parent() {
    let p = compile("x(ab|cd)y");
    let w = p.wiring();
    let branch = find_node(&p, |k| matches!(k, NodeKind::Branch { .. }));
    let NodeKind::Branch { alts, .. } = &p.graph().node(branch).kind else {
        unreachable!();
    };
    for &alt in alts {
        assert_eq!(w.direct_parent(alt), Some(branch));
    }
    assert_eq!(w.sub_next(branch), Some(alts[0]));
}
