//! Tests for the node arena and class-set composition.

use rowan::TextRange;

use super::node::*;
use crate::charset::{CharSet, Universe};

fn span(lo: u32, hi: u32) -> TextRange {
    TextRange::new(lo.into(), hi.into())
}

#[test]
fn arena_seeds_terminals() {
    let graph = Graph::new();
    assert_eq!(graph.len(), 2);
    assert!(matches!(graph.node(ACCEPT).kind, NodeKind::Accept));
    assert!(matches!(graph.node(LAST_ACCEPT).kind, NodeKind::LastAccept));
}

#[test]
fn add_and_link() {
    let mut graph = Graph::new();
    let a = graph.add(NodeKind::Char { cp: 'a' as u32 }, span(0, 1));
    let b = graph.add(NodeKind::Char { cp: 'b' as u32 }, span(1, 2));
    graph.set_next(a, b);
    graph.set_next(b, LAST_ACCEPT);

    insta::assert_snapshot!(graph.dump(), @r"
    N2: Char('a') → N3
    N3: Char('b') → $✓
    ");
}

#[test]
fn node_label_slices_the_pattern() {
    let mut graph = Graph::new();
    let id = graph.add(NodeKind::Dot { dotall: false, unix_lines: false }, span(2, 3));
    assert_eq!(graph.node(id).label("ab.cd"), ".");
}

#[test]
fn class_set_union_and_complement() {
    let vowels = ClassSet::Literal({
        let mut s = CharSet::new();
        for c in ['a', 'e', 'i', 'o', 'u'] {
            s.add(c as u32);
        }
        s
    });
    let digits = ClassSet::Literal(CharSet::range('0' as u32, '9' as u32));
    let union = ClassSet::Union(vec![vowels, digits]);

    assert!(union.contains('a' as u32));
    assert!(union.contains('7' as u32));
    assert!(!union.contains('b' as u32));

    let negated = ClassSet::Complement(Box::new(union));
    assert!(negated.contains('b' as u32));
    assert!(!negated.contains('7' as u32));

    let materialized = negated.char_set(&Universe);
    assert!(materialized.contains('z' as u32));
    assert!(!materialized.contains('e' as u32));
}

#[test]
fn class_set_intersection() {
    let letters = ClassSet::Literal(CharSet::range('a' as u32, 'z' as u32));
    let hex = ClassSet::Literal(CharSet::range('a' as u32, 'f' as u32));
    let both = ClassSet::Intersection(Box::new(letters), Box::new(hex));

    assert!(both.contains('c' as u32));
    assert!(!both.contains('g' as u32));
}

#[test]
fn first_chars_of_consuming_kinds() {
    let universe = Universe;

    let dot = NodeKind::Dot { dotall: false, unix_lines: false };
    let set = dot.first_chars(&universe);
    assert!(set.contains('a' as u32));
    assert!(!set.contains('\n' as u32));

    let all = NodeKind::Dot { dotall: true, unix_lines: false };
    assert!(all.first_chars(&universe).contains('\n' as u32));

    let slice = NodeKind::Slice { chars: vec!['f' as u32, 'o' as u32] };
    let set = slice.first_chars(&universe);
    assert!(set.contains('f' as u32));
    assert!(!set.contains('o' as u32));

    let fold = NodeKind::CharFold { lo: 'a' as u32, up: 'A' as u32 };
    let set = fold.first_chars(&universe);
    assert!(set.contains('a' as u32) && set.contains('A' as u32));

    assert!(NodeKind::Empty.first_chars(&universe).is_empty());
}
