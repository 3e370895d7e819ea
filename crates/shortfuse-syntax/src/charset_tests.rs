//! Tests for the character-set algebra.

use super::charset::*;

#[test]
fn add_merges_adjacent_ranges() {
    let mut set = CharSet::new();
    set.add_range('a' as u32, 'c' as u32);
    set.add_range('e' as u32, 'g' as u32);
    set.add('d' as u32);

    assert!(set.contains('b' as u32));
    assert!(set.contains('d' as u32));
    assert!(set.contains('g' as u32));
    assert!(!set.contains('h' as u32));
    insta::assert_snapshot!(format!("{:?}", set), @"CharSet(0x61-0x67)");
}

#[test]
fn add_out_of_order() {
    let mut set = CharSet::new();
    set.add('z' as u32);
    set.add('a' as u32);
    set.add('m' as u32);

    insta::assert_snapshot!(format!("{:?}", set), @"CharSet(0x61 0x6d 0x7a)");
}

#[test]
fn checked_range_rejects_reversed() {
    let err = CharSet::checked_range('z' as u32, 'a' as u32).unwrap_err();
    assert_eq!(err, InvalidRange { lo: 0x7A, hi: 0x61 });
    assert!(CharSet::checked_range('a' as u32, 'a' as u32).is_ok());
}

#[test]
fn union_is_pure() {
    let a = CharSet::range('a' as u32, 'f' as u32);
    let b = CharSet::range('d' as u32, 'k' as u32);

    let u = a.union(&b);

    assert!(u.contains('a' as u32) && u.contains('k' as u32));
    // operands untouched
    assert!(!a.contains('k' as u32));
    assert!(!b.contains('a' as u32));
}

#[test]
fn intersect_overlap() {
    let a = CharSet::range('a' as u32, 'f' as u32);
    let b = CharSet::range('d' as u32, 'k' as u32);

    let i = a.intersect(&b);

    insta::assert_snapshot!(format!("{:?}", i), @"CharSet(0x64-0x66)");
}

#[test]
fn empty_intersection_is_unsatisfiable_sentinel() {
    let a = CharSet::range('a' as u32, 'c' as u32).with_default_hint('a' as u32);
    let b = CharSet::range('x' as u32, 'z' as u32);

    let i = a.intersect(&b);

    assert!(i.is_unsatisfiable());
    assert!(!i.contains('a' as u32));
    assert!(!i.contains('y' as u32));
    assert_eq!(i.default_hint(), Some('a' as u32));
}

#[test]
fn complement_is_lazy_and_pure() {
    let set = CharSet::range('a' as u32, 'z' as u32);
    let comp = set.complement();

    assert!(!comp.contains('m' as u32));
    assert!(comp.contains('A' as u32));
    assert!(set.contains('m' as u32));

    let back = comp.complement();
    assert!(back.contains('m' as u32));
}

#[test]
fn difference_subtracts() {
    let a = CharSet::range('a' as u32, 'z' as u32);
    let b = CharSet::range('m' as u32, 'p' as u32);

    let d = a.difference(&b);

    assert!(d.contains('a' as u32));
    assert!(!d.contains('n' as u32));
    assert!(d.contains('q' as u32));
}

#[test]
fn complemented_operand_in_binary_op() {
    let not_vowels = {
        let mut v = CharSet::new();
        for cp in ['a', 'e', 'i', 'o', 'u'] {
            v.add(cp as u32);
        }
        v.complement()
    };
    let letters = CharSet::range('a' as u32, 'z' as u32);

    let consonants = letters.intersect(&not_vowels);

    assert!(consonants.contains('b' as u32));
    assert!(!consonants.contains('e' as u32));
    assert!(!consonants.contains('0' as u32));
}

#[test]
fn universe_is_fixed_and_ordered() {
    let universe = Universe;
    let members: Vec<u32> = universe.iter().collect();

    assert!(members.windows(2).all(|w| w[0] < w[1]));
    assert!(members.contains(&0x21)); // '!'
    assert!(members.contains(&('a' as u32)));
    assert!(!members.contains(&0x7F));
    assert!(!members.contains(&0x100));
    insta::assert_snapshot!(members.len().to_string(), @"103");
}

#[test]
fn witness_prefers_printables() {
    let universe = Universe;
    let avoid = CharSet::single('a' as u32);

    assert_eq!(universe.witness_outside(&avoid), Some(0x21));

    let all_printables = CharSet::range(0x21, 0x7E);
    assert_eq!(universe.witness_outside(&all_printables), Some(0x00));
}

#[test]
fn representative_falls_back_to_hint() {
    let sentinel = CharSet::unsatisfiable(Some('A' as u32));
    assert_eq!(sentinel.representative(&Universe), Some('A' as u32));

    let plain = CharSet::single('q' as u32);
    assert_eq!(plain.representative(&Universe), Some('q' as u32));
}

#[test]
fn predicate_set_materializes_once() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);
    impl ClassPredicate for Counting {
        fn contains(&self, cp: u32) -> bool {
            self.0.fetch_add(1, Ordering::Relaxed);
            char::from_u32(cp).is_some_and(|c| c.is_ascii_uppercase())
        }
    }

    let pred = Arc::new(Counting(AtomicUsize::new(0)));
    let set = PredicateSet::new("Lu", Arc::clone(&pred) as Arc<dyn ClassPredicate>);

    assert!(set.contains('A' as u32));
    let calls_before = pred.0.load(Ordering::Relaxed);

    let first = set.char_set(&Universe).clone();
    let calls_after_first = pred.0.load(Ordering::Relaxed);
    let second = set.char_set(&Universe).clone();

    assert_eq!(first, second);
    assert!(calls_after_first > calls_before);
    assert_eq!(pred.0.load(Ordering::Relaxed), calls_after_first);
}

#[test]
fn negated_predicate_set() {
    use std::sync::Arc;

    let upper = PredicateSet::new(
        "Lu",
        Arc::new(|cp: u32| char::from_u32(cp).is_some_and(|c| c.is_ascii_uppercase()))
            as Arc<dyn ClassPredicate>,
    );
    let not_upper = upper.negate();

    assert!(upper.contains('Q' as u32));
    assert!(!not_upper.contains('Q' as u32));
    assert!(not_upper.contains('q' as u32));
    assert!(not_upper.char_set(&Universe).contains('!' as u32));
}

#[test]
fn ascii_fold_additions() {
    assert_eq!(fold_additions('a' as u32, false), vec!['A' as u32]);
    assert_eq!(fold_additions('Z' as u32, false), vec!['z' as u32]);
    assert_eq!(fold_additions('1' as u32, false), Vec::<u32>::new());
}

#[test]
fn unicode_fold_additions() {
    // No folding for non-ASCII unless unicode mode is on.
    assert_eq!(fold_additions('é' as u32, false), Vec::<u32>::new());
    assert_eq!(fold_additions('é' as u32, true), vec!['É' as u32]);
    assert_eq!(simple_fold('É' as u32), 'é' as u32);
    assert_eq!(simple_fold('é' as u32), 'é' as u32);
}
