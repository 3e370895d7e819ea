//! Property name resolution for `\p{...}` and POSIX classes.
//!
//! The parser resolves property names through a [`PropertyOracle`], a
//! collaborator interface: the built-in oracle covers general categories,
//! a table of common blocks and scripts, and the POSIX/ctype names; callers
//! with richer Unicode tables plug in their own.

use std::sync::Arc;

use crate::charset::{ClassPredicate, PredicateSet};

/// Resolves a property name to a categorical predicate.
pub trait PropertyOracle: Send + Sync {
    /// `name` is the text inside `\p{...}` (or a single-letter `\pL` form),
    /// without negation; negation is applied by the caller.
    fn resolve(&self, name: &str) -> Option<PredicateSet>;
}

/// Built-in oracle backed by `char` classification and fixed range tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProperties;

fn pred(f: fn(char) -> bool) -> Arc<dyn ClassPredicate> {
    Arc::new(move |cp: u32| char::from_u32(cp).is_some_and(f))
}

fn range_pred(lo: u32, hi: u32) -> Arc<dyn ClassPredicate> {
    Arc::new(move |cp: u32| cp >= lo && cp <= hi)
}

impl PropertyOracle for BuiltinProperties {
    fn resolve(&self, name: &str) -> Option<PredicateSet> {
        if let Some(block) = name.strip_prefix("In") {
            return resolve_block(block).map(|p| PredicateSet::new(name, p));
        }
        if let Some(script) = name.strip_prefix("Is") {
            if let Some(p) = resolve_script(script) {
                return Some(PredicateSet::new(name, p));
            }
            // `Is` is also an accepted prefix for categories: \p{IsLu}.
            return resolve_category_or_ctype(script)
                .map(|(p, hint)| PredicateSet::new(name, p).with_default_hint(hint));
        }
        resolve_category_or_ctype(name)
            .map(|(p, hint)| PredicateSet::new(name, p).with_default_hint(hint))
    }
}

fn resolve_category_or_ctype(name: &str) -> Option<(Arc<dyn ClassPredicate>, u32)> {
    let (p, hint): (Arc<dyn ClassPredicate>, char) = match name {
        // General categories. The single-letter groups use `char`
        // classification; two-letter refinements cover the common cases.
        "L" => (pred(char::is_alphabetic), 'a'),
        "Lu" => (pred(char::is_uppercase), 'A'),
        "Ll" => (pred(char::is_lowercase), 'a'),
        "N" | "Nd" => (pred(char::is_numeric), '0'),
        "P" => (pred(|c| c.is_ascii_punctuation()), '!'),
        "S" => (pred(|c| matches!(c, '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~')), '$'),
        "Z" | "Zs" => (pred(|c| c == ' ' || c == '\u{A0}'), ' '),
        "C" | "Cc" => (pred(char::is_control), '\u{7}'),
        "M" => (pred(|c| matches!(c, '\u{300}'..='\u{36F}')), '\u{300}'),

        // POSIX / ctype names.
        "Alpha" => (pred(char::is_alphabetic), 'a'),
        "Digit" => (pred(|c| c.is_ascii_digit()), '0'),
        "Alnum" => (pred(|c| c.is_ascii_alphanumeric()), 'a'),
        "Punct" => (pred(|c| c.is_ascii_punctuation()), '!'),
        "Graph" => (pred(|c| c.is_ascii_graphic()), '!'),
        "Print" => (pred(|c| c.is_ascii_graphic() || c == ' '), ' '),
        "Blank" => (pred(|c| c == ' ' || c == '\t'), ' '),
        "Cntrl" => (pred(|c| c.is_ascii_control()), '\u{7}'),
        "XDigit" => (pred(|c| c.is_ascii_hexdigit()), '0'),
        "Space" => (pred(char::is_whitespace), ' '),
        "Lower" => (pred(|c| c.is_ascii_lowercase()), 'a'),
        "Upper" => (pred(|c| c.is_ascii_uppercase()), 'A'),
        "ASCII" => (pred(|c| c.is_ascii()), 'a'),
        _ => return None,
    };
    Some((p, hint as u32))
}

fn resolve_block(name: &str) -> Option<Arc<dyn ClassPredicate>> {
    let (lo, hi) = match name {
        "BasicLatin" => (0x0000, 0x007F),
        "Latin-1Supplement" => (0x0080, 0x00FF),
        "LatinExtended-A" => (0x0100, 0x017F),
        "Greek" | "GreekandCoptic" => (0x0370, 0x03FF),
        "Cyrillic" => (0x0400, 0x04FF),
        "Hebrew" => (0x0590, 0x05FF),
        "Arabic" => (0x0600, 0x06FF),
        "Hiragana" => (0x3040, 0x309F),
        "Katakana" => (0x30A0, 0x30FF),
        _ => return None,
    };
    Some(range_pred(lo, hi))
}

fn resolve_script(name: &str) -> Option<Arc<dyn ClassPredicate>> {
    match name {
        "Latin" => Some(Arc::new(|cp: u32| {
            matches!(cp, 0x41..=0x5A | 0x61..=0x7A | 0xC0..=0x24F)
        })),
        "Greek" => Some(range_pred(0x370, 0x3FF)),
        "Cyrillic" => Some(range_pred(0x400, 0x4FF)),
        "Han" => Some(range_pred(0x4E00, 0x9FFF)),
        "Common" => Some(Arc::new(|cp: u32| {
            matches!(cp, 0x00..=0x40 | 0x5B..=0x60 | 0x7B..=0xA9)
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Universe;

    #[test]
    fn resolves_categories() {
        let oracle = BuiltinProperties;
        let lu = oracle.resolve("Lu").expect("Lu resolves");
        assert!(lu.contains('A' as u32));
        assert!(!lu.contains('a' as u32));

        let materialized = lu.char_set(&Universe);
        assert!(materialized.contains('Z' as u32));
        assert!(!materialized.contains('0' as u32));
        assert_eq!(materialized.default_hint(), Some('A' as u32));
    }

    #[test]
    fn resolves_posix_names() {
        let oracle = BuiltinProperties;
        assert!(oracle.resolve("Alnum").unwrap().contains('7' as u32));
        assert!(oracle.resolve("Punct").unwrap().contains('!' as u32));
        assert!(oracle.resolve("XDigit").unwrap().contains('f' as u32));
        assert!(!oracle.resolve("XDigit").unwrap().contains('g' as u32));
    }

    #[test]
    fn resolves_blocks_and_scripts() {
        let oracle = BuiltinProperties;
        assert!(oracle.resolve("InGreek").unwrap().contains(0x3B1)); // α
        assert!(oracle.resolve("IsCyrillic").unwrap().contains(0x430)); // а
        assert!(oracle.resolve("IsLu").unwrap().contains('B' as u32));
        assert!(oracle.resolve("NoSuchThing").is_none());
    }
}
