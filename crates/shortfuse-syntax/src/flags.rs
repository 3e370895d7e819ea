//! Match flags.
//!
//! A compact bitmask over the nine pattern flags. Flags arrive either through
//! [`crate::PatternBuilder`] or inline via `(?idmsux)` / `(?idmsux-idmsux:...)`
//! groups; inline modifiers override the constructor-supplied mask from their
//! position onward.

/// Bitmask of pattern flags.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u32);

impl Flags {
    /// No flags set.
    pub const EMPTY: Flags = Flags(0);

    /// `i` — case-insensitive matching (ASCII folding unless
    /// [`Flags::UNICODE_CASE`] is also set).
    pub const CASE_INSENSITIVE: Flags = Flags(1 << 0);

    /// `m` — `^` and `$` match at line boundaries.
    pub const MULTILINE: Flags = Flags(1 << 1);

    /// `s` — `.` also matches line terminators.
    pub const DOTALL: Flags = Flags(1 << 2);

    /// `d` — only `\n` is recognized as a line terminator.
    pub const UNIX_LINES: Flags = Flags(1 << 3);

    /// `x` — unescaped whitespace and `#` comments are ignored.
    pub const COMMENTS: Flags = Flags(1 << 4);

    /// The whole pattern is a literal string; metacharacters have no meaning.
    /// Not expressible inline.
    pub const LITERAL: Flags = Flags(1 << 5);

    /// `u` — case folding uses Unicode simple folding instead of ASCII.
    pub const UNICODE_CASE: Flags = Flags(1 << 6);

    /// `U` — predefined classes (`\d`, `\w`, `\s`, POSIX names) use their
    /// Unicode definitions.
    pub const UNICODE_CLASS: Flags = Flags(1 << 7);

    /// Canonical-equivalence matching. Accepted and stored, but canonical
    /// decomposition itself is outside this crate's scope; the flag is inert.
    pub const CANON_EQ: Flags = Flags(1 << 8);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Flags {
        Flags(bits & 0x1FF)
    }

    #[inline]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    #[inline]
    pub const fn difference(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }

    #[inline]
    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    /// Maps an inline modifier letter to its flag bit.
    ///
    /// `LITERAL` and `CANON_EQ` have no inline form.
    pub const fn from_letter(letter: char) -> Option<Flags> {
        match letter {
            'i' => Some(Flags::CASE_INSENSITIVE),
            'm' => Some(Flags::MULTILINE),
            's' => Some(Flags::DOTALL),
            'd' => Some(Flags::UNIX_LINES),
            'x' => Some(Flags::COMMENTS),
            'u' => Some(Flags::UNICODE_CASE),
            'U' => Some(Flags::UNICODE_CLASS),
            _ => None,
        }
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.union(rhs)
    }
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const NAMES: [(Flags, &str); 9] = [
            (Flags::CASE_INSENSITIVE, "CASE_INSENSITIVE"),
            (Flags::MULTILINE, "MULTILINE"),
            (Flags::DOTALL, "DOTALL"),
            (Flags::UNIX_LINES, "UNIX_LINES"),
            (Flags::COMMENTS, "COMMENTS"),
            (Flags::LITERAL, "LITERAL"),
            (Flags::UNICODE_CASE, "UNICODE_CASE"),
            (Flags::UNICODE_CLASS, "UNICODE_CLASS"),
            (Flags::CANON_EQ, "CANON_EQ"),
        ];
        let mut list = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                list.entry(&name);
            }
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_mapping() {
        assert_eq!(Flags::from_letter('i'), Some(Flags::CASE_INSENSITIVE));
        assert_eq!(Flags::from_letter('U'), Some(Flags::UNICODE_CLASS));
        assert_eq!(Flags::from_letter('q'), None);
    }

    #[test]
    fn insert_remove_roundtrip() {
        let mut flags = Flags::EMPTY;
        flags.insert(Flags::MULTILINE | Flags::DOTALL);
        assert!(flags.contains(Flags::MULTILINE));
        flags.remove(Flags::MULTILINE);
        assert!(!flags.contains(Flags::MULTILINE));
        assert!(flags.contains(Flags::DOTALL));
    }

    #[test]
    fn debug_lists_set_flags() {
        let flags = Flags::CASE_INSENSITIVE | Flags::COMMENTS;
        insta::assert_snapshot!(format!("{:?}", flags), @r#"{"CASE_INSENSITIVE", "COMMENTS"}"#);
    }
}
