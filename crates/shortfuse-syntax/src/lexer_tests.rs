//! Tests for pattern tokenization.

use super::lexer::*;

fn kinds(source: &str) -> String {
    lex(source)
        .iter()
        .map(|t| format!("{:?}({})", t.kind, token_text(source, t)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn plain_metas_and_literals() {
    insta::assert_snapshot!(
        kinds("a(b|c)*"),
        @"Literal(a) ParenOpen(() Literal(b) Pipe(|) Literal(c) ParenClose()) Star(*)"
    );
}

#[test]
fn escape_families() {
    insta::assert_snapshot!(
        kinds(r"\d\B\n\x41A\cA\07"),
        @r"ClassEscape(\d) AnchorEscape(\B) ControlCharEscape(\n) HexEscape(\x41) Literal(A) CtrlEscape(\cA) OctalEscape(\07)"
    );
}

#[test]
fn hex_brace_and_properties() {
    insta::assert_snapshot!(
        kinds(r"\x{1F600}\p{Lu}\PL"),
        @r"HexBraceEscape(\x{1F600}) PropertyEscape(\p{Lu}) PropertyShortEscape(\PL)"
    );
}

#[test]
fn backrefs() {
    insta::assert_snapshot!(
        kinds(r"\12\k<name>"),
        @r"BackRefEscape(\12) NamedBackRefEscape(\k<name>)"
    );
}

#[test]
fn octal_limits_to_byte_range() {
    // \0477 > 0o377, so the lexer takes two digits and leaves the third.
    insta::assert_snapshot!(
        kinds(r"\0477"),
        @r"OctalEscape(\047) Literal(7)"
    );
    insta::assert_snapshot!(
        kinds(r"\0377"),
        @r"OctalEscape(\0377)"
    );
}

#[test]
fn quote_section_is_expanded() {
    insta::assert_snapshot!(
        kinds(r"a\Q(+\d\Eb"),
        @r"Literal(a) Literal(() Literal(+) Literal(\) Literal(d) Literal(b)"
    );
}

#[test]
fn unterminated_quote_runs_to_end() {
    insta::assert_snapshot!(
        kinds(r"\Qa*"),
        @"Literal(a) Literal(*)"
    );
}

#[test]
fn escaped_punctuation_is_escaped_literal() {
    insta::assert_snapshot!(
        kinds(r"\.\\"),
        @r"EscapedLiteral(\.) EscapedLiteral(\\)"
    );
}

#[test]
fn trailing_backslash_is_garbage() {
    insta::assert_snapshot!(
        kinds("a\\"),
        @r"Literal(a) Garbage(\)"
    );
}

#[test]
fn class_intersection_operator() {
    insta::assert_snapshot!(
        kinds("[a&&b]&"),
        @"BracketOpen([) Literal(a) AmpAmp(&&) Literal(b) BracketClose(]) Literal(&)"
    );
}

#[test]
fn whitespace_is_tokenized_separately() {
    insta::assert_snapshot!(
        kinds("a b\t#c"),
        @"Literal(a) Whitespace( ) Literal(b) Whitespace(\t) Hash(#) Literal(c)"
    );
}

#[test]
fn spans_cover_the_source() {
    let source = r"ab\d[x-z]";
    let tokens = lex(source);
    let mut expected_start = 0u32;
    for token in &tokens {
        assert_eq!(u32::from(token.span.start()), expected_start);
        expected_start = token.span.end().into();
    }
    assert_eq!(expected_start as usize, source.len());
}
