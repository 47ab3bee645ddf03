mod common;

use common::assert_eq_lex;

const LITERAL_INPUT: &str = "|1-\n  one\n two\nplain\n";

const LITERAL_EXPECTED: &str = r#"
LineStart(0)
LiteralScalar(0) "|"
BlockIndentationIndicator(1) "1"
BlockChompingIndicator(2) "-"
LineStart(0) "  "
BlockScalarLine(2) "one"
LineStart(0) " "
BlockScalarLine(1) "two"
LineStart(0)
Scalar(0) "plain"
StreamEnd(0)"#;

#[test]
fn literal_block_scalar() {
    assert_eq_lex(LITERAL_INPUT, LITERAL_EXPECTED);
}

const FOLDED_INPUT: &str = ">\n  folded\n";

const FOLDED_EXPECTED: &str = r#"
LineStart(0)
FoldedScalar(0) ">"
LineStart(0) "  "
BlockScalarLine(2) "folded"
StreamEnd(0)"#;

#[test]
fn folded_block_scalar() {
    assert_eq_lex(FOLDED_INPUT, FOLDED_EXPECTED);
}

const KEEP_INDICATOR_INPUT: &str = "|+ # keep\n ok\n";

const KEEP_INDICATOR_EXPECTED: &str = r#"
LineStart(0)
LiteralScalar(0) "|"
BlockChompingIndicator(1) "+"
Comment(3) " keep"
LineStart(0) " "
BlockScalarLine(1) "ok"
StreamEnd(0)"#;

#[test]
fn chomping_and_header_comment() {
    assert_eq_lex(KEEP_INDICATOR_INPUT, KEEP_INDICATOR_EXPECTED);
}

const TIGHT_HEADER_COMMENT_INPUT: &str = "|+#keep\n ok\n";

const TIGHT_HEADER_COMMENT_EXPECTED: &str = r#"
LineStart(0)
LiteralScalar(0) "|"
BlockChompingIndicator(1) "+"
Error(2) "Missing space before comment start"
Comment(2) "keep"
LineStart(0) " "
BlockScalarLine(1) "ok"
StreamEnd(0)"#;

#[test]
fn header_comment_requires_leading_space() {
    assert_eq_lex(TIGHT_HEADER_COMMENT_INPUT, TIGHT_HEADER_COMMENT_EXPECTED);
}

const BLANK_LINE_BODY_INPUT: &str = "|\n a\n\n b\n";

const BLANK_LINE_BODY_EXPECTED: &str = r#"
LineStart(0)
LiteralScalar(0) "|"
LineStart(0) " "
BlockScalarLine(1) "a"
LineStart(0)
LineStart(0) " "
BlockScalarLine(1) "b"
StreamEnd(0)"#;

#[test]
fn blank_line_does_not_end_block_scalar() {
    assert_eq_lex(BLANK_LINE_BODY_INPUT, BLANK_LINE_BODY_EXPECTED);
}

const NESTED_BLOCK_INPUT: &str = "text: |\n  line\nnext: 2\n";

const NESTED_BLOCK_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "text"
ControlChar(4) ":"
LiteralScalar(6) "|"
LineStart(0) "  "
BlockScalarLine(2) "line"
LineStart(0)
Scalar(0) "next"
ControlChar(4) ":"
Scalar(6) "2"
StreamEnd(0)"#;

#[test]
fn block_scalar_ends_at_dedent() {
    assert_eq_lex(NESTED_BLOCK_INPUT, NESTED_BLOCK_EXPECTED);
}

const SECONDARY_TAG_INPUT: &str = "!!str a\n";

const SECONDARY_TAG_EXPECTED: &str = r#"
LineStart(0)
TagHandle(0) "!!"
TagSuffix(2) "str"
Scalar(6) "a"
StreamEnd(0)"#;

#[test]
fn secondary_tag_handle() {
    assert_eq_lex(SECONDARY_TAG_INPUT, SECONDARY_TAG_EXPECTED);
}

const LOCAL_TAG_INPUT: &str = "!thing x\n";

const LOCAL_TAG_EXPECTED: &str = r#"
LineStart(0)
TagHandle(0) "!"
TagSuffix(1) "thing"
Scalar(7) "x"
StreamEnd(0)"#;

#[test]
fn local_tag_is_handle_plus_suffix() {
    assert_eq_lex(LOCAL_TAG_INPUT, LOCAL_TAG_EXPECTED);
}

const NAMED_HANDLE_INPUT: &str = "!e!kind x\n";

const NAMED_HANDLE_EXPECTED: &str = r#"
LineStart(0)
TagHandle(0) "!e!"
TagSuffix(3) "kind"
Scalar(8) "x"
StreamEnd(0)"#;

#[test]
fn named_tag_handle() {
    assert_eq_lex(NAMED_HANDLE_INPUT, NAMED_HANDLE_EXPECTED);
}

const VERBATIM_TAG_INPUT: &str = "!<tag:a> x\n";

const VERBATIM_TAG_EXPECTED: &str = r#"
LineStart(0)
VerbatimTag(0) "tag:a"
Scalar(9) "x"
StreamEnd(0)"#;

#[test]
fn verbatim_tag() {
    assert_eq_lex(VERBATIM_TAG_INPUT, VERBATIM_TAG_EXPECTED);
}

const UNTERMINATED_VERBATIM_INPUT: &str = "!<tag:a\n";

const UNTERMINATED_VERBATIM_EXPECTED: &str = r#"
LineStart(0)
Error(7) "Unterminated verbatim tag"
StreamEnd(0)"#;

#[test]
fn unterminated_verbatim_tag() {
    assert_eq_lex(UNTERMINATED_VERBATIM_INPUT, UNTERMINATED_VERBATIM_EXPECTED);
}

const ANCHOR_ALIAS_INPUT: &str = "&a x\n*a\n";

const ANCHOR_ALIAS_EXPECTED: &str = r#"
LineStart(0)
Anchor(0) "a"
Scalar(3) "x"
LineStart(0)
Alias(0) "a"
StreamEnd(0)"#;

#[test]
fn anchors_and_aliases() {
    assert_eq_lex(ANCHOR_ALIAS_INPUT, ANCHOR_ALIAS_EXPECTED);
}

const EMPTY_ANCHOR_INPUT: &str = "& x\n";

const EMPTY_ANCHOR_EXPECTED: &str = r#"
LineStart(0)
Error(0) "Missing anchor name"
Scalar(2) "x"
StreamEnd(0)"#;

#[test]
fn empty_anchor_name_errors() {
    assert_eq_lex(EMPTY_ANCHOR_INPUT, EMPTY_ANCHOR_EXPECTED);
}

const BARE_TAG_INPUT: &str = "! x\n";

const BARE_TAG_EXPECTED: &str = r#"
LineStart(0)
TagHandle(0) "!"
TagSuffix(1)
Scalar(2) "x"
StreamEnd(0)"#;

#[test]
fn bare_non_specific_tag() {
    assert_eq_lex(BARE_TAG_INPUT, BARE_TAG_EXPECTED);
}
