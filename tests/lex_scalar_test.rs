mod common;

use common::assert_eq_lex;

const MAP_LINE_INPUT: &str = "a: b\n";

const MAP_LINE_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "a"
ControlChar(1) ":"
Scalar(3) "b"
StreamEnd(0)"#;

#[test]
fn plain_key_value() {
    assert_eq_lex(MAP_LINE_INPUT, MAP_LINE_EXPECTED);
}

const NESTED_MAP_INPUT: &str = "key: value\n  nested: 1\n";

const NESTED_MAP_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "key"
ControlChar(3) ":"
Scalar(5) "value"
LineStart(0) "  "
Scalar(2) "nested"
ControlChar(8) ":"
Scalar(10) "1"
StreamEnd(0)"#;

#[test]
fn indentation_is_tracked() {
    assert_eq_lex(NESTED_MAP_INPUT, NESTED_MAP_EXPECTED);
}

const COLON_GLUED_INPUT: &str = "a:b\n";

const COLON_GLUED_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "a:b"
StreamEnd(0)"#;

#[test]
fn colon_followed_by_content_stays_in_scalar() {
    assert_eq_lex(COLON_GLUED_INPUT, COLON_GLUED_EXPECTED);
}

const TRAILING_SPACE_INPUT: &str = "word  \n";

const TRAILING_SPACE_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "word"
StreamEnd(0)"#;

#[test]
fn trailing_whitespace_is_dropped() {
    assert_eq_lex(TRAILING_SPACE_INPUT, TRAILING_SPACE_EXPECTED);
}

const INNER_SPACE_INPUT: &str = "two words\n";

const INNER_SPACE_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "two words"
StreamEnd(0)"#;

#[test]
fn inner_whitespace_is_kept() {
    assert_eq_lex(INNER_SPACE_INPUT, INNER_SPACE_EXPECTED);
}

const FLOW_SEQ_INPUT: &str = "[a, b]\n";

const FLOW_SEQ_EXPECTED: &str = r#"
LineStart(0)
ControlChar(0) "["
Scalar(1) "a"
ControlChar(2) ","
Scalar(4) "b"
ControlChar(5) "]"
StreamEnd(0)"#;

#[test]
fn flow_sequence() {
    assert_eq_lex(FLOW_SEQ_INPUT, FLOW_SEQ_EXPECTED);
}

const FLOW_MAP_INPUT: &str = "{x: 1}\n";

const FLOW_MAP_EXPECTED: &str = r#"
LineStart(0)
ControlChar(0) "{"
Scalar(1) "x"
ControlChar(2) ":"
Scalar(4) "1"
ControlChar(5) "}"
StreamEnd(0)"#;

#[test]
fn flow_mapping() {
    assert_eq_lex(FLOW_MAP_INPUT, FLOW_MAP_EXPECTED);
}

const BRACKET_IN_BLOCK_INPUT: &str = "]\n";

const BRACKET_IN_BLOCK_EXPECTED: &str = r#"
LineStart(0)
Error(0) "Unexpected closing bracket in block context"
StreamEnd(0)"#;

#[test]
fn closing_bracket_outside_flow_errors() {
    assert_eq_lex(BRACKET_IN_BLOCK_INPUT, BRACKET_IN_BLOCK_EXPECTED);
}

const SINGLE_QUOTED_INPUT: &str = "'it''s'\n";

const SINGLE_QUOTED_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "it's"
StreamEnd(0)"#;

#[test]
fn single_quoted_doubling() {
    assert_eq_lex(SINGLE_QUOTED_INPUT, SINGLE_QUOTED_EXPECTED);
}

const UNTERMINATED_SINGLE_INPUT: &str = "'abc";

const UNTERMINATED_SINGLE_EXPECTED: &str = r#"
LineStart(0)
Error(4) "Unterminated single quoted string"
StreamEnd(4)"#;

#[test]
fn unterminated_single_quote() {
    assert_eq_lex(UNTERMINATED_SINGLE_INPUT, UNTERMINATED_SINGLE_EXPECTED);
}

const ESCAPES_INPUT: &str = "\"a\\tb\\\\c\"\n";

const ESCAPES_EXPECTED: &str = "
LineStart(0)
Scalar(0) \"a\\tb\\\\c\"
StreamEnd(0)";

#[test]
fn double_quoted_escapes() {
    assert_eq_lex(ESCAPES_INPUT, ESCAPES_EXPECTED);
}

const HEX_ESCAPE_INPUT: &str = "\"\\u00e9\"";

const HEX_ESCAPE_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "é"
StreamEnd(8)"#;

#[test]
fn unicode_escape_to_utf8() {
    assert_eq_lex(HEX_ESCAPE_INPUT, HEX_ESCAPE_EXPECTED);
    // the content bytes are the UTF-8 encoding C3 A9
    let scalar = forge_yaml::tokenizer::LexIter::from_str(HEX_ESCAPE_INPUT)
        .find(|e| e.kind == forge_yaml::LexEventKind::Scalar)
        .unwrap();
    assert_eq!(scalar.content, vec![0xC3, 0xA9]);
}

const BAD_ESCAPE_INPUT: &str = "\"\\q\"\n";

const BAD_ESCAPE_EXPECTED: &str = r#"
LineStart(0)
Error(2) "Invalid escape sequence"
Scalar(0) ""
StreamEnd(0)"#;

#[test]
fn invalid_escape_errors_and_resumes() {
    assert_eq_lex(BAD_ESCAPE_INPUT, BAD_ESCAPE_EXPECTED);
}

const BAD_HEX_INPUT: &str = "\"\\u00zz\"\n";

const BAD_HEX_EXPECTED: &str = r#"
LineStart(0)
Error(5) "Invalid character in unicode escape sequence"
Scalar(0) "zz"
StreamEnd(0)"#;

#[test]
fn invalid_hex_digit_errors_and_resumes() {
    assert_eq_lex(BAD_HEX_INPUT, BAD_HEX_EXPECTED);
}

const UNTERMINATED_DOUBLE_INPUT: &str = "\"abc";

const UNTERMINATED_DOUBLE_EXPECTED: &str = r#"
LineStart(0)
Error(4) "Unterminated double quoted string"
StreamEnd(4)"#;

#[test]
fn unterminated_double_quote() {
    assert_eq_lex(UNTERMINATED_DOUBLE_INPUT, UNTERMINATED_DOUBLE_EXPECTED);
}

const QUOTED_NEWLINE_INPUT: &str = "\"a\nb\"\n";

const QUOTED_NEWLINE_EXPECTED: &str = "
LineStart(0)
Scalar(0) \"a\\nb\"
StreamEnd(0)";

#[test]
fn newline_inside_double_quoted_becomes_lf() {
    assert_eq_lex(QUOTED_NEWLINE_INPUT, QUOTED_NEWLINE_EXPECTED);
}

const RESERVED_CHAR_INPUT: &str = "@x\n";

const RESERVED_CHAR_EXPECTED: &str = r#"
LineStart(0)
Error(0) "Reserved character cannot start a plain scalar"
Scalar(0) "@x"
StreamEnd(0)"#;

#[test]
fn reserved_indicator_errors() {
    assert_eq_lex(RESERVED_CHAR_INPUT, RESERVED_CHAR_EXPECTED);
}
