mod common;

use common::{assert_eq_lex, assert_eq_lex_bytes};

const MARKERS_INPUT: &str = "---\n...\n";

const MARKERS_EXPECTED: &str = r#"
DirectivesEnd(0)
LineStart(0)
DocumentEnd(0)
StreamEnd(0)"#;

#[test]
fn document_markers() {
    assert_eq_lex(MARKERS_INPUT, MARKERS_EXPECTED);
}

const SEQ_DASH_INPUT: &str = "- a\n- b\n";

const SEQ_DASH_EXPECTED: &str = r#"
LineStart(0)
ControlChar(0) "-"
Scalar(2) "a"
LineStart(0)
ControlChar(0) "-"
Scalar(2) "b"
StreamEnd(0)"#;

#[test]
fn dash_is_a_control_char() {
    assert_eq_lex(SEQ_DASH_INPUT, SEQ_DASH_EXPECTED);
}

const TWO_DASHES_INPUT: &str = "--\n";

const TWO_DASHES_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "--"
StreamEnd(0)"#;

const DASHES_GLUED_INPUT: &str = "---x\n";

const DASHES_GLUED_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "---x"
StreamEnd(0)"#;

#[test]
fn dash_runs_that_are_not_markers_are_scalars() {
    assert_eq_lex(TWO_DASHES_INPUT, TWO_DASHES_EXPECTED);
    assert_eq_lex(DASHES_GLUED_INPUT, DASHES_GLUED_EXPECTED);
}

const DOTS_SCALAR_INPUT: &str = "..\n";

const DOTS_SCALAR_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) ".."
StreamEnd(0)"#;

#[test]
fn short_dot_runs_are_scalars() {
    assert_eq_lex(DOTS_SCALAR_INPUT, DOTS_SCALAR_EXPECTED);
}

const YAML_DIRECTIVE_INPUT: &str = "%YAML 1.2\n---\n";

const YAML_DIRECTIVE_EXPECTED: &str = r#"
YamlDirective(0) "%YAML"
MajorVersion(6) "1"
MinorVersion(8) "2"
DirectivesEnd(0)
StreamEnd(0)"#;

#[test]
fn yaml_directive() {
    assert_eq_lex(YAML_DIRECTIVE_INPUT, YAML_DIRECTIVE_EXPECTED);
}

const BAD_VERSION_INPUT: &str = "%YAML x\n";

const BAD_VERSION_EXPECTED: &str = r#"
YamlDirective(0) "%YAML"
Error(6) "Invalid YAML version number"
Scalar(6) "x"
StreamEnd(0)"#;

#[test]
fn invalid_version_number() {
    assert_eq_lex(BAD_VERSION_INPUT, BAD_VERSION_EXPECTED);
}

const TAG_DIRECTIVE_INPUT: &str = "%TAG !e! tag:example.com,2000:\n";

const TAG_DIRECTIVE_EXPECTED: &str = r#"
TagDirective(0) "%TAG"
TagHandle(5) "!e!"
TagUri(9) "tag:example.com,2000:"
StreamEnd(0)"#;

#[test]
fn tag_directive() {
    assert_eq_lex(TAG_DIRECTIVE_INPUT, TAG_DIRECTIVE_EXPECTED);
}

const UNKNOWN_DIRECTIVE_INPUT: &str = "%FOO bar baz\n";

const UNKNOWN_DIRECTIVE_EXPECTED: &str = r#"
UnknownDirective(0) "%FOO"
UnknownDirectiveParam(5) "bar"
UnknownDirectiveParam(9) "baz"
StreamEnd(0)"#;

#[test]
fn unknown_directive_streams_params() {
    assert_eq_lex(UNKNOWN_DIRECTIVE_INPUT, UNKNOWN_DIRECTIVE_EXPECTED);
}

const COMMENTS_INPUT: &str = "a # note\n# full\n";

const COMMENTS_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "a"
Comment(2) " note"
Comment(0) " full"
StreamEnd(0)"#;

#[test]
fn comments() {
    assert_eq_lex(COMMENTS_INPUT, COMMENTS_EXPECTED);
}

const TIGHT_COMMENT_INPUT: &str = "\"q\"#c\n";

const TIGHT_COMMENT_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "q"
Error(3) "Missing space before comment start"
Comment(3) "c"
StreamEnd(0)"#;

#[test]
fn comment_requires_leading_space() {
    assert_eq_lex(TIGHT_COMMENT_INPUT, TIGHT_COMMENT_EXPECTED);
}

const BLANK_LINES_INPUT: &str = "a\n\nb\n";

const BLANK_LINES_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "a"
LineStart(0)
LineStart(0)
Scalar(0) "b"
StreamEnd(0)"#;

#[test]
fn blank_lines_emit_line_starts() {
    assert_eq_lex(BLANK_LINES_INPUT, BLANK_LINES_EXPECTED);
}

const EMPTY_INPUT: &str = "";

const EMPTY_EXPECTED: &str = r#"
StreamEnd(0)"#;

#[test]
fn empty_stream() {
    assert_eq_lex(EMPTY_INPUT, EMPTY_EXPECTED);
}

const CRLF_INPUT: &str = "a\r\nb\rc\n";

const CRLF_EXPECTED: &str = r#"
LineStart(0)
Scalar(0) "a"
LineStart(0)
Scalar(0) "b"
LineStart(0)
Scalar(0) "c"
StreamEnd(0)"#;

#[test]
fn carriage_returns_are_line_breaks() {
    assert_eq_lex(CRLF_INPUT, CRLF_EXPECTED);
}

#[test]
fn utf16le_input_lexes() {
    // "a: b" as UTF-16LE with BOM
    let mut bytes = vec![0xFF, 0xFE];
    for b in b"a: b" {
        bytes.push(*b);
        bytes.push(0);
    }
    assert_eq_lex_bytes(
        &bytes,
        r#"
LineStart(0)
Scalar(0) "a"
ControlChar(1) ":"
Scalar(3) "b"
StreamEnd(4)"#,
    );
}

#[test]
fn unsupported_encoding_is_an_error() {
    assert_eq_lex_bytes(
        b"\x2B\x2F\x76\x38foo",
        r#"
Error(0) "Unsupported stream encoding"
StreamEnd(0)"#,
    );
}

const BOM_INPUT: &[u8] = b"\xEF\xBB\xBFa\n";

#[test]
fn utf8_bom_is_skipped() {
    assert_eq_lex_bytes(
        BOM_INPUT,
        r#"
LineStart(0)
Scalar(0) "a"
StreamEnd(0)"#,
    );
}
