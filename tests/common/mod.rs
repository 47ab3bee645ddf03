use std::fmt::Write;

use forge_yaml::tokenizer::LexIter;

/// Lex `input` and compare the rendered event trace against `expect`.
/// Traces are written one event per line, `Kind(column)` plus the payload in
/// debug quoting when one is present.
pub fn assert_eq_lex(input: &str, expect: &str) {
    let mut trace = String::new();
    for event in LexIter::from_str(input) {
        write!(trace, "\n{event}").unwrap();
    }
    assert_eq!(expect, trace, "event mismatch for input {input:?}");
}

#[allow(dead_code)]
pub fn assert_eq_lex_bytes(input: &[u8], expect: &str) {
    let mut trace = String::new();
    for event in LexIter::from_bytes(input) {
        write!(trace, "\n{event}").unwrap();
    }
    assert_eq!(expect, trace, "event mismatch for input {input:?}");
}
