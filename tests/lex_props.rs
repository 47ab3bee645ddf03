//! Property tests for the lexer's quantified invariants.

use forge_yaml::tokenizer::LexIter;
use forge_yaml::LexEventKind;
use proptest::prelude::*;

proptest! {
    /// Double-quoting any code point as `\U` plus eight hex digits and
    /// lexing it back yields a single scalar holding the UTF-8 encoding of
    /// that code point.
    #[test]
    fn escape_round_trip(c: char) {
        let input = format!("\"\\U{:08X}\"", c as u32);
        let events: Vec<_> = LexIter::from_str(&input).collect();
        let scalars: Vec<_> = events
            .iter()
            .filter(|e| e.kind == LexEventKind::Scalar)
            .collect();
        prop_assert_eq!(scalars.len(), 1);
        let expected = c.to_string();
        prop_assert_eq!(&scalars[0].content, expected.as_bytes());
        prop_assert!(!events.iter().any(|e| e.kind == LexEventKind::Error));
    }

    /// Every finite input produces a finite event sequence ending in
    /// `StreamEnd`.
    #[test]
    fn lexing_terminates(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        let cap = input.len() * 8 + 64;
        let events: Vec<_> = LexIter::from_bytes(&input).take(cap).collect();
        prop_assert!(events.len() < cap, "lexer did not terminate");
        prop_assert_eq!(events.last().map(|e| e.kind), Some(LexEventKind::StreamEnd));
    }

    /// Same, restricted to printable YAML-ish text so the interesting state
    /// transitions are actually exercised.
    #[test]
    fn lexing_terminates_on_text(input in "[ -~\n]{0,200}") {
        let cap = input.len() * 8 + 64;
        let events: Vec<_> = LexIter::from_str(&input).take(cap).collect();
        prop_assert!(events.len() < cap, "lexer did not terminate");
        prop_assert_eq!(events.last().map(|e| e.kind), Some(LexEventKind::StreamEnd));
    }
}
