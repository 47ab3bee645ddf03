//! Owned-event iteration over the lexer.
//!
//! The lexer itself reuses one content slot per event; this adapter copies
//! payloads out so events can be collected, compared and printed. Golden
//! tests render events through the `Display` impl.

use std::fmt::{Display, Formatter};

use crate::tokenizer::lexer::Lexer;
use crate::tokenizer::source::{SliceSource, Source};
use crate::tokenizer::LexEventKind;

/// A lexical event with its payload copied out of the content slot.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OwnedLexEvent {
    pub kind: LexEventKind,
    pub column: u32,
    pub content: Vec<u8>,
}

impl Display for OwnedLexEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind.name(), self.column)?;
        if !self.content.is_empty() {
            let text = match simdutf8::basic::from_utf8(&self.content) {
                Ok(s) => s.to_owned(),
                Err(_) => String::from_utf8_lossy(&self.content).into_owned(),
            };
            write!(f, " {:?}", text)?;
        }
        Ok(())
    }
}

/// Iterator yielding every event of a lexer run, `StreamEnd` included.
pub struct LexIter<S> {
    lexer: Lexer<S>,
    finished: bool,
}

impl<'a> LexIter<SliceSource<'a>> {
    pub fn from_str(input: &'a str) -> LexIter<SliceSource<'a>> {
        LexIter::new(Lexer::new(SliceSource::from_str(input)))
    }

    pub fn from_bytes(input: &'a [u8]) -> LexIter<SliceSource<'a>> {
        LexIter::new(Lexer::new(SliceSource::new(input)))
    }
}

impl<S: Source> LexIter<S> {
    pub fn new(lexer: Lexer<S>) -> LexIter<S> {
        LexIter {
            lexer,
            finished: false,
        }
    }
}

impl<S: Source> Iterator for LexIter<S> {
    type Item = OwnedLexEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let event = self.lexer.next_event();
        if event.kind == LexEventKind::StreamEnd {
            self.finished = true;
        }
        Some(OwnedLexEvent {
            kind: event.kind,
            column: event.column,
            content: self.lexer.content().to_vec(),
        })
    }
}
