//! The lexer state machine.
//!
//! Consumes a [`Source`] one logical character at a time and produces a flat
//! sequence of [`LexEvent`]s ending in `StreamEnd`. The lexer is permissive:
//! grammar violations it can detect are emitted inline as `Error` events and
//! lexing continues on a best-effort basis. Structural interpretation
//! (indentation nesting, flow grammar) is the parser's concern.

use std::collections::VecDeque;
use std::mem::take;

use crate::encoding::Encoding;
use crate::tokenizer::char_utils::{
    hex_value, is_anchor_char, is_break, is_digit, is_directive_char, is_flow_indicator,
    is_uri_char, is_white, is_white_or_break,
};
use crate::tokenizer::source::Source;
use crate::tokenizer::LexEventKind;
use crate::tokenizer::LexEventKind::*;

/// One lexical event: a kind plus the 0-based column of the token's first
/// character. Payload text is read from [`Lexer::content`] and stays valid
/// until the next event is requested.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LexEvent {
    pub kind: LexEventKind,
    pub column: u32,
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum State {
    /// Start of a physical line: accumulate indentation, dispatch directives
    /// and document markers. Doubles as the initial state.
    LineStart,
    /// Within a line, between tokens.
    Content,
    Dashes { count: u32, at_line_start: bool },
    Dots { count: u32 },
    Plain,
    PlainSpace,
    PlainColon { colon_col: u32 },
    SingleQuoted,
    SingleQuoteEnd,
    DoubleQuoted,
    Escape,
    UnicodeEscape,
    TagStart,
    TagShorthand,
    TagSuffixPart,
    VerbatimTag,
    AnchorName,
    AliasName,
    DirectiveName,
    YamlMajor,
    YamlMinor,
    TagDirHandle,
    TagDirUri,
    UnknownDirParams,
    BlockHeader,
    BlockLine,
    Done,
}

struct Queued {
    kind: LexEventKind,
    column: u32,
    content: Vec<u8>,
}

pub struct Lexer<S> {
    source: S,
    state: State,
    queue: VecDeque<Queued>,
    /// Content slot of the last emitted event.
    buf: Vec<u8>,
    /// In-progress token accumulation.
    scalar: Vec<u8>,
    /// Whitespace inside a plain scalar, committed only when followed by
    /// more content on the same line.
    trailing: Vec<u8>,
    token_col: u32,
    flow_depth: u32,
    /// Base indentation of an active block scalar.
    block_scalar_indent: Option<u32>,
    last_indent: u32,
    /// Directives region: stream start and after each `DocumentEnd`.
    in_directives: bool,
    had_ws: bool,
    unicode: u32,
    esc_expected: u32,
    esc_got: u32,
    done: bool,
}

impl<S: Source> Lexer<S> {
    pub fn new(source: S) -> Lexer<S> {
        let mut lexer = Lexer {
            source,
            state: State::LineStart,
            queue: VecDeque::new(),
            buf: Vec::new(),
            scalar: Vec::new(),
            trailing: Vec::new(),
            token_col: 0,
            flow_depth: 0,
            block_scalar_indent: None,
            last_indent: 0,
            in_directives: true,
            had_ws: true,
            unicode: 0,
            esc_expected: 0,
            esc_got: 0,
            done: false,
        };
        if lexer.source.encoding() == Encoding::Unsupported {
            lexer.error_str(0, "Unsupported stream encoding");
            lexer.finish_stream();
        }
        lexer
    }

    /// Payload of the most recent event, raw bytes.
    pub fn content(&self) -> &[u8] {
        &self.buf
    }

    /// Payload of the most recent event as UTF-8 text.
    pub fn content_str(&self) -> Result<&str, simdutf8::basic::Utf8Error> {
        simdutf8::basic::from_utf8(&self.buf)
    }

    pub fn stream_ended(&self) -> bool {
        self.done && self.queue.is_empty()
    }

    pub fn line(&self) -> u32 {
        self.source.line()
    }

    /// Produce the next event, running the state machine to its next yield.
    /// After the stream has ended, keeps returning `StreamEnd`.
    pub fn next_event(&mut self) -> LexEvent {
        loop {
            if let Some(q) = self.queue.pop_front() {
                self.buf = q.content;
                return LexEvent {
                    kind: q.kind,
                    column: q.column,
                };
            }
            if self.done {
                self.buf.clear();
                return LexEvent {
                    kind: StreamEnd,
                    column: self.source.col(),
                };
            }
            self.step();
        }
    }

    fn emit(&mut self, kind: LexEventKind, column: u32, content: Vec<u8>) {
        self.queue.push_back(Queued {
            kind,
            column,
            content,
        });
    }

    fn emit_empty(&mut self, kind: LexEventKind, column: u32) {
        self.emit(kind, column, Vec::new());
    }

    /// Emit `kind` with the accumulated scalar buffer as payload.
    fn emit_scalar_buf(&mut self, kind: LexEventKind, column: u32) {
        let content = take(&mut self.scalar);
        self.emit(kind, column, content);
    }

    fn error_str(&mut self, column: u32, message: &str) {
        self.emit(Error, column, message.as_bytes().to_vec());
    }

    fn finish_stream(&mut self) {
        if let Some(e) = self.source.take_io_error() {
            let col = self.source.col();
            self.error_str(col, &format!("IO error: {e}"));
        }
        self.emit_empty(StreamEnd, self.source.col());
        self.done = true;
        self.state = State::Done;
    }

    fn step(&mut self) {
        match self.state {
            State::LineStart => self.line_start(),
            State::Content => self.content_dispatch(),
            State::Dashes {
                count,
                at_line_start,
            } => self.dashes(count, at_line_start),
            State::Dots { count } => self.dots(count),
            State::Plain => self.plain(),
            State::PlainSpace => self.plain_space(),
            State::PlainColon { colon_col } => self.plain_colon(colon_col),
            State::SingleQuoted => self.single_quoted(),
            State::SingleQuoteEnd => self.single_quote_end(),
            State::DoubleQuoted => self.double_quoted(),
            State::Escape => self.escape(),
            State::UnicodeEscape => self.unicode_escape(),
            State::TagStart => self.tag_start(),
            State::TagShorthand => self.tag_shorthand(),
            State::TagSuffixPart => self.tag_suffix(),
            State::VerbatimTag => self.verbatim_tag(),
            State::AnchorName => self.anchor_name(Anchor),
            State::AliasName => self.anchor_name(Alias),
            State::DirectiveName => self.directive_name(),
            State::YamlMajor => self.yaml_version(true),
            State::YamlMinor => self.yaml_version(false),
            State::TagDirHandle => self.tag_directive_word(true),
            State::TagDirUri => self.tag_directive_word(false),
            State::UnknownDirParams => self.unknown_directive_params(),
            State::BlockHeader => self.block_header(),
            State::BlockLine => self.block_line(),
            State::Done => self.finish_stream(),
        }
    }

    fn line_start(&mut self) {
        match self.source.peek() {
            None => self.finish_stream(),
            Some(b' ') => {
                self.scalar.push(b' ');
                self.source.bump();
            }
            // Tabs never contribute to indentation; the parser rejects them
            // where the grammar forbids them.
            Some(b'\t') => self.source.bump(),
            // Blank lines leave an active block scalar in effect; only the
            // first content line at or below the base indent ends it.
            Some(b) if is_break(b) => {
                let width = self.scalar.len() as u32;
                self.emit_scalar_buf(LineStart, 0);
                self.last_indent = width;
                self.source.read_break();
            }
            Some(b'%') if self.in_directives && self.scalar.is_empty() && self.flow_depth == 0 => {
                self.token_col = self.source.col();
                self.source.bump();
                self.state = State::DirectiveName;
            }
            Some(b'#') if self.in_directives && self.scalar.is_empty() => {
                self.comment();
                self.state = State::Content;
            }
            Some(b'-') if self.in_directives && self.scalar.is_empty() && self.flow_depth == 0 => {
                self.token_col = self.source.col();
                self.source.bump();
                self.state = State::Dashes {
                    count: 1,
                    at_line_start: true,
                };
            }
            Some(_) => {
                let width = self.scalar.len() as u32;
                self.emit_scalar_buf(LineStart, 0);
                self.last_indent = width;
                self.had_ws = true;
                self.state = match self.block_scalar_indent {
                    Some(base) if width > base => {
                        self.token_col = self.source.col();
                        State::BlockLine
                    }
                    Some(_) => {
                        self.block_scalar_indent = None;
                        State::Content
                    }
                    None => State::Content,
                };
            }
        }
    }

    fn content_dispatch(&mut self) {
        let col = self.source.col();
        match self.source.peek() {
            None => self.finish_stream(),
            Some(b) if is_break(b) => {
                self.source.read_break();
                self.scalar.clear();
                self.had_ws = true;
                self.state = State::LineStart;
            }
            Some(b) if is_white(b) => {
                self.source.bump();
                self.had_ws = true;
            }
            Some(b'#') => {
                if !self.had_ws {
                    self.error_str(col, "Missing space before comment start");
                }
                self.comment();
            }
            Some(b'-') => {
                self.token_col = col;
                self.source.bump();
                self.had_ws = false;
                self.state = State::Dashes {
                    count: 1,
                    at_line_start: false,
                };
            }
            Some(b'.') => {
                self.token_col = col;
                self.source.bump();
                self.had_ws = false;
                self.state = State::Dots { count: 1 };
            }
            Some(b @ (b':' | b'?')) => {
                self.source.bump();
                self.had_ws = false;
                let next = self.source.peek();
                let ends = match next {
                    None => true,
                    Some(n) if is_white_or_break(n) => true,
                    Some(n) => self.flow_depth > 0 && is_flow_indicator(n),
                };
                if ends {
                    self.emit(ControlChar, col, vec![b]);
                } else {
                    self.token_col = col;
                    self.scalar.clear();
                    self.trailing.clear();
                    self.scalar.push(b);
                    self.state = State::Plain;
                }
            }
            Some(b',') if self.flow_depth > 0 => {
                self.emit(ControlChar, col, vec![b',']);
                self.source.bump();
                self.had_ws = false;
            }
            Some(b @ (b'[' | b'{')) => {
                self.emit(ControlChar, col, vec![b]);
                self.source.bump();
                self.flow_depth += 1;
                self.had_ws = false;
            }
            Some(b @ (b']' | b'}')) => {
                if self.flow_depth > 0 {
                    self.emit(ControlChar, col, vec![b]);
                    self.flow_depth -= 1;
                } else {
                    self.error_str(col, "Unexpected closing bracket in block context");
                }
                self.source.bump();
                self.had_ws = false;
            }
            Some(b'\'') => {
                self.token_col = col;
                self.source.bump();
                self.scalar.clear();
                self.had_ws = false;
                self.state = State::SingleQuoted;
            }
            Some(b'"') => {
                self.token_col = col;
                self.source.bump();
                self.scalar.clear();
                self.had_ws = false;
                self.state = State::DoubleQuoted;
            }
            Some(b'|') => {
                self.emit(LiteralScalar, col, vec![b'|']);
                self.source.bump();
                self.had_ws = false;
                self.state = State::BlockHeader;
            }
            Some(b'>') => {
                self.emit(FoldedScalar, col, vec![b'>']);
                self.source.bump();
                self.had_ws = false;
                self.state = State::BlockHeader;
            }
            Some(b'!') => {
                self.token_col = col;
                self.source.bump();
                self.had_ws = false;
                self.state = State::TagStart;
            }
            Some(b'&') => {
                self.token_col = col;
                self.source.bump();
                self.scalar.clear();
                self.had_ws = false;
                self.state = State::AnchorName;
            }
            Some(b'*') => {
                self.token_col = col;
                self.source.bump();
                self.scalar.clear();
                self.had_ws = false;
                self.state = State::AliasName;
            }
            Some(b @ (b'@' | b'`')) => {
                self.error_str(col, "Reserved character cannot start a plain scalar");
                self.token_col = col;
                self.scalar.clear();
                self.trailing.clear();
                self.scalar.push(b);
                self.source.bump();
                self.had_ws = false;
                self.state = State::Plain;
            }
            Some(_) => {
                self.token_col = col;
                self.scalar.clear();
                self.trailing.clear();
                self.source.push_unit(&mut self.scalar);
                self.had_ws = false;
                self.state = State::Plain;
            }
        }
    }

    fn dashes(&mut self, count: u32, at_line_start: bool) {
        match self.source.peek() {
            Some(b'-') => {
                self.source.bump();
                self.state = State::Dashes {
                    count: count + 1,
                    at_line_start,
                };
            }
            next => {
                let terminated = next.map_or(true, is_white_or_break);
                if terminated && count == 3 {
                    self.emit_empty(DirectivesEnd, self.token_col);
                    self.in_directives = false;
                    self.state = State::Content;
                } else if terminated && count == 1 {
                    self.flush_line_start(at_line_start);
                    self.emit(ControlChar, self.token_col, vec![b'-']);
                    self.state = State::Content;
                } else {
                    self.flush_line_start(at_line_start);
                    self.scalar.clear();
                    self.trailing.clear();
                    self.scalar.extend(std::iter::repeat(b'-').take(count as usize));
                    self.state = State::Plain;
                }
            }
        }
    }

    fn dots(&mut self, count: u32) {
        match self.source.peek() {
            Some(b'.') => {
                self.source.bump();
                self.state = State::Dots { count: count + 1 };
            }
            next => {
                let terminated = next.map_or(true, is_white_or_break);
                if terminated && count == 3 {
                    self.emit_empty(DocumentEnd, self.token_col);
                    self.in_directives = true;
                    self.state = State::Content;
                } else {
                    self.scalar.clear();
                    self.trailing.clear();
                    self.scalar.extend(std::iter::repeat(b'.').take(count as usize));
                    self.state = State::Plain;
                }
            }
        }
    }

    /// Emit the `LineStart` a marker candidate suppressed, now that the line
    /// turned out to hold ordinary content.
    fn flush_line_start(&mut self, at_line_start: bool) {
        if at_line_start {
            self.emit_empty(LineStart, 0);
            self.last_indent = 0;
            self.had_ws = true;
        }
    }

    fn plain(&mut self) {
        match self.source.peek() {
            None => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(b) if is_break(b) => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(b) if is_white(b) => {
                self.trailing.clear();
                self.trailing.push(b);
                self.source.bump();
                self.state = State::PlainSpace;
            }
            Some(b':') => {
                let colon_col = self.source.col();
                self.source.bump();
                self.state = State::PlainColon { colon_col };
            }
            Some(b) if self.flow_depth > 0 && is_flow_indicator(b) => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(_) => {
                self.source.push_unit(&mut self.scalar);
            }
        }
    }

    fn plain_space(&mut self) {
        match self.source.peek() {
            None => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(b) if is_break(b) => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(b) if is_white(b) => {
                self.trailing.push(b);
                self.source.bump();
            }
            Some(b'#') => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.had_ws = true;
                self.state = State::Content;
            }
            Some(b':') => {
                let colon_col = self.source.col();
                self.source.bump();
                self.state = State::PlainColon { colon_col };
            }
            Some(b) if self.flow_depth > 0 && is_flow_indicator(b) => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(_) => {
                let pending = take(&mut self.trailing);
                self.scalar.extend_from_slice(&pending);
                self.state = State::Plain;
            }
        }
    }

    fn plain_colon(&mut self, colon_col: u32) {
        let next = self.source.peek();
        let ends = match next {
            None => true,
            Some(n) if is_white_or_break(n) => true,
            Some(n) => self.flow_depth > 0 && is_flow_indicator(n),
        };
        if ends {
            self.trailing.clear();
            self.emit_scalar_buf(Scalar, self.token_col);
            self.emit(ControlChar, colon_col, vec![b':']);
            self.state = State::Content;
        } else {
            let pending = take(&mut self.trailing);
            self.scalar.extend_from_slice(&pending);
            self.scalar.push(b':');
            self.state = State::Plain;
        }
    }

    fn single_quoted(&mut self) {
        match self.source.peek() {
            None => {
                let col = self.source.col();
                self.error_str(col, "Unterminated single quoted string");
                self.finish_stream();
            }
            Some(b'\'') => {
                self.source.bump();
                self.state = State::SingleQuoteEnd;
            }
            Some(b) if is_break(b) => {
                self.scalar.push(b'\n');
                self.source.read_break();
            }
            Some(_) => self.source.push_unit(&mut self.scalar),
        }
    }

    fn single_quote_end(&mut self) {
        match self.source.peek() {
            Some(b'\'') => {
                self.scalar.push(b'\'');
                self.source.bump();
                self.state = State::SingleQuoted;
            }
            _ => {
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
        }
    }

    fn double_quoted(&mut self) {
        match self.source.peek() {
            None => {
                let col = self.source.col();
                self.error_str(col, "Unterminated double quoted string");
                self.finish_stream();
            }
            Some(b'"') => {
                self.source.bump();
                self.emit_scalar_buf(Scalar, self.token_col);
                self.state = State::Content;
            }
            Some(b'\\') => {
                self.source.bump();
                self.state = State::Escape;
            }
            Some(b) if is_break(b) => {
                self.scalar.push(b'\n');
                self.source.read_break();
            }
            Some(_) => self.source.push_unit(&mut self.scalar),
        }
    }

    fn escape(&mut self) {
        let col = self.source.col();
        match self.source.peek() {
            None => {
                self.error_str(col, "Unterminated double quoted string");
                self.finish_stream();
            }
            Some(b) if is_break(b) => {
                self.error_str(col, "Invalid escape sequence");
                self.state = State::DoubleQuoted;
            }
            Some(b'x') => self.begin_unicode_escape(2),
            Some(b'u') => self.begin_unicode_escape(4),
            Some(b'U') => self.begin_unicode_escape(8),
            Some(b) => {
                match simple_escape(b) {
                    Some(ch) => self.push_char(ch),
                    None => self.error_str(col, "Invalid escape sequence"),
                }
                self.source.bump();
                self.state = State::DoubleQuoted;
            }
        }
    }

    fn begin_unicode_escape(&mut self, expected: u32) {
        self.source.bump();
        self.unicode = 0;
        self.esc_expected = expected;
        self.esc_got = 0;
        self.state = State::UnicodeEscape;
    }

    fn unicode_escape(&mut self) {
        let col = self.source.col();
        match self.source.peek().and_then(hex_value) {
            Some(digit) => {
                self.unicode |= digit << (4 * (self.esc_expected - self.esc_got - 1));
                self.esc_got += 1;
                self.source.bump();
                if self.esc_got == self.esc_expected {
                    match char::from_u32(self.unicode) {
                        Some(ch) => self.push_char(ch),
                        None => self.error_str(col, "Invalid unicode code point"),
                    }
                    self.state = State::DoubleQuoted;
                }
            }
            None => {
                self.error_str(col, "Invalid character in unicode escape sequence");
                self.state = State::DoubleQuoted;
            }
        }
    }

    fn push_char(&mut self, ch: char) {
        let mut tmp = [0u8; 4];
        self.scalar
            .extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
    }

    fn tag_start(&mut self) {
        match self.source.peek() {
            Some(b'<') => {
                self.source.bump();
                self.scalar.clear();
                self.state = State::VerbatimTag;
            }
            Some(b) if is_uri_char(b) || b == b'!' => {
                self.scalar.clear();
                self.state = State::TagShorthand;
            }
            _ => {
                // a lone `!`: primary handle with empty suffix
                self.emit(TagHandle, self.token_col, vec![b'!']);
                self.emit_empty(TagSuffix, self.token_col + 1);
                self.state = State::Content;
            }
        }
    }

    fn tag_shorthand(&mut self) {
        match self.source.peek() {
            Some(b'!') => {
                let mut handle = Vec::with_capacity(self.scalar.len() + 2);
                handle.push(b'!');
                handle.extend_from_slice(&self.scalar);
                handle.push(b'!');
                self.emit(TagHandle, self.token_col, handle);
                self.source.bump();
                self.scalar.clear();
                self.token_col = self.source.col();
                self.state = State::TagSuffixPart;
            }
            Some(b) if is_uri_char(b) => {
                self.scalar.push(b);
                self.source.bump();
            }
            _ => {
                // no second `!`: what accumulated is the suffix of the
                // primary handle
                let suffix = take(&mut self.scalar);
                self.emit(TagHandle, self.token_col, vec![b'!']);
                self.emit(TagSuffix, self.token_col + 1, suffix);
                self.state = State::Content;
            }
        }
    }

    fn tag_suffix(&mut self) {
        match self.source.peek() {
            Some(b) if is_uri_char(b) => {
                self.scalar.push(b);
                self.source.bump();
            }
            Some(b'!') => {
                let col = self.source.col();
                self.error_str(col, "Unexpected '!' in tag suffix");
                self.source.bump();
            }
            _ => {
                self.emit_scalar_buf(TagSuffix, self.token_col);
                self.state = State::Content;
            }
        }
    }

    fn verbatim_tag(&mut self) {
        match self.source.peek() {
            Some(b'>') => {
                self.source.bump();
                self.emit_scalar_buf(VerbatimTag, self.token_col);
                self.state = State::Content;
            }
            Some(b) if !is_break(b) => self.source.push_unit(&mut self.scalar),
            _ => {
                let col = self.source.col();
                self.error_str(col, "Unterminated verbatim tag");
                self.scalar.clear();
                self.state = State::Content;
            }
        }
    }

    fn anchor_name(&mut self, kind: LexEventKind) {
        match self.source.peek() {
            Some(b) if is_anchor_char(b) => self.source.push_unit(&mut self.scalar),
            _ => {
                if self.scalar.is_empty() {
                    let message = if kind == Anchor {
                        "Missing anchor name"
                    } else {
                        "Missing alias name"
                    };
                    self.error_str(self.token_col, message);
                } else {
                    self.emit_scalar_buf(kind, self.token_col);
                }
                self.state = State::Content;
            }
        }
    }

    fn directive_name(&mut self) {
        match self.source.peek() {
            Some(b) if is_directive_char(b) => {
                self.scalar.push(b);
                self.source.bump();
            }
            _ => {
                if self.scalar == b"YAML" {
                    self.scalar.clear();
                    self.emit(YamlDirective, self.token_col, b"%YAML".to_vec());
                    self.state = State::YamlMajor;
                } else if self.scalar == b"TAG" {
                    self.scalar.clear();
                    self.emit(TagDirective, self.token_col, b"%TAG".to_vec());
                    self.state = State::TagDirHandle;
                } else if self.scalar.is_empty() {
                    self.error_str(self.token_col, "Missing directive name");
                    self.state = State::Content;
                } else {
                    let mut name = Vec::with_capacity(self.scalar.len() + 1);
                    name.push(b'%');
                    name.extend_from_slice(&self.scalar);
                    self.scalar.clear();
                    self.emit(UnknownDirective, self.token_col, name);
                    self.state = State::UnknownDirParams;
                }
            }
        }
    }

    fn yaml_version(&mut self, major: bool) {
        let col = self.source.col();
        match self.source.peek() {
            Some(b) if is_white(b) && self.scalar.is_empty() => self.source.bump(),
            Some(b) if is_digit(b) => {
                if self.scalar.is_empty() {
                    self.token_col = col;
                }
                self.scalar.push(b);
                self.source.bump();
            }
            Some(b'.') if major && !self.scalar.is_empty() => {
                self.emit_scalar_buf(MajorVersion, self.token_col);
                self.source.bump();
                self.state = State::YamlMinor;
            }
            next => {
                let boundary = next.map_or(true, is_white_or_break);
                if !major && boundary && !self.scalar.is_empty() {
                    self.emit_scalar_buf(MinorVersion, self.token_col);
                } else {
                    self.scalar.clear();
                    self.error_str(col, "Invalid YAML version number");
                }
                self.state = State::Content;
            }
        }
    }

    fn tag_directive_word(&mut self, handle: bool) {
        match self.source.peek() {
            Some(b) if is_white(b) && self.scalar.is_empty() => self.source.bump(),
            Some(b) if !is_white_or_break(b) => {
                if self.scalar.is_empty() {
                    self.token_col = self.source.col();
                }
                self.source.push_unit(&mut self.scalar);
            }
            _ => {
                if handle {
                    if self.scalar.first() == Some(&b'!') {
                        self.emit_scalar_buf(TagHandle, self.token_col);
                    } else {
                        self.scalar.clear();
                        self.error_str(self.token_col, "Invalid tag handle");
                    }
                    self.state = State::TagDirUri;
                } else {
                    if self.scalar.is_empty() {
                        self.error_str(self.token_col, "Missing tag URI");
                    } else {
                        self.emit_scalar_buf(TagUri, self.token_col);
                    }
                    self.state = State::Content;
                }
            }
        }
    }

    fn unknown_directive_params(&mut self) {
        match self.source.peek() {
            Some(b) if is_white(b) => {
                if !self.scalar.is_empty() {
                    self.emit_scalar_buf(UnknownDirectiveParam, self.token_col);
                }
                self.source.bump();
            }
            Some(b'#') if self.scalar.is_empty() => self.comment(),
            Some(b) if !is_break(b) => {
                if self.scalar.is_empty() {
                    self.token_col = self.source.col();
                }
                self.source.push_unit(&mut self.scalar);
            }
            _ => {
                if !self.scalar.is_empty() {
                    self.emit_scalar_buf(UnknownDirectiveParam, self.token_col);
                }
                self.state = State::Content;
            }
        }
    }

    fn block_header(&mut self) {
        let col = self.source.col();
        match self.source.peek() {
            Some(b @ b'1'..=b'9') => {
                self.emit(BlockIndentationIndicator, col, vec![b]);
                self.source.bump();
                self.had_ws = false;
            }
            Some(b'0') => {
                self.error_str(col, "Invalid block scalar indentation indicator");
                self.source.bump();
                self.had_ws = false;
            }
            Some(b @ (b'+' | b'-')) => {
                self.emit(BlockChompingIndicator, col, vec![b]);
                self.source.bump();
                self.had_ws = false;
            }
            Some(b) if is_white(b) => {
                self.source.bump();
                self.had_ws = true;
            }
            Some(b'#') => {
                if !self.had_ws {
                    self.error_str(col, "Missing space before comment start");
                }
                self.comment();
            }
            Some(b) if !is_break(b) => {
                self.error_str(col, "Invalid character in block scalar header");
                self.source.bump();
                self.had_ws = false;
            }
            _ => {
                // EOL or EOF: the body's base indent is the header line's
                self.block_scalar_indent = Some(self.last_indent);
                self.state = State::Content;
            }
        }
    }

    fn block_line(&mut self) {
        self.scalar.clear();
        self.source.take_until_break(&mut self.scalar);
        self.emit_scalar_buf(BlockScalarLine, self.token_col);
        self.state = State::Content;
    }

    fn comment(&mut self) {
        let col = self.source.col();
        self.source.bump();
        self.scalar.clear();
        self.source.take_until_break(&mut self.scalar);
        self.emit_scalar_buf(Comment, col);
    }
}

/// The single-character escapes of double-quoted scalars, mapped to their
/// code points.
fn simple_escape(b: u8) -> Option<char> {
    Some(match b {
        b'0' => '\0',
        b'a' => '\u{07}',
        b'b' => '\u{08}',
        b't' | b'\t' => '\t',
        b'n' => '\n',
        b'v' => '\u{0B}',
        b'f' => '\u{0C}',
        b'r' => '\r',
        b'e' => '\u{1B}',
        b' ' => ' ',
        b'"' => '"',
        b'/' => '/',
        b'\\' => '\\',
        b'N' => '\u{85}',
        b'_' => '\u{A0}',
        b'L' => '\u{2028}',
        b'P' => '\u{2029}',
        _ => return None,
    })
}
