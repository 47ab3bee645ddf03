//! Byte sources feeding the lexer.
//!
//! A source owns its buffer and hands the lexer one *logical character* per
//! step: the low byte of the current code unit, sized by the detected
//! [`Encoding`]. Sources track the current line and column; the column counts
//! logical characters since the last line break.

use std::io::Read;

use memchr::memchr2;

use crate::encoding::{self, Encoding};
use crate::tokenizer::char_utils::is_break;

/// Stream of logical characters with a one-character lookahead.
pub trait Source {
    /// Low byte of the current code unit, `None` at end of input.
    fn peek(&mut self) -> Option<u8>;

    /// Advance past the current code unit.
    fn bump(&mut self);

    /// Append the bytes of the current code unit to `out` and advance.
    ///
    /// ASCII units contribute their low byte only; units with non-zero high
    /// bytes are passed through whole, in stream order.
    fn push_unit(&mut self, out: &mut Vec<u8>);

    /// Consume a LF, CR or CRLF break. Returns false when the current
    /// character is not a break. Consuming a break advances the line counter
    /// and resets the column.
    fn read_break(&mut self) -> bool;

    /// Append everything up to (not including) the next break or end of
    /// input.
    fn take_until_break(&mut self, out: &mut Vec<u8>);

    fn encoding(&self) -> Encoding;
    fn line(&self) -> u32;
    fn col(&self) -> u32;

    /// I/O failure recorded while refilling, if any. Taking it clears it.
    fn take_io_error(&mut self) -> Option<std::io::Error> {
        None
    }
}

/// Source over an in-memory buffer.
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
    encoding: Encoding,
    stride: usize,
    low: usize,
    line: u32,
    col: u32,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> SliceSource<'a> {
        let (encoding, bom) = encoding::detect(data);
        SliceSource {
            data,
            pos: bom,
            encoding,
            stride: encoding.stride(),
            low: encoding.low_byte_offset(),
            line: 0,
            col: 0,
        }
    }

    pub fn from_str(data: &'a str) -> SliceSource<'a> {
        Self::new(data.as_bytes())
    }

    #[inline]
    fn unit(&self) -> &'a [u8] {
        let end = (self.pos + self.stride).min(self.data.len());
        &self.data[self.pos.min(self.data.len())..end]
    }
}

impl Source for SliceSource<'_> {
    #[inline]
    fn peek(&mut self) -> Option<u8> {
        if self.pos >= self.data.len() {
            return None;
        }
        // A truncated trailing unit still yields its first byte.
        self.data
            .get(self.pos + self.low)
            .or_else(|| self.data.get(self.pos))
            .copied()
    }

    #[inline]
    fn bump(&mut self) {
        if self.pos < self.data.len() {
            self.pos += self.stride;
            self.col += 1;
        }
    }

    fn push_unit(&mut self, out: &mut Vec<u8>) {
        let unit = self.unit();
        if unit.is_empty() {
            return;
        }
        let low = unit.get(self.low).copied().unwrap_or(unit[0]);
        if unit.iter().enumerate().all(|(i, &b)| i == self.low || b == 0) {
            out.push(low);
        } else {
            out.extend_from_slice(unit);
        }
        self.bump();
    }

    fn read_break(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.bump();
            }
            Some(b'\r') => {
                self.bump();
                if self.peek() == Some(b'\n') {
                    self.bump();
                }
            }
            _ => return false,
        }
        self.line += 1;
        self.col = 0;
        true
    }

    fn take_until_break(&mut self, out: &mut Vec<u8>) {
        if self.stride == 1 {
            let rest = &self.data[self.pos.min(self.data.len())..];
            let n = memchr2(b'\r', b'\n', rest).unwrap_or(rest.len());
            out.extend_from_slice(&rest[..n]);
            self.pos += n;
            self.col += n as u32;
            return;
        }
        while let Some(b) = self.peek() {
            if is_break(b) {
                break;
            }
            self.push_unit(out);
        }
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn col(&self) -> u32 {
        self.col
    }
}

const READ_CHUNK: usize = 8 * 1024;

/// Source over a stream-like producer with `read` semantics.
///
/// Refills an internal buffer on demand; an I/O failure is recorded and the
/// stream then reports end of input, letting the lexer surface the failure as
/// an error event before `StreamEnd`.
pub struct ReadSource<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    io_error: Option<std::io::Error>,
    encoding: Encoding,
    stride: usize,
    low: usize,
    line: u32,
    col: u32,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> ReadSource<R> {
        let mut src = ReadSource {
            reader,
            buf: Vec::with_capacity(READ_CHUNK),
            pos: 0,
            eof: false,
            io_error: None,
            encoding: Encoding::Utf8,
            stride: 1,
            low: 0,
            line: 0,
            col: 0,
        };
        src.ensure(4);
        let (encoding, bom) = encoding::detect(&src.buf[..src.buf.len().min(4)]);
        src.encoding = encoding;
        src.stride = encoding.stride();
        src.low = encoding.low_byte_offset();
        src.pos = bom;
        src
    }

    /// Make at least `n` bytes available past the read position, unless the
    /// underlying stream ends first.
    fn ensure(&mut self, n: usize) {
        while !self.eof && self.buf.len() - self.pos < n {
            if self.pos > READ_CHUNK {
                self.buf.drain(..self.pos);
                self.pos = 0;
            }
            let start = self.buf.len();
            self.buf.resize(start + READ_CHUNK, 0);
            match self.reader.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    self.eof = true;
                }
                Ok(read) => self.buf.truncate(start + read),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                    self.buf.truncate(start);
                }
                Err(e) => {
                    self.buf.truncate(start);
                    self.io_error = Some(e);
                    self.eof = true;
                }
            }
        }
    }

    #[inline]
    fn unit_len(&self) -> usize {
        (self.buf.len() - self.pos).min(self.stride)
    }
}

impl<R: Read> Source for ReadSource<R> {
    fn peek(&mut self) -> Option<u8> {
        self.ensure(self.stride);
        if self.pos >= self.buf.len() {
            return None;
        }
        self.buf
            .get(self.pos + self.low)
            .or_else(|| self.buf.get(self.pos))
            .copied()
    }

    fn bump(&mut self) {
        self.ensure(self.stride);
        if self.pos < self.buf.len() {
            self.pos += self.unit_len();
            self.col += 1;
        }
    }

    fn push_unit(&mut self, out: &mut Vec<u8>) {
        self.ensure(self.stride);
        let len = self.unit_len();
        if len == 0 {
            return;
        }
        let unit = &self.buf[self.pos..self.pos + len];
        let low = unit.get(self.low).copied().unwrap_or(unit[0]);
        if unit.iter().enumerate().all(|(i, &b)| i == self.low || b == 0) {
            out.push(low);
        } else {
            out.extend_from_slice(unit);
        }
        self.pos += len;
        self.col += 1;
    }

    fn read_break(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.bump();
            }
            Some(b'\r') => {
                self.bump();
                if self.peek() == Some(b'\n') {
                    self.bump();
                }
            }
            _ => return false,
        }
        self.line += 1;
        self.col = 0;
        true
    }

    fn take_until_break(&mut self, out: &mut Vec<u8>) {
        loop {
            if self.stride == 1 {
                self.ensure(1);
                let rest = &self.buf[self.pos.min(self.buf.len())..];
                if rest.is_empty() {
                    return;
                }
                match memchr2(b'\r', b'\n', rest) {
                    Some(n) => {
                        out.extend_from_slice(&rest[..n]);
                        self.pos += n;
                        self.col += n as u32;
                        return;
                    }
                    None => {
                        out.extend_from_slice(rest);
                        self.col += rest.len() as u32;
                        self.pos = self.buf.len();
                    }
                }
            } else {
                match self.peek() {
                    Some(b) if !is_break(b) => self.push_unit(out),
                    _ => return,
                }
            }
        }
    }

    fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn col(&self) -> u32 {
        self.col
    }

    fn take_io_error(&mut self) -> Option<std::io::Error> {
        self.io_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_and_lines() {
        for input in ["a|\r\nb", "a|\nb", "a|\rb"] {
            let mut src = SliceSource::from_str(input);
            src.bump();
            src.bump();
            assert_eq!(src.col(), 2);
            assert!(src.read_break());
            assert_eq!(src.line(), 1);
            assert_eq!(src.col(), 0);
            assert_eq!(src.peek(), Some(b'b'));
        }
    }

    #[test]
    fn utf16_low_bytes() {
        // "a:" in UTF-16LE with BOM
        let mut src = SliceSource::new(b"\xFF\xFEa\x00:\x00");
        assert_eq!(src.encoding(), Encoding::Utf16Le);
        assert_eq!(src.peek(), Some(b'a'));
        src.bump();
        assert_eq!(src.peek(), Some(b':'));
        src.bump();
        assert_eq!(src.peek(), None);
    }

    #[test]
    fn utf16_passthrough() {
        // U+00E9 in UTF-16BE: 00 E9 is ASCII-width zero? No: low byte e9,
        // high byte 0 -> single byte pushed.
        let mut src = SliceSource::new(b"\xFE\xFF\x00\xE9\x01\x02");
        let mut out = Vec::new();
        src.push_unit(&mut out);
        assert_eq!(out, vec![0xE9]);
        src.push_unit(&mut out);
        assert_eq!(out, vec![0xE9, 0x01, 0x02]);
    }

    #[test]
    fn read_source_matches_slice_source() {
        let input = "key: value\nother: [1, 2]\n";
        let mut a = SliceSource::from_str(input);
        let mut b = ReadSource::new(input.as_bytes());
        loop {
            assert_eq!(a.peek(), b.peek());
            if a.peek().is_none() {
                break;
            }
            if !a.read_break() {
                a.bump();
            } else {
                assert!(b.read_break());
                continue;
            }
            b.bump();
        }
        assert_eq!(a.line(), b.line());
    }

    #[test]
    fn take_until_break_stops_at_eol() {
        let mut src = SliceSource::from_str("# note\nrest");
        let mut out = Vec::new();
        src.take_until_break(&mut out);
        assert_eq!(out, b"# note");
        assert!(src.read_break());
        assert_eq!(src.peek(), Some(b'r'));
    }
}
