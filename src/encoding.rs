//! Stream encoding detection.
//!
//! YAML streams may arrive in any Unicode encoding. The scheme from the YAML
//! spec (§5.2) identifies the encoding from the first four bytes: an explicit
//! byte order mark wins, otherwise the position of zero bytes around the first
//! ASCII character decides.

/// Detected stream encoding.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// A recognised BOM for an encoding this library does not process
    /// (UTF-7, UTF-1, UTF-EBCDIC). The lexer reports it as an error event.
    Unsupported,
}

impl Encoding {
    /// Width of one code unit in bytes.
    #[inline]
    pub fn stride(self) -> usize {
        match self {
            Encoding::Utf8 | Encoding::Unsupported => 1,
            Encoding::Utf16Le | Encoding::Utf16Be => 2,
            Encoding::Utf32Le | Encoding::Utf32Be => 4,
        }
    }

    /// Offset of the low-order byte within a code unit. YAML's syntactic
    /// characters are all ASCII, so this byte is the one the lexer matches on.
    #[inline]
    pub fn low_byte_offset(self) -> usize {
        match self {
            Encoding::Utf8 | Encoding::Utf16Le | Encoding::Utf32Le | Encoding::Unsupported => 0,
            Encoding::Utf16Be => 1,
            Encoding::Utf32Be => 3,
        }
    }
}

/// Detect the encoding of a stream from its first bytes.
///
/// Returns the encoding and the length of the byte order mark to skip.
pub fn detect(head: &[u8]) -> (Encoding, usize) {
    match head {
        [0x00, 0x00, 0xFE, 0xFF, ..] => (Encoding::Utf32Be, 4),
        [0xFF, 0xFE, 0x00, 0x00, ..] => (Encoding::Utf32Le, 4),
        [0xEF, 0xBB, 0xBF, ..] => (Encoding::Utf8, 3),
        [0xFE, 0xFF, ..] => (Encoding::Utf16Be, 2),
        [0xFF, 0xFE, ..] => (Encoding::Utf16Le, 2),
        [0x2B, 0x2F, 0x76, ..] => (Encoding::Unsupported, 0),
        [0xF7, 0x64, 0x4C, ..] => (Encoding::Unsupported, 0),
        [0xDD, 0x73, 0x66, 0x73, ..] => (Encoding::Unsupported, 0),
        [0x00, 0x00, 0x00, _, ..] => (Encoding::Utf32Be, 0),
        [_, 0x00, 0x00, 0x00, ..] => (Encoding::Utf32Le, 0),
        [0x00, _, ..] => (Encoding::Utf16Be, 0),
        [_, 0x00, ..] => (Encoding::Utf16Le, 0),
        _ => (Encoding::Utf8, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_detection() {
        assert_eq!(detect(b"\xEF\xBB\xBFa"), (Encoding::Utf8, 3));
        assert_eq!(detect(b"\xFE\xFF\x00a"), (Encoding::Utf16Be, 2));
        assert_eq!(detect(b"\xFF\xFEa\x00"), (Encoding::Utf16Le, 2));
        assert_eq!(detect(b"\x00\x00\xFE\xFF"), (Encoding::Utf32Be, 4));
        assert_eq!(detect(b"\xFF\xFE\x00\x00"), (Encoding::Utf32Le, 4));
    }

    #[test]
    fn zero_pattern_detection() {
        assert_eq!(detect(b"a: b"), (Encoding::Utf8, 0));
        assert_eq!(detect(b"\x00a\x00:"), (Encoding::Utf16Be, 0));
        assert_eq!(detect(b"a\x00:\x00"), (Encoding::Utf16Le, 0));
        assert_eq!(detect(b"\x00\x00\x00a"), (Encoding::Utf32Be, 0));
        assert_eq!(detect(b"a\x00\x00\x00"), (Encoding::Utf32Le, 0));
    }

    #[test]
    fn unsupported_bom() {
        assert_eq!(detect(b"\x2B\x2F\x76\x38").0, Encoding::Unsupported);
    }

    #[test]
    fn short_input_is_utf8() {
        assert_eq!(detect(b""), (Encoding::Utf8, 0));
        assert_eq!(detect(b"a"), (Encoding::Utf8, 0));
    }
}
