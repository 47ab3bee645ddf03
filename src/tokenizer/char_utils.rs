#[inline]
pub(crate) fn is_break(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    b == b' '
}

#[inline]
pub(crate) fn is_white(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

#[inline]
pub(crate) fn is_white_or_break(b: u8) -> bool {
    is_white(b) || is_break(b)
}

#[inline]
pub(crate) fn is_flow_indicator(b: u8) -> bool {
    matches!(b, b',' | b'[' | b']' | b'{' | b'}')
}

#[inline]
pub(crate) fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline]
pub(crate) fn is_directive_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Characters permitted in tag shorthands and suffixes. The YAML URI
/// character class, extended with `-` and `%` which occur in every
/// real-world tag.
#[inline]
pub(crate) fn is_uri_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'#' | b';'
                | b'/'
                | b'?'
                | b':'
                | b'@'
                | b'&'
                | b'='
                | b'+'
                | b'$'
                | b','
                | b'_'
                | b'.'
                | b'~'
                | b'*'
                | b'\''
                | b'('
                | b')'
                | b'-'
                | b'%'
        )
}

#[inline]
pub(crate) fn is_anchor_char(b: u8) -> bool {
    !is_white_or_break(b) && !is_flow_indicator(b)
}

#[inline]
pub(crate) fn hex_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some(u32::from(b - b'0')),
        b'a'..=b'f' => Some(u32::from(b - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(b - b'A') + 10),
        _ => None,
    }
}
