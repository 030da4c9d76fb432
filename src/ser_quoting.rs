//! Which scalar styles can carry a given string.
//!
//! These checks are purely lexical. Whether a string would be re-read as a
//! number, boolean or null is decided by the implicit resolver before a
//! style is requested.

/// YAML printable set, minus the line breaks other than `\n`.
#[inline]
pub(crate) fn is_printable(c: char) -> bool {
    matches!(
        c as u32,
        0x0A | 0x20..=0x7E | 0x85 | 0xA0..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    ) && c != '\u{FEFF}'
}

/// YAML 1.1 treats NEL, LS and PS as line breaks. They only survive double quoting.
#[inline]
fn is_unicode_break(c: char) -> bool {
    matches!(c, '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Can `c` be written as itself (outside double quotes)?
#[inline]
fn is_writable(c: char, allow_unicode: bool) -> bool {
    is_printable(c) && !is_unicode_break(c) && (allow_unicode || c.is_ascii())
}

/// Returns true if `s` can be emitted as a plain scalar in block context.
pub(crate) fn is_plain_safe(s: &str, allow_unicode: bool) -> bool {
    let bytes = s.as_bytes();
    let (Some(&first), Some(&last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    if first == b' ' || last == b' ' || last == b':' {
        return false;
    }
    if s.starts_with("---") || s.starts_with("...") {
        return false;
    }
    if matches!(
        first,
        b'[' | b']'
            | b'{'
            | b'}'
            | b','
            | b'#'
            | b'&'
            | b'*'
            | b'!'
            | b'|'
            | b'>'
            | b'\''
            | b'"'
            | b'%'
            | b'@'
            | b'`'
    ) {
        return false;
    }
    // `-`, `?` and `:` only start an indicator when a space (or nothing) follows.
    if matches!(first, b'-' | b'?' | b':') && matches!(bytes.get(1), None | Some(b' ')) {
        return false;
    }
    if s.contains(": ") || s.contains(" #") {
        return false;
    }
    s.chars().all(|c| c != '\n' && is_writable(c, allow_unicode))
}

/// Returns true if `s` fits between single quotes on one line.
pub(crate) fn is_single_quote_safe(s: &str, allow_unicode: bool) -> bool {
    s.chars().all(|c| c != '\n' && is_writable(c, allow_unicode))
}

/// Returns true if `s` can be written as a literal block scalar (`|`).
///
/// Rejected: text that starts with a line break or is nothing but breaks,
/// a space right before a break or at the very end, and anything with
/// characters that need escaping.
pub(crate) fn is_literal_safe(s: &str, allow_unicode: bool) -> bool {
    if s.is_empty() || s.starts_with('\n') || s.bytes().all(|b| b == b'\n') {
        return false;
    }
    if s.ends_with(' ') || s.contains(" \n") {
        return false;
    }
    s.chars().all(|c| is_writable(c, allow_unicode))
}

/// Number of spaces that start the first line of a block scalar.
#[inline]
pub(crate) fn first_line_leading_spaces(s: &str) -> usize {
    s.bytes().take_while(|b| *b == b' ').count()
}
