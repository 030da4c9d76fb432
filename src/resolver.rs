//! Implicit tag resolution for plain scalars (YAML 1.1 types).
//!
//! The resolver looks only at the text. Quoting is decided upstream: quoted
//! scalars never reach it, while plain and block scalars do.

use crate::tags;

/// Decide the implicit tag id of a plain scalar.
///
/// Precedence: null, booleans, NA sentinels, merge/value keys, special
/// floats, integers (hex, octal, decimal, sexagesimal), floats (fixed,
/// exponent, sexagesimal), timestamps, and finally `str`.
pub fn resolve_implicit_tag(text: &str) -> &'static str {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return tags::NULL,
        "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            return tags::BOOL_YES;
        }
        "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            return tags::BOOL_NO;
        }
        ".na" => return tags::BOOL_NA,
        ".na.real" => return tags::FLOAT_NA,
        ".na.integer" => return tags::INT_NA,
        ".na.character" => return tags::STR_NA,
        "<<" => return tags::MERGE,
        "=" => return tags::DEFAULT,
        _ => {}
    }

    let (sign, unsigned) = split_sign(text);
    if unsigned.eq_ignore_ascii_case(".inf") {
        return if sign == Some(b'-') {
            tags::FLOAT_NEGINF
        } else {
            tags::FLOAT_INF
        };
    }
    if sign.is_none() && text.eq_ignore_ascii_case(".nan") {
        return tags::FLOAT_NAN;
    }

    let bytes = unsigned.as_bytes();
    if is_hex(bytes) {
        tags::INT_HEX
    } else if is_octal(bytes) {
        tags::INT_OCT
    } else if is_decimal(bytes) {
        tags::INT
    } else if is_sexagesimal_int(bytes) {
        tags::INT_BASE60
    } else if is_fixed_float(bytes) {
        tags::FLOAT_FIX
    } else if is_exp_float(bytes) {
        tags::FLOAT_EXP
    } else if is_sexagesimal_float(bytes) {
        tags::FLOAT_BASE60
    } else if sign.is_none() {
        timestamp_tag(bytes).unwrap_or(tags::STR)
    } else {
        tags::STR
    }
}

fn split_sign(text: &str) -> (Option<u8>, &str) {
    match text.as_bytes().first() {
        Some(b @ (b'-' | b'+')) => (Some(*b), &text[1..]),
        _ => (None, text),
    }
}

/// Byte cursor over a candidate scalar.
struct Scan<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scan<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_any(&mut self, set: &[u8]) -> bool {
        match self.peek() {
            Some(b) if set.contains(&b) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume bytes matching `pred`; returns how many.
    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Consume between `min` and `max` ASCII digits.
    fn digits(&mut self, min: usize, max: usize) -> bool {
        let start = self.pos;
        while self.pos - start < max && self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start >= min
    }
}

fn digit_or_underscore(b: u8) -> bool {
    b.is_ascii_digit() || b == b'_'
}

// 0x[0-9a-fA-F_]+
fn is_hex(bytes: &[u8]) -> bool {
    match bytes {
        [b'0', b'x', rest @ ..] => {
            !rest.is_empty() && rest.iter().all(|b| b.is_ascii_hexdigit() || *b == b'_')
        }
        _ => false,
    }
}

// 0[0-7_]+
fn is_octal(bytes: &[u8]) -> bool {
    match bytes {
        [b'0', rest @ ..] => {
            !rest.is_empty() && rest.iter().all(|b| (b'0'..=b'7').contains(b) || *b == b'_')
        }
        _ => false,
    }
}

// 0|[1-9][0-9_]*
fn is_decimal(bytes: &[u8]) -> bool {
    match bytes {
        [b'0'] => true,
        [b'1'..=b'9', rest @ ..] => rest.iter().all(|b| digit_or_underscore(*b)),
        _ => false,
    }
}

// [1-9][0-9_]*(:[0-5]?[0-9])+
fn is_sexagesimal_int(bytes: &[u8]) -> bool {
    let mut scan = Scan::new(bytes);
    if !scan.peek().is_some_and(|b| (b'1'..=b'9').contains(&b)) {
        return false;
    }
    scan.eat_while(digit_or_underscore);
    sexagesimal_groups(&mut scan) && scan.done()
}

// [0-9][0-9_]*(:[0-5]?[0-9])+\.[0-9_]*
fn is_sexagesimal_float(bytes: &[u8]) -> bool {
    let mut scan = Scan::new(bytes);
    if !scan.peek().is_some_and(|b| b.is_ascii_digit()) {
        return false;
    }
    scan.eat_while(digit_or_underscore);
    if !sexagesimal_groups(&mut scan) || !scan.eat(b'.') {
        return false;
    }
    scan.eat_while(digit_or_underscore);
    scan.done()
}

fn sexagesimal_groups(scan: &mut Scan<'_>) -> bool {
    let mut groups = 0;
    while scan.eat(b':') {
        let first = scan.eat_while(|b| b.is_ascii_digit());
        let group = &scan.bytes[scan.pos - first..scan.pos];
        let valid = match group {
            [d] => d.is_ascii_digit(),
            [d, _] => (b'0'..=b'5').contains(d),
            _ => false,
        };
        if !valid {
            return false;
        }
        groups += 1;
    }
    groups > 0
}

// ([0-9][0-9_]*)?\.[0-9_]*  with at least one digit
fn is_fixed_float(bytes: &[u8]) -> bool {
    let mut scan = Scan::new(bytes);
    let mut digits = 0;
    if scan.peek().is_some_and(|b| b.is_ascii_digit()) {
        digits += scan.eat_while(digit_or_underscore);
    }
    if !scan.eat(b'.') {
        return false;
    }
    digits += scan.eat_while(|b| b.is_ascii_digit());
    scan.eat_while(digit_or_underscore);
    digits > 0 && scan.done()
}

// ([0-9][0-9_]*)?(\.[0-9_]*)?[eE][-+]?[0-9]+  with at least one mantissa digit
fn is_exp_float(bytes: &[u8]) -> bool {
    let mut scan = Scan::new(bytes);
    let mut digits = 0;
    if scan.peek().is_some_and(|b| b.is_ascii_digit()) {
        digits += scan.eat_while(digit_or_underscore);
    }
    if scan.eat(b'.') {
        digits += scan.eat_while(|b| b.is_ascii_digit());
        scan.eat_while(digit_or_underscore);
    }
    if digits == 0 || !scan.eat_any(b"eE") {
        return false;
    }
    scan.eat_any(b"-+");
    scan.eat_while(|b| b.is_ascii_digit()) > 0 && scan.done()
}

fn timestamp_tag(bytes: &[u8]) -> Option<&'static str> {
    let mut scan = Scan::new(bytes);
    // [0-9]{4}-[0-9]{2}-[0-9]{2}
    if !(scan.digits(4, 4) && scan.eat(b'-')) {
        return None;
    }
    let after_year = scan.pos;
    if scan.digits(2, 2) && scan.eat(b'-') && scan.digits(2, 2) && scan.done() {
        return Some(tags::TIMESTAMP_YMD);
    }

    // [0-9]{4}-[0-9]{1,2}-[0-9]{1,2}([Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(\.[0-9]*)?
    scan.pos = after_year;
    if !(scan.digits(1, 2) && scan.eat(b'-') && scan.digits(1, 2)) {
        return None;
    }
    let tag = if scan.eat_any(b"Tt") {
        tags::TIMESTAMP_ISO8601
    } else if scan.eat_while(|b| b == b' ' || b == b'\t') > 0 {
        tags::TIMESTAMP_SPACED
    } else {
        return None;
    };
    if !(scan.digits(1, 2)
        && scan.eat(b':')
        && scan.digits(2, 2)
        && scan.eat(b':')
        && scan.digits(2, 2))
    {
        return None;
    }
    if scan.eat(b'.') {
        scan.eat_while(|b| b.is_ascii_digit());
    }
    if tag == tags::TIMESTAMP_SPACED {
        scan.eat_while(|b| b == b' ' || b == b'\t');
    }
    // (Z|[-+][0-9]{1,2}(:[0-9]{2})?)?
    if scan.done() || (scan.eat(b'Z') && scan.done()) {
        return Some(tag);
    }
    let offset = scan.eat_any(b"-+")
        && scan.digits(1, 2)
        && (scan.done() || (scan.eat(b':') && scan.digits(2, 2) && scan.done()));
    offset.then_some(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(text: &str) -> &'static str {
        resolve_implicit_tag(text)
    }

    #[test]
    fn nulls_and_booleans() {
        for text in ["", "~", "null", "Null", "NULL"] {
            assert_eq!(tag(text), "null", "{text:?}");
        }
        for text in ["yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON"] {
            assert_eq!(tag(text), "bool#yes", "{text:?}");
        }
        for text in ["no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF"] {
            assert_eq!(tag(text), "bool#no", "{text:?}");
        }
        assert_eq!(tag("nULL"), "str");
        assert_eq!(tag("yEs"), "str");
    }

    #[test]
    fn na_family() {
        assert_eq!(tag(".na"), "bool#na");
        assert_eq!(tag(".na.real"), "float#na");
        assert_eq!(tag(".na.integer"), "int#na");
        assert_eq!(tag(".na.character"), "str#na");
        assert_eq!(tag(".na.other"), "str");
    }

    #[test]
    fn integers_take_precedence_over_floats() {
        assert_eq!(tag("0"), "int");
        assert_eq!(tag("-42"), "int");
        assert_eq!(tag("+1_000"), "int");
        assert_eq!(tag("0x1F"), "int#hex");
        assert_eq!(tag("-0x_ff"), "int#hex");
        assert_eq!(tag("017"), "int#oct");
        assert_eq!(tag("08"), "str");
        assert_eq!(tag("190:20:30"), "int#base60");
        assert_eq!(tag("0x"), "str");
    }

    #[test]
    fn floats() {
        assert_eq!(tag("1.5"), "float#fix");
        assert_eq!(tag("-.5"), "float#fix");
        assert_eq!(tag("3."), "float#fix");
        assert_eq!(tag("."), "str");
        assert_eq!(tag("1.0e+07"), "float#exp");
        assert_eq!(tag("1e5"), "float#exp");
        assert_eq!(tag("e5"), "str");
        assert_eq!(tag("1.5e"), "str");
        assert_eq!(tag("190:20:30.15"), "float#base60");
        assert_eq!(tag(".inf"), "float#inf");
        assert_eq!(tag("+.INF"), "float#inf");
        assert_eq!(tag("-.Inf"), "float#neginf");
        assert_eq!(tag(".NaN"), "float#nan");
        assert_eq!(tag("-.nan"), "str");
    }

    #[test]
    fn timestamps() {
        assert_eq!(tag("2001-12-14"), "timestamp#ymd");
        assert_eq!(tag("2001-12-14t21:59:43.10-05:00"), "timestamp#iso8601");
        assert_eq!(tag("2001-12-14T21:59:43Z"), "timestamp#iso8601");
        assert_eq!(tag("2001-12-14 21:59:43.10 -5"), "timestamp#spaced");
        assert_eq!(tag("2001-12-14 21:59:43.10"), "timestamp#spaced");
        assert_eq!(tag("2001-12-1x"), "str");
    }

    #[test]
    fn merge_default_and_strings() {
        assert_eq!(tag("<<"), "merge");
        assert_eq!(tag("="), "default");
        assert_eq!(tag("<<<"), "str");
        assert_eq!(tag("hello"), "str");
        assert_eq!(tag("3abc"), "str");
    }

    #[test]
    fn resolution_is_repeatable() {
        for text in ["", "12", "1.5e3", "yes", "x", ".na.real", "2001-12-14"] {
            assert_eq!(tag(text), tag(text));
        }
    }
}
