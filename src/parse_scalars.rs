//! Numeric and boolean text parsing used by the built-in tag conversions.
//!
//! The parsers accept exactly one number: trailing text, an empty digit run or
//! a value outside the 64-bit range is reported back so the caller can decide
//! on the NA fallback.

/// Why an integer text could not be converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IntError {
    /// Not an integer in the requested base (including trailing garbage).
    Invalid,
    /// Well formed but outside `i64`.
    Overflow,
}

/// Parse a YAML 1.1 boolean literal.
///
/// Accepted TRUE literals (case-insensitive): "y", "yes", "true", "on"
/// Accepted FALSE literals (case-insensitive): "n", "no", "false", "off"
pub(crate) fn parse_yaml11_bool(s: &str) -> Option<bool> {
    let t = s.trim();
    if ["true", "yes", "y", "on"].iter().any(|v| t.eq_ignore_ascii_case(v)) {
        Some(true)
    } else if ["false", "no", "n", "off"].iter().any(|v| t.eq_ignore_ascii_case(v)) {
        Some(false)
    } else {
        None
    }
}

fn digit_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u32),
        b'a'..=b'f' => Some(10 + (b - b'a') as u32),
        b'A'..=b'F' => Some(10 + (b - b'A') as u32),
        _ => None,
    }
}

/// Parse a signed integer in `radix` (8, 10 or 16). Underscores between
/// digits are ignored; base 16 accepts an optional `0x` prefix.
pub(crate) fn parse_int(text: &str, radix: u32) -> Result<i64, IntError> {
    let t = text.trim_start();
    let (negative, rest) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let digits = if radix == 16 {
        rest.strip_prefix("0x")
            .or_else(|| rest.strip_prefix("0X"))
            .unwrap_or(rest)
    } else {
        rest
    };

    let mut magnitude: u128 = 0;
    let mut saw_digit = false;
    let mut overflow = false;
    for b in digits.bytes() {
        if b == b'_' {
            continue;
        }
        let d = digit_value(b).filter(|d| *d < radix).ok_or(IntError::Invalid)?;
        saw_digit = true;
        match magnitude
            .checked_mul(radix as u128)
            .and_then(|m| m.checked_add(d as u128))
        {
            Some(m) => magnitude = m,
            None => overflow = true,
        }
    }
    if !saw_digit {
        return Err(IntError::Invalid);
    }
    if overflow || magnitude > i64::MAX as u128 + 1 {
        return Err(IntError::Overflow);
    }
    let signed = if negative {
        -(magnitude as i128)
    } else {
        magnitude as i128
    };
    i64::try_from(signed).map_err(|_| IntError::Overflow)
}

/// Parse a decimal floating-point number. Underscores are ignored.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let t = text.trim_start();
    if t.is_empty() {
        return None;
    }
    if t.contains('_') {
        t.replace('_', "").parse().ok()
    } else {
        t.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_in_each_base() {
        assert_eq!(parse_int("42", 10), Ok(42));
        assert_eq!(parse_int("-1_000", 10), Ok(-1000));
        assert_eq!(parse_int("0x1F", 16), Ok(31));
        assert_eq!(parse_int("-0xff", 16), Ok(-255));
        assert_eq!(parse_int("017", 8), Ok(15));
        assert_eq!(parse_int("9223372036854775807", 10), Ok(i64::MAX));
        assert_eq!(parse_int("-9223372036854775808", 10), Ok(i64::MIN));
    }

    #[test]
    fn integer_failures() {
        assert_eq!(parse_int("3abc", 10), Err(IntError::Invalid));
        assert_eq!(parse_int("", 10), Err(IntError::Invalid));
        assert_eq!(parse_int("-", 10), Err(IntError::Invalid));
        assert_eq!(parse_int("08", 8), Err(IntError::Invalid));
        assert_eq!(parse_int("9223372036854775808", 10), Err(IntError::Overflow));
        assert_eq!(
            parse_int("99999999999999999999999999999999999999999", 10),
            Err(IntError::Overflow)
        );
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("1.5"), Some(1.5));
        assert_eq!(parse_float("-.5"), Some(-0.5));
        assert_eq!(parse_float("1_000.25"), Some(1000.25));
        assert_eq!(parse_float("1.0e+07"), Some(1.0e7));
        assert_eq!(parse_float("3."), Some(3.0));
        assert_eq!(parse_float("1.5x"), None);
        assert_eq!(parse_float(""), None);
    }

    #[test]
    fn booleans() {
        assert_eq!(parse_yaml11_bool("Yes"), Some(true));
        assert_eq!(parse_yaml11_bool("off"), Some(false));
        assert_eq!(parse_yaml11_bool("maybe"), None);
    }
}
