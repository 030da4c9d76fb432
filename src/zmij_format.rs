//! Float text for the encoder: the shortest round-trip digits from `zmij`,
//! cut to the requested number of significant digits and laid out so the
//! result is always a valid YAML 1.1 float (`1.0`, `1.5e-07`, never `1` or `4e-6`).

/// Sign, significant digits (no leading or trailing zeros) and the decimal
/// exponent of the first digit: `1.25e3` is `("125", 3)`.
#[derive(Debug, PartialEq, Eq)]
struct Decimal {
    negative: bool,
    digits: String,
    exponent: i32,
}

/// Split any of `100.0`, `0.001`, `4e-6`, `1.5E+21`, `-2` into a [`Decimal`].
fn parse_decimal(text: &str) -> Decimal {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (mantissa, exp10) = match rest.find(['e', 'E']) {
        Some(at) => (&rest[..at], rest[at + 1..].parse::<i32>().unwrap_or(0)),
        None => (rest, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all: String = int_part.chars().chain(frac_part.chars()).collect();
    let leading = all.bytes().take_while(|b| *b == b'0').count();
    let digits = all[leading..].trim_end_matches('0').to_owned();
    Decimal {
        negative,
        exponent: int_part.len() as i32 - 1 - leading as i32 + exp10,
        digits,
    }
}

/// Format a float with at most `precision` significant digits.
pub(crate) fn push_float_string(target: &mut String, f: f64, precision: usize) {
    if f.is_nan() {
        target.push_str(".nan");
        return;
    }
    if f.is_infinite() {
        target.push_str(if f.is_sign_positive() { ".inf" } else { "-.inf" });
        return;
    }
    if f == 0.0 {
        target.push_str(if f.is_sign_negative() { "-0.0" } else { "0.0" });
        return;
    }

    let mut buf = zmij::Buffer::new();
    let mut decimal = parse_decimal(buf.format_finite(f));
    if decimal.digits.len() > precision {
        decimal = parse_decimal(&format!("{:.*e}", precision.saturating_sub(1), f));
    }

    if decimal.negative {
        target.push('-');
    }
    let digits = decimal.digits.as_str();
    let exponent = decimal.exponent;
    if exponent < -4 || exponent >= precision as i32 {
        target.push_str(&digits[..1]);
        target.push('.');
        target.push_str(if digits.len() > 1 { &digits[1..] } else { "0" });
        target.push('e');
        target.push(if exponent < 0 { '-' } else { '+' });
        let magnitude = exponent.unsigned_abs();
        if magnitude < 10 {
            target.push('0');
        }
        target.push_str(&magnitude.to_string());
    } else if exponent >= 0 {
        let int_len = exponent as usize + 1;
        if digits.len() > int_len {
            target.push_str(&digits[..int_len]);
            target.push('.');
            target.push_str(&digits[int_len..]);
        } else {
            target.push_str(digits);
            target.extend(std::iter::repeat_n('0', int_len - digits.len()));
            target.push_str(".0");
        }
    } else {
        target.push_str("0.");
        target.extend(std::iter::repeat_n('0', (-exponent - 1) as usize));
        target.push_str(digits);
    }
}
