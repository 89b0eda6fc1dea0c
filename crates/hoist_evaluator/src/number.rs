//! Number conversions: `Number::toString`, `toFixed`, and string parsing.

/// Format a number the way `String(n)` does.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let (digits, exponent) = shortest_digits(value.abs());
    let k = digits.len() as i32;
    // Position of the decimal point relative to the start of `digits`.
    let n = exponent + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let e = n - 1;
        let exp_sign = if e < 0 { '-' } else { '+' };
        let mantissa = if k == 1 {
            digits.clone()
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        format!("{}e{}{}", mantissa, exp_sign, e.abs())
    };
    format!("{sign}{body}")
}

/// The shortest digit string that round-trips, and the decimal exponent of
/// its first digit.
fn shortest_digits(value: f64) -> (String, i32) {
    let formatted = format!("{value:e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let trimmed = digits.trim_end_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    (digits.to_string(), exponent.parse().unwrap_or(0))
}

/// `Number.prototype.toFixed`. Ties round away from zero.
pub fn to_fixed(value: f64, fraction_digits: usize) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return format_number(value);
    }
    let negative = value < 0.0;
    // Rust prints the exact binary value to the requested precision; the
    // extra digits are enough to decide the rounding by hand.
    let expanded = format!("{:.*}", fraction_digits + 30, value.abs());
    let (int_part, frac_part) = expanded.split_once('.').unwrap_or((expanded.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(fraction_digits))
        .collect();
    if frac_part.as_bytes().get(fraction_digits).is_some_and(|&d| d >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let int_len = kept.len() - fraction_digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if negative {
        out.push('-');
    }
    out.extend(kept[..int_len].iter().map(|&b| b as char));
    if fraction_digits > 0 {
        out.push('.');
        out.extend(kept[int_len..].iter().map(|&b| b as char));
    }
    out
}

/// `Number.prototype.toString(radix)`.
pub fn to_radix_string(value: f64, radix: u32) -> String {
    if radix == 10 || !value.is_finite() {
        return format_number(value);
    }
    let base = f64::from(radix);
    let mut int_part = value.abs().trunc();
    let mut frac_part = value.abs() - int_part;

    let mut digits = Vec::new();
    if int_part == 0.0 {
        digits.push('0');
    }
    while int_part >= 1.0 {
        let digit = (int_part % base) as u32;
        digits.push(char::from_digit(digit, radix).unwrap_or('0'));
        int_part = (int_part / base).trunc();
    }
    digits.reverse();

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.extend(digits);
    if frac_part > 0.0 {
        out.push('.');
        for _ in 0..52 {
            frac_part *= base;
            let digit = frac_part.trunc();
            out.push(char::from_digit(digit as u32, radix).unwrap_or('0'));
            frac_part -= digit;
            if frac_part == 0.0 {
                break;
            }
        }
    }
    out
}

/// `ToUint32`: wrap modulo 2^32.
pub fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// `ToInt32`, used by the bitwise operators.
pub fn to_int32(value: f64) -> i32 {
    to_uint32(value) as i32
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// `Number(string)`: the whole trimmed string must be a numeric literal.
pub fn string_to_number(text: &str) -> f64 {
    let text = text.trim_matches(is_js_whitespace);
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(rest) = text.strip_prefix(prefix) {
            return parse_radix_digits(rest, radix).filter(|(_, used)| *used == rest.len()).map_or(f64::NAN, |(v, _)| v);
        }
    }
    if decimal_literal_len(text) == text.len() {
        text.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Length of the longest prefix of `text` shaped like
/// `[+-]digits[.digits][e[+-]digits]`, or 0 if there is none.
fn decimal_literal_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if mantissa_digits > 0 || j > frac_start {
            mantissa_digits += j - frac_start;
            i = j;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// Accumulate the leading digits valid in `radix`. Returns the value and how
/// many bytes were used, or `None` when there are no digits.
fn parse_radix_digits(text: &str, radix: u32) -> Option<(f64, usize)> {
    let mut value = 0.0;
    let mut used = 0;
    for c in text.chars() {
        match c.to_digit(radix) {
            Some(digit) => {
                value = value * f64::from(radix) + f64::from(digit);
                used += c.len_utf8();
            }
            None => break,
        }
    }
    (used > 0).then_some((value, used))
}

/// `parseInt(text, radix)`.
pub fn parse_int(text: &str, radix: Option<i32>) -> f64 {
    let mut rest = text.trim_start_matches(is_js_whitespace);
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    let mut radix = radix.unwrap_or(0);
    if radix == 0 || radix == 16 {
        if let Some(stripped) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
            rest = stripped;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    match parse_radix_digits(rest, radix as u32) {
        Some((value, _)) => sign * value,
        None => f64::NAN,
    }
}

/// `parseFloat(text)`: the longest numeric prefix.
pub fn parse_float(text: &str) -> f64 {
    let rest = text.trim_start_matches(is_js_whitespace);
    let unsigned = rest.trim_start_matches(['+', '-']);
    if unsigned.starts_with("Infinity") && rest.len() - unsigned.len() <= 1 {
        return if rest.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    let len = decimal_literal_len(rest);
    if len == 0 {
        return f64::NAN;
    }
    rest[..len].parse::<f64>().unwrap_or(f64::NAN)
}
