//! Numeric literal values.

use hoist_ast::types::TokenFlags;

/// Compute the value of a numeric literal token from its source text.
///
/// Separators are dropped. Prefixed literals (`0x`, `0b`, `0o`) are folded
/// digit by digit so values beyond `u64` still come out as the nearest `f64`.
/// Malformed text (only possible after a scanner diagnostic) yields `NaN`.
pub fn parse_numeric_literal(text: &str, flags: TokenFlags) -> f64 {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();

    let radix = if flags.contains(TokenFlags::HEX_SPECIFIER) {
        16
    } else if flags.contains(TokenFlags::BINARY_SPECIFIER) {
        2
    } else if flags.contains(TokenFlags::OCTAL_SPECIFIER) {
        8
    } else {
        return cleaned.parse::<f64>().unwrap_or(f64::NAN);
    };

    let digits = cleaned.get(2..).unwrap_or("");
    if digits.is_empty() {
        return f64::NAN;
    }
    digits.chars().fold(0.0, |acc, c| match c.to_digit(radix) {
        Some(d) => acc * radix as f64 + d as f64,
        None => f64::NAN,
    })
}
