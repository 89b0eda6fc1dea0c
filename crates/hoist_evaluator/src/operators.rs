//! Binary operators on evaluated operands.

use crate::error::RuntimeError;
use crate::inspect;
use crate::number::{to_int32, to_uint32};
use crate::value::{array_index, check_string_length, Value};
use hoist_ast::SyntaxKind;
use std::cmp::Ordering;

/// Apply a non-short-circuiting binary operator.
pub fn binary<'a>(operator: SyntaxKind, left: &Value<'a>, right: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    let value = match operator {
        SyntaxKind::PlusToken => add(left, right)?,
        SyntaxKind::MinusToken => Value::Number(left.to_number() - right.to_number()),
        SyntaxKind::AsteriskToken => Value::Number(left.to_number() * right.to_number()),
        SyntaxKind::SlashToken => Value::Number(left.to_number() / right.to_number()),
        SyntaxKind::PercentToken => Value::Number(left.to_number() % right.to_number()),
        SyntaxKind::AsteriskAsteriskToken => Value::Number(power(left.to_number(), right.to_number())),

        SyntaxKind::EqualsEqualsEqualsToken => Value::Boolean(left.strict_equals(right)),
        SyntaxKind::ExclamationEqualsEqualsToken => Value::Boolean(!left.strict_equals(right)),
        SyntaxKind::EqualsEqualsToken => Value::Boolean(left.loose_equals(right)),
        SyntaxKind::ExclamationEqualsToken => Value::Boolean(!left.loose_equals(right)),

        SyntaxKind::LessThanToken => Value::Boolean(compare(left, right) == Some(Ordering::Less)),
        SyntaxKind::GreaterThanToken => Value::Boolean(compare(left, right) == Some(Ordering::Greater)),
        SyntaxKind::LessThanEqualsToken => {
            Value::Boolean(matches!(compare(left, right), Some(Ordering::Less | Ordering::Equal)))
        }
        SyntaxKind::GreaterThanEqualsToken => {
            Value::Boolean(matches!(compare(left, right), Some(Ordering::Greater | Ordering::Equal)))
        }

        SyntaxKind::AmpersandToken => int32_op(left, right, |a, b| a & b),
        SyntaxKind::BarToken => int32_op(left, right, |a, b| a | b),
        SyntaxKind::CaretToken => int32_op(left, right, |a, b| a ^ b),
        SyntaxKind::LessThanLessThanToken => {
            int32_op(left, right, |a, b| a.wrapping_shl(b as u32 & 31))
        }
        SyntaxKind::GreaterThanGreaterThanToken => {
            int32_op(left, right, |a, b| a.wrapping_shr(b as u32 & 31))
        }
        SyntaxKind::GreaterThanGreaterThanGreaterThanToken => {
            let shift = to_uint32(right.to_number()) & 31;
            Value::Number(f64::from(to_uint32(left.to_number()) >> shift))
        }

        SyntaxKind::InKeyword => Value::Boolean(has_property(left, right)?),

        other => {
            let text = other.punctuation_text().unwrap_or("?");
            return Err(RuntimeError::Unsupported(format!("operator '{text}'")));
        }
    };
    Ok(value)
}

/// `+`: string concatenation when either side is (or converts to) a string.
fn add<'a>(left: &Value<'a>, right: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    let left = to_primitive(left);
    let right = to_primitive(right);
    let (a, b) = match (&left, &right) {
        (Value::String(a), b) => (a.to_string(), b.to_js_string()),
        (a, Value::String(b)) => (a.to_js_string(), b.to_string()),
        _ => return Ok(Value::Number(left.to_number() + right.to_number())),
    };
    check_string_length(a.chars().count() + b.chars().count())?;
    Ok(Value::from(a + &b))
}

/// Records convert to their string form; primitives stay as they are.
fn to_primitive<'a>(value: &Value<'a>) -> Value<'a> {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Function(_) => Value::from(value.to_js_string()),
        other => other.clone(),
    }
}

fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}

/// Relational comparison. `None` when either side is `NaN`.
fn compare(left: &Value<'_>, right: &Value<'_>) -> Option<Ordering> {
    let left = to_primitive(left);
    let right = to_primitive(right);
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

fn int32_op<'a>(left: &Value<'a>, right: &Value<'a>, op: impl Fn(i32, i32) -> i32) -> Value<'a> {
    Value::Number(f64::from(op(to_int32(left.to_number()), to_int32(right.to_number()))))
}

/// `key in object`.
fn has_property(key: &Value<'_>, target: &Value<'_>) -> Result<bool, RuntimeError> {
    let key = key.to_property_key();
    match target {
        Value::Object(object) => Ok(object.borrow().contains_key(&key)),
        Value::Array(array) => {
            let array = array.borrow();
            Ok(&*key == "length" || array_index(&key).is_some_and(|i| i < array.len()))
        }
        Value::Function(function) => Ok(function.properties().contains_key(&key)),
        other => Err(RuntimeError::Type(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            key,
            inspect::inspect(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value<'static> {
        Value::from(n)
    }

    fn eval(operator: SyntaxKind, left: Value<'static>, right: Value<'static>) -> Value<'static> {
        binary(operator, &left, &right).unwrap()
    }

    #[test]
    fn test_addition_and_concatenation() {
        assert_eq!(eval(SyntaxKind::PlusToken, num(2.0), num(3.0)).to_number(), 5.0);
        assert_eq!(eval(SyntaxKind::PlusToken, Value::from("a"), num(1.0)).to_js_string(), "a1");
        assert_eq!(eval(SyntaxKind::PlusToken, num(1.0), Value::from("2")).to_js_string(), "12");
        let array = Value::new_array(vec![num(1.0), num(2.0)]);
        assert_eq!(eval(SyntaxKind::PlusToken, array, Value::from("!")).to_js_string(), "1,2!");
        assert!(eval(SyntaxKind::PlusToken, Value::Undefined, num(1.0)).to_number().is_nan());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(SyntaxKind::PercentToken, num(-7.0), num(3.0)).to_number(), -1.0);
        assert_eq!(eval(SyntaxKind::AsteriskAsteriskToken, num(2.0), num(10.0)).to_number(), 1024.0);
        assert!(eval(SyntaxKind::AsteriskAsteriskToken, num(1.0), num(f64::NAN)).to_number().is_nan());
        assert_eq!(eval(SyntaxKind::SlashToken, num(1.0), num(0.0)).to_number(), f64::INFINITY);
        assert_eq!(eval(SyntaxKind::MinusToken, Value::from("10"), num(4.0)).to_number(), 6.0);
    }

    #[test]
    fn test_comparison() {
        assert!(eval(SyntaxKind::LessThanToken, num(1.0), num(2.0)).is_truthy());
        assert!(eval(SyntaxKind::LessThanToken, Value::from("apple"), Value::from("banana")).is_truthy());
        assert!(eval(SyntaxKind::GreaterThanToken, Value::from("10"), num(9.0)).is_truthy());
        assert!(!eval(SyntaxKind::LessThanEqualsToken, num(f64::NAN), num(1.0)).is_truthy());
        assert!(eval(SyntaxKind::GreaterThanEqualsToken, num(2.0), num(2.0)).is_truthy());
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(eval(SyntaxKind::AmpersandToken, num(6.0), num(3.0)).to_number(), 2.0);
        assert_eq!(eval(SyntaxKind::BarToken, num(4.0), num(1.0)).to_number(), 5.0);
        assert_eq!(eval(SyntaxKind::LessThanLessThanToken, num(1.0), num(33.0)).to_number(), 2.0);
        assert_eq!(eval(SyntaxKind::GreaterThanGreaterThanToken, num(-8.0), num(1.0)).to_number(), -4.0);
        assert_eq!(
            eval(SyntaxKind::GreaterThanGreaterThanGreaterThanToken, num(-1.0), num(0.0)).to_number(),
            4_294_967_295.0
        );
    }

    #[test]
    fn test_in_operator() {
        let array = Value::new_array(vec![num(1.0)]);
        assert!(eval(SyntaxKind::InKeyword, num(0.0), array.clone()).is_truthy());
        assert!(!eval(SyntaxKind::InKeyword, num(1.0), array).is_truthy());
        let err = binary(SyntaxKind::InKeyword, &Value::from("a"), &Value::from("abc")).unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
