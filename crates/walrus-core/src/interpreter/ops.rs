//! Operator semantics on runtime values.

use std::cmp::Ordering;

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::RuntimeError;
use crate::numeric;
use crate::span::Span;
use crate::value::Value;

type OpResult = Result<Value, RuntimeError>;

/// Most elements a `..` range may produce.
pub const MAX_RANGE_LEN: usize = 1 << 20;

fn mismatch(op: &str, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::type_mismatch(
        format!(
            "`{}` is not supported between `{}` and `{}`",
            op,
            left.type_name(),
            right.type_name()
        ),
        span,
    )
}

pub fn binary(op: BinaryOp, left: Value, right: Value, span: Span) -> OpResult {
    match op {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => arithmetic(op, left, right, span),
        BinaryOp::Equal | BinaryOp::NotEqual => equality(op, &left, &right, span),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            relational(op, &left, &right, span)
        }
        BinaryOp::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        BinaryOp::Range => range(&left, &right, span),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value, span: Span) -> OpResult {
    match (&left, &right) {
        (
            Value::Integer {
                value: a,
                bits: a_bits,
                signed: a_signed,
            },
            Value::Integer {
                value: b,
                bits: b_bits,
                signed: b_signed,
            },
        ) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0 {
                return Err(RuntimeError::DivisionByZero { span });
            }
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            let value = result.ok_or_else(|| RuntimeError::Overflow {
                operator: op.symbol().to_string(),
                span,
            })?;
            let signed = *a_signed || *b_signed || value < 0;
            Ok(Value::Integer {
                value,
                bits: numeric::result_bits(*a_bits, *b_bits, value, signed),
                signed,
            })
        }
        (Value::String(a), b) if op == BinaryOp::Add && b.is_printable() => {
            Ok(Value::String(format!("{}{}", a, b)))
        }
        (a, Value::String(b)) if op == BinaryOp::Add && a.is_printable() => {
            Ok(Value::String(format!("{}{}", a, b)))
        }
        _ => {
            let (Some((a, a_bits)), Some((b, b_bits))) = (as_float(&left), as_float(&right)) else {
                return Err(mismatch(op.symbol(), &left, &right, span));
            };
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0.0 {
                return Err(RuntimeError::DivisionByZero { span });
            }
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                _ => a % b,
            };
            Ok(Value::Float {
                value,
                bits: a_bits.max(b_bits),
            })
        }
    }
}

/// Numeric view for float arithmetic; integers count as the narrowest float.
fn as_float(value: &Value) -> Option<(f64, u8)> {
    match value {
        Value::Float { value, bits } => Some((*value, *bits)),
        Value::Integer { value, .. } => Some((*value as f64, 32)),
        _ => None,
    }
}

/// Numeric view for comparisons.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer { value, .. } => Some(*value as f64),
        Value::Float { value, .. } => Some(*value),
        Value::Character(c) => Some(f64::from(u32::from(*c))),
        _ => None,
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Integer { value: a, .. }, Value::Integer { value: b, .. }) => Some(a.cmp(b)),
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

fn equality(op: BinaryOp, left: &Value, right: &Value, span: Span) -> OpResult {
    let equal = match (left, right) {
        (Value::Null, other) | (other, Value::Null) => matches!(other, Value::Null),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        _ => match compare(left, right) {
            Some(ordering) => ordering == Ordering::Equal,
            None if as_number(left).is_some() && as_number(right).is_some() => false,
            None => return Err(mismatch(op.symbol(), left, right, span)),
        },
    };
    Ok(Value::Boolean(if op == BinaryOp::Equal { equal } else { !equal }))
}

fn relational(op: BinaryOp, left: &Value, right: &Value, span: Span) -> OpResult {
    let (Some(_), Some(_)) = (as_number(left), as_number(right)) else {
        return Err(mismatch(op.symbol(), left, right, span));
    };
    let result = match compare(left, right) {
        Some(ordering) => match op {
            BinaryOp::Less => ordering == Ordering::Less,
            BinaryOp::LessEqual => ordering != Ordering::Greater,
            BinaryOp::Greater => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        },
        // NaN compares false
        None => false,
    };
    Ok(Value::Boolean(result))
}

fn range(left: &Value, right: &Value, span: Span) -> OpResult {
    match (left, right) {
        (
            Value::Integer {
                value: start,
                bits: a_bits,
                ..
            },
            Value::Integer {
                value: end,
                bits: b_bits,
                ..
            },
        ) => {
            let len = end.checked_sub(*start).map_or(u128::MAX, |len| len.max(0) as u128);
            if len > MAX_RANGE_LEN as u128 {
                return Err(RuntimeError::RangeTooLarge {
                    len,
                    limit: MAX_RANGE_LEN,
                    span,
                });
            }

            let bits = (*a_bits).max(*b_bits);
            let items = (*start..*end)
                .map(|value| Value::Integer {
                    value,
                    bits,
                    signed: true,
                })
                .collect();
            Ok(Value::Array(items))
        }
        _ => Err(mismatch("..", left, right, span)),
    }
}

pub fn unary(op: UnaryOp, operand: Value, span: Span) -> OpResult {
    let bad_operand = |expected: &str, found: &Value| {
        RuntimeError::type_mismatch(
            format!(
                "`{}` expects {}, found `{}`",
                op.symbol(),
                expected,
                found.type_name()
            ),
            span,
        )
    };

    match (op, operand) {
        (UnaryOp::Plus, value @ (Value::Integer { .. } | Value::Float { .. })) => Ok(value),
        (UnaryOp::Minus, Value::Integer { value, bits, .. }) => {
            let negated = value.checked_neg().ok_or_else(|| RuntimeError::Overflow {
                operator: "-".into(),
                span,
            })?;
            Ok(Value::Integer {
                value: negated,
                bits: numeric::result_bits(bits, bits, negated, true),
                signed: true,
            })
        }
        (UnaryOp::Minus, Value::Float { value, bits }) => Ok(Value::Float { value: -value, bits }),
        (UnaryOp::Plus | UnaryOp::Minus, other) => Err(bad_operand("a number", &other)),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Not, other) => Err(bad_operand("a `bool`", &other)),
        (
            UnaryOp::Increment | UnaryOp::Decrement,
            Value::Integer {
                value,
                bits,
                signed,
            },
        ) => {
            let stepped = if op == UnaryOp::Increment {
                value.checked_add(1)
            } else {
                value.checked_sub(1)
            };
            let stepped = stepped.ok_or_else(|| RuntimeError::Overflow {
                operator: op.symbol().to_string(),
                span,
            })?;
            let signed = signed || stepped < 0;
            Ok(Value::Integer {
                value: stepped,
                bits: numeric::result_bits(bits, bits, stepped, signed),
                signed,
            })
        }
        (UnaryOp::Increment | UnaryOp::Decrement, other) => Err(bad_operand("an integer", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::default()
    }

    fn int(value: i128) -> Value {
        Value::int(value)
    }

    #[test]
    fn test_integer_arithmetic_widens() {
        let result = binary(BinaryOp::Add, int(100), int(100), span()).unwrap();
        assert_eq!(result.type_name(), "i16");
        assert_eq!(result, int(200));
    }

    #[test]
    fn test_integer_division_truncates() {
        assert_eq!(binary(BinaryOp::Divide, int(7), int(2), span()).unwrap(), int(3));
        assert_eq!(binary(BinaryOp::Modulo, int(7), int(2), span()).unwrap(), int(1));
    }

    #[test]
    fn test_division_by_zero() {
        for op in [BinaryOp::Divide, BinaryOp::Modulo] {
            let err = binary(op, int(5), int(0), span()).unwrap_err();
            assert!(matches!(err, RuntimeError::DivisionByZero { .. }));
        }
        let float_zero = Value::Float { value: 0.0, bits: 32 };
        assert!(binary(BinaryOp::Divide, int(1), float_zero, span()).is_err());
    }

    #[test]
    fn test_overflow_at_128_bits() {
        let err = binary(BinaryOp::Multiply, int(i128::MAX), int(2), span()).unwrap_err();
        assert!(matches!(err, RuntimeError::Overflow { .. }));
    }

    #[test]
    fn test_mixed_float_arithmetic() {
        let half = Value::Float { value: 0.5, bits: 32 };
        let result = binary(BinaryOp::Add, int(1), half, span()).unwrap();
        assert_eq!(result, Value::Float { value: 1.5, bits: 32 });
    }

    #[test]
    fn test_string_concatenation() {
        let result = binary(BinaryOp::Add, Value::String("n = ".into()), int(4), span()).unwrap();
        assert_eq!(result, Value::String("n = 4".into()));
        let err = binary(BinaryOp::Subtract, Value::String("a".into()), int(1), span()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"`-` is not supported between `str` and `i8`");
    }

    #[test]
    fn test_comparisons() {
        let yes = Value::Boolean(true);
        assert_eq!(binary(BinaryOp::Less, int(1), int(2), span()).unwrap(), yes);
        assert_eq!(binary(BinaryOp::Equal, int(2), Value::Float { value: 2.0, bits: 32 }, span()).unwrap(), yes);
        assert_eq!(binary(BinaryOp::Greater, Value::Character('b'), Value::Character('a'), span()).unwrap(), yes);
        assert_eq!(binary(BinaryOp::Equal, Value::String("a".into()), Value::String("a".into()), span()).unwrap(), yes);
        assert_eq!(binary(BinaryOp::NotEqual, Value::Null, int(0), span()).unwrap(), yes);
        assert!(binary(BinaryOp::Less, Value::String("a".into()), int(1), span()).is_err());
        assert!(binary(BinaryOp::Equal, Value::Boolean(true), int(1), span()).is_err());
    }

    #[test]
    fn test_logical_uses_truthiness() {
        let result = binary(BinaryOp::And, int(1), Value::String("x".into()), span()).unwrap();
        assert_eq!(result, Value::Boolean(true));
        let result = binary(BinaryOp::Or, Value::Null, int(0), span()).unwrap();
        assert_eq!(result, Value::Boolean(false));
    }

    #[test]
    fn test_range() {
        let result = binary(BinaryOp::Range, int(0), int(3), span()).unwrap();
        assert_eq!(result.to_string(), "[0, 1, 2]");
        let empty = binary(BinaryOp::Range, int(3), int(0), span()).unwrap();
        assert_eq!(empty, Value::Array(Vec::new()));
    }

    #[test]
    fn test_range_limit() {
        let len = MAX_RANGE_LEN as i128;
        let full = binary(BinaryOp::Range, int(1), int(len + 1), span()).unwrap();
        assert!(matches!(full, Value::Array(ref items) if items.len() == MAX_RANGE_LEN));

        let err = binary(BinaryOp::Range, int(0), int(len + 1), span()).unwrap_err();
        assert_eq!(err.code(), "E218");
        insta::assert_snapshot!(err.to_string(), @"range of 1048577 elements exceeds the limit of 1048576");

        let err = binary(BinaryOp::Range, int(i128::MIN), int(i128::MAX), span()).unwrap_err();
        assert!(matches!(err, RuntimeError::RangeTooLarge { len: u128::MAX, .. }));
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Minus, int(5), span()).unwrap(), int(-5));
        assert_eq!(unary(UnaryOp::Not, Value::Boolean(false), span()).unwrap(), Value::Boolean(true));
        assert_eq!(unary(UnaryOp::Increment, int(1), span()).unwrap(), int(2));
        assert!(unary(UnaryOp::Not, int(1), span()).is_err());
        let err = unary(UnaryOp::Increment, Value::Float { value: 1.0, bits: 32 }, span()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"`++` expects an integer, found `f32`");
    }
}
