//! Operator dispatch for binary and unary expressions
//!
//! Binary operators are looked up in a static table keyed by the left operand's kind and
//! the operator. `==` and `!=` are resolved before the table: operands of differing kinds
//! simply compare unequal.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::error::{Error, Result};
use crate::parser::{BinaryOp, UnaryOp};
use crate::runtime::value::{Kind, Value};

/// Implementation of one `(kind, operator)` table entry; both operands share `kind`
type BinaryFn = fn(&Value, &Value) -> Result<Value>;

lazy_static! {
    static ref BINARY_OPS: HashMap<(Kind, BinaryOp), BinaryFn> = {
        let mut table: HashMap<(Kind, BinaryOp), BinaryFn> = HashMap::new();

        // Integer arithmetic
        table.insert((Kind::Integer, BinaryOp::Add), int_add);
        table.insert((Kind::Integer, BinaryOp::Sub), int_sub);
        table.insert((Kind::Integer, BinaryOp::Mul), int_mul);
        table.insert((Kind::Integer, BinaryOp::Div), int_div);
        // Integer comparison
        table.insert((Kind::Integer, BinaryOp::Eq), |a, b| Ok(Value::Bool(a.as_int()? == b.as_int()?)));
        table.insert((Kind::Integer, BinaryOp::NotEq), |a, b| Ok(Value::Bool(a.as_int()? != b.as_int()?)));
        table.insert((Kind::Integer, BinaryOp::Lt), |a, b| Ok(Value::Bool(a.as_int()? < b.as_int()?)));
        table.insert((Kind::Integer, BinaryOp::LtEq), |a, b| Ok(Value::Bool(a.as_int()? <= b.as_int()?)));
        table.insert((Kind::Integer, BinaryOp::Gt), |a, b| Ok(Value::Bool(a.as_int()? > b.as_int()?)));
        table.insert((Kind::Integer, BinaryOp::GtEq), |a, b| Ok(Value::Bool(a.as_int()? >= b.as_int()?)));

        // Boolean logic; both operands are already evaluated, there is no short circuit
        table.insert((Kind::Boolean, BinaryOp::And), |a, b| Ok(Value::Bool(a.as_bool()? & b.as_bool()?)));
        table.insert((Kind::Boolean, BinaryOp::Or), |a, b| Ok(Value::Bool(a.as_bool()? | b.as_bool()?)));
        table.insert((Kind::Boolean, BinaryOp::Eq), |a, b| Ok(Value::Bool(a.as_bool()? == b.as_bool()?)));
        table.insert((Kind::Boolean, BinaryOp::NotEq), |a, b| Ok(Value::Bool(a.as_bool()? != b.as_bool()?)));

        // Strings
        table.insert((Kind::String, BinaryOp::Add), |a, b| {
            let mut joined = a.as_string()?.to_string();
            joined.push_str(b.as_string()?);
            Ok(Value::String(joined))
        });
        table.insert((Kind::String, BinaryOp::Eq), |a, b| Ok(Value::Bool(a.as_string()? == b.as_string()?)));
        table.insert((Kind::String, BinaryOp::NotEq), |a, b| Ok(Value::Bool(a.as_string()? != b.as_string()?)));

        // Nil
        table.insert((Kind::Nil, BinaryOp::Eq), |a, b| Ok(Value::Bool(a.kind() == b.kind())));
        table.insert((Kind::Nil, BinaryOp::NotEq), |a, b| Ok(Value::Bool(a.kind() != b.kind())));

        table
    };
}

fn overflow(op: BinaryOp) -> Error {
    Error::IntegerOverflow { op: op.to_string() }
}

fn int_add(a: &Value, b: &Value) -> Result<Value> {
    a.as_int()?
        .checked_add(b.as_int()?)
        .map(Value::Int)
        .ok_or_else(|| overflow(BinaryOp::Add))
}

fn int_sub(a: &Value, b: &Value) -> Result<Value> {
    a.as_int()?
        .checked_sub(b.as_int()?)
        .map(Value::Int)
        .ok_or_else(|| overflow(BinaryOp::Sub))
}

fn int_mul(a: &Value, b: &Value) -> Result<Value> {
    a.as_int()?
        .checked_mul(b.as_int()?)
        .map(Value::Int)
        .ok_or_else(|| overflow(BinaryOp::Mul))
}

/// Integer division rounding toward negative infinity
fn int_div(a: &Value, b: &Value) -> Result<Value> {
    let (lhs, rhs) = (a.as_int()?, b.as_int()?);
    if rhs == 0 {
        return Err(Error::DivisionByZero);
    }
    let quotient = lhs.checked_div(rhs).ok_or_else(|| overflow(BinaryOp::Div))?;
    let floored = if (lhs % rhs != 0) && ((lhs < 0) != (rhs < 0)) {
        quotient - 1
    } else {
        quotient
    };
    Ok(Value::Int(floored))
}

/// Applies a binary operator to two already-evaluated operands
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let (left_kind, right_kind) = (left.kind(), right.kind());

    if op.is_equality() && left_kind != right_kind {
        return Ok(Value::Bool(op == BinaryOp::NotEq));
    }

    let invalid = || Error::InvalidOperation {
        op: op.to_string(),
        left_type: left_kind.name().to_string(),
        right_type: right_kind.name().to_string(),
    };

    if left_kind != right_kind {
        return Err(invalid());
    }

    match BINARY_OPS.get(&(left_kind, op)) {
        Some(f) => f(left, right),
        None => Err(invalid()),
    }
}

/// Applies a unary operator to an already-evaluated operand
pub fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::IntegerOverflow { op: op.to_string() }),
        (UnaryOp::Neg, other) => Err(Error::type_mismatch(
            format!("int operand for {}", op),
            other.type_name(),
        )),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Not, other) => Err(Error::type_mismatch(
            format!("bool operand for {}", op),
            other.type_name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(apply_binary(BinaryOp::Add, &int(2), &int(3)).unwrap(), int(5));
        assert_eq!(apply_binary(BinaryOp::Sub, &int(2), &int(3)).unwrap(), int(-1));
        assert_eq!(apply_binary(BinaryOp::Mul, &int(4), &int(3)).unwrap(), int(12));
        assert_eq!(apply_binary(BinaryOp::Div, &int(7), &int(2)).unwrap(), int(3));
        assert_eq!(apply_binary(BinaryOp::Div, &int(-7), &int(-2)).unwrap(), int(3));
    }

    #[test]
    fn test_division_floors_mixed_signs() {
        assert_eq!(apply_binary(BinaryOp::Div, &int(-7), &int(2)).unwrap(), int(-4));
        assert_eq!(apply_binary(BinaryOp::Div, &int(7), &int(-2)).unwrap(), int(-4));
        assert_eq!(apply_binary(BinaryOp::Div, &int(-8), &int(2)).unwrap(), int(-4));
    }

    #[test]
    fn test_division_by_zero_and_overflow() {
        assert_eq!(
            apply_binary(BinaryOp::Div, &int(1), &int(0)),
            Err(Error::DivisionByZero)
        );
        assert!(matches!(
            apply_binary(BinaryOp::Add, &int(i64::MAX), &int(1)),
            Err(Error::IntegerOverflow { .. })
        ));
        assert!(matches!(
            apply_binary(BinaryOp::Div, &int(i64::MIN), &int(-1)),
            Err(Error::IntegerOverflow { .. })
        ));
        assert!(apply_unary(UnaryOp::Neg, &int(i64::MIN)).is_err());
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(apply_binary(BinaryOp::Lt, &int(1), &int(2)).unwrap(), Value::Bool(true));
        assert_eq!(apply_binary(BinaryOp::GtEq, &int(1), &int(2)).unwrap(), Value::Bool(false));
        assert_eq!(apply_binary(BinaryOp::LtEq, &int(2), &int(2)).unwrap(), Value::Bool(true));
        assert_eq!(apply_binary(BinaryOp::Gt, &int(3), &int(2)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_boolean_logic() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(apply_binary(BinaryOp::And, &t, &f).unwrap(), f);
        assert_eq!(apply_binary(BinaryOp::Or, &t, &f).unwrap(), t);
        assert_eq!(apply_binary(BinaryOp::Eq, &f, &f).unwrap(), t);
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(
            apply_binary(BinaryOp::Add, &Value::string("ab"), &Value::string("cd")).unwrap(),
            Value::string("abcd")
        );
        assert_eq!(
            apply_binary(BinaryOp::NotEq, &Value::string("a"), &Value::string("a")).unwrap(),
            Value::Bool(false)
        );
        assert!(matches!(
            apply_binary(BinaryOp::Sub, &Value::string("a"), &Value::string("b")),
            Err(Error::InvalidOperation { .. })
        ));
        assert!(apply_binary(BinaryOp::Lt, &Value::string("a"), &Value::string("b")).is_err());
    }

    #[test]
    fn test_nil_equality() {
        assert_eq!(
            apply_binary(BinaryOp::Eq, &Value::Nil, &Value::Nil).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            apply_binary(BinaryOp::NotEq, &Value::Nil, &Value::Nil).unwrap(),
            Value::Bool(false)
        );
        assert!(apply_binary(BinaryOp::Lt, &Value::Nil, &Value::Nil).is_err());
    }

    #[test]
    fn test_cross_kind_equality_never_errors() {
        let samples = [Value::Nil, Value::Bool(false), int(0), Value::string("")];
        for a in &samples {
            for b in &samples {
                if a.kind() == b.kind() {
                    continue;
                }
                assert_eq!(apply_binary(BinaryOp::Eq, a, b).unwrap(), Value::Bool(false));
                assert_eq!(apply_binary(BinaryOp::NotEq, a, b).unwrap(), Value::Bool(true));
            }
        }
    }

    #[test]
    fn test_cross_kind_arithmetic_is_type_error() {
        let err = apply_binary(BinaryOp::Add, &int(1), &Value::string("a")).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("int and string"));
        assert!(apply_binary(BinaryOp::And, &Value::Bool(true), &int(1)).is_err());
    }

    #[test]
    fn test_unary() {
        assert_eq!(apply_unary(UnaryOp::Neg, &int(5)).unwrap(), int(-5));
        assert_eq!(
            apply_unary(UnaryOp::Not, &Value::Bool(true)).unwrap(),
            Value::Bool(false)
        );
        assert!(apply_unary(UnaryOp::Neg, &Value::Bool(true)).unwrap_err().is_type_error());
        assert!(apply_unary(UnaryOp::Not, &int(0)).unwrap_err().is_type_error());
    }
}
