//! Operator semantics for constant folding.
//!
//! Arithmetic follows primitive widening: both operands are promoted to the
//! wider width (never below 32 bits) and the result wraps at that width.
//! Shifts are typed by the left operand alone.

use std::cmp::Ordering;

use super::value::{IntValue, IntWidth, Value};
use super::{EvalError, EvalResult};
use crate::core::ast::{BinaryOp, UnaryOp};

/// Apply a binary operator to two already-evaluated operands.
pub fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalResult {
    if op == BinaryOp::Add && (lhs.as_text().is_some() || rhs.as_text().is_some()) {
        let text = format!("{}{}", lhs.to_text(), rhs.to_text());
        return Ok(Some(Value::Text(text)));
    }

    if let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) {
        return Ok(apply_logical(op, *a, *b).map(Value::Bool));
    }

    let (Some(a), Some(b)) = (lhs.as_int(), rhs.as_int()) else {
        return Ok(None);
    };

    match op {
        op if op.is_shift() => shift(op, a, b).map(|v| v.map(Value::Int)),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            Ok(Some(Value::Bool(compare(op, a.get().cmp(&b.get())))))
        }
        BinaryOp::And | BinaryOp::Or => Ok(None),
        _ => {
            let width = a.width().widen(b.width());
            arithmetic(op, a.cast(width), b.cast(width)).map(|v| v.map(Value::Int))
        }
    }
}

/// Apply a unary operator to an evaluated operand.
pub fn apply_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    if let (UnaryOp::Not, Value::Bool(b)) = (op, operand) {
        return Ok(Some(Value::Bool(!b)));
    }
    let Some(v) = operand.as_int() else {
        return Ok(None);
    };
    let v = v.cast(v.width().promoted());
    let result = match (op, v.width()) {
        (UnaryOp::Plus, _) => v,
        (UnaryOp::Neg, IntWidth::W32) => IntValue::int((v.get() as i32).wrapping_neg()),
        (UnaryOp::Neg, IntWidth::W64) => IntValue::long(v.get().wrapping_neg()),
        (UnaryOp::BitNot, width) => IntValue::new(width, !v.get()),
        (UnaryOp::Not, _) => return Ok(None),
        (UnaryOp::Neg, width) => {
            return Err(EvalError::InternalConsistency(format!(
                "negation of unpromoted {} operand",
                width
            )));
        }
    };
    Ok(Some(Value::Int(result)))
}

fn apply_logical(op: BinaryOp, a: bool, b: bool) -> Option<bool> {
    match op {
        BinaryOp::And | BinaryOp::BitAnd => Some(a && b),
        BinaryOp::Or | BinaryOp::BitOr => Some(a || b),
        BinaryOp::BitXor | BinaryOp::Ne => Some(a != b),
        BinaryOp::Eq => Some(a == b),
        _ => None,
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::Ne => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::Le => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    }
}

/// Operands must already share a promoted width.
fn arithmetic(op: BinaryOp, a: IntValue, b: IntValue) -> Result<Option<IntValue>, EvalError> {
    if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b.get() == 0 {
        return Ok(None);
    }
    match (a.width(), b.width()) {
        (IntWidth::W32, IntWidth::W32) => {
            let (x, y) = (a.get() as i32, b.get() as i32);
            let result = match op {
                BinaryOp::Add => x.wrapping_add(y),
                BinaryOp::Sub => x.wrapping_sub(y),
                BinaryOp::Mul => x.wrapping_mul(y),
                BinaryOp::Div => x.wrapping_div(y),
                BinaryOp::Rem => x.wrapping_rem(y),
                BinaryOp::BitAnd => x & y,
                BinaryOp::BitOr => x | y,
                BinaryOp::BitXor => x ^ y,
                _ => return Ok(None),
            };
            Ok(Some(IntValue::int(result)))
        }
        (IntWidth::W64, IntWidth::W64) => {
            let (x, y) = (a.get(), b.get());
            let result = match op {
                BinaryOp::Add => x.wrapping_add(y),
                BinaryOp::Sub => x.wrapping_sub(y),
                BinaryOp::Mul => x.wrapping_mul(y),
                BinaryOp::Div => x.wrapping_div(y),
                BinaryOp::Rem => x.wrapping_rem(y),
                BinaryOp::BitAnd => x & y,
                BinaryOp::BitOr => x | y,
                BinaryOp::BitXor => x ^ y,
                _ => return Ok(None),
            };
            Ok(Some(IntValue::long(result)))
        }
        (left, right) => Err(EvalError::InternalConsistency(format!(
            "operator {:?} on mismatched operand widths {} and {}",
            op, left, right
        ))),
    }
}

/// The shift count is masked to the promoted left width, as `count mod bits`.
fn shift(op: BinaryOp, value: IntValue, count: IntValue) -> Result<Option<IntValue>, EvalError> {
    let value = value.cast(value.width().promoted());
    let distance = (count.get() & i64::from(value.width().bits() - 1)) as u32;
    let result = match value.width() {
        IntWidth::W32 => {
            let v = value.get() as i32;
            IntValue::int(match op {
                BinaryOp::Shl => v.wrapping_shl(distance),
                BinaryOp::Shr => v >> distance,
                _ => ((v as u32) >> distance) as i32,
            })
        }
        IntWidth::W64 => {
            let v = value.get();
            IntValue::long(match op {
                BinaryOp::Shl => v.wrapping_shl(distance),
                BinaryOp::Shr => v >> distance,
                _ => ((v as u64) >> distance) as i64,
            })
        }
        width => {
            return Err(EvalError::InternalConsistency(format!(
                "shift of unpromoted {} operand",
                width
            )));
        }
    };
    Ok(Some(result))
}
