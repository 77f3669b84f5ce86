//! Binary operator dispatch for comptime values.
//!
//! The kind set is closed, so dispatch is a fixed sequence of pattern
//! checks. The first matching rule wins:
//!
//! 0. a `Poison` operand yields `Poison`
//! 1. `bool` with `bool`
//! 2. integer with integer
//! 3. float family
//! 4. `null` on either side
//! 5. string with integer
//! 6. pointer with integer
//! 7. anything else is an error

use comet_ir::{BinaryOp, IntTy, Span};

use crate::errors::{
    division_by_zero, internal, invalid_pointer_op, invalid_shift, modulo_by_zero,
    slice_out_of_bounds, unknown_kinds, unsupported_binary, EvalResult,
};
use crate::value::int::normalize;
use crate::{PointerValue, StrView, TargetInfo, Value, ValueKind};

/// Evaluate `lhs op rhs`.
///
/// The result carries `span`. Errors are returned, never reported; the
/// caller decides where the diagnostic goes.
pub fn evaluate_binary(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    span: Span,
    target: &TargetInfo,
) -> EvalResult {
    let (lk, rk) = (lhs.kind(), rhs.kind());
    tracing::trace!(%op, lhs = %lk, rhs = %rk, "binary");

    if lk == ValueKind::Poison || rk == ValueKind::Poison {
        return Ok(Value::poison(span));
    }
    if lk == ValueKind::Bool && rk == ValueKind::Bool {
        return eval_bool_binary(op, lhs, rhs, span);
    }
    if lk.is_integer() && rk.is_integer() {
        return eval_int_binary(op, lhs, rhs, span, target);
    }
    if lk.is_numeric() && rk.is_numeric() {
        // At least one side is a float here.
        return eval_float_binary(op, lhs, rhs, span);
    }
    if lk == ValueKind::Null || rk == ValueKind::Null {
        return Ok(eval_null_binary(op, lk, rk, span));
    }
    match (lk, rk) {
        (ValueKind::String, r) if r.is_integer() => eval_str_offset(op, lhs, rhs, span),
        (l, ValueKind::String) if l.is_integer() => eval_str_offset(op, rhs, lhs, span),
        (ValueKind::Pointer, r) if r.is_integer() => eval_ptr_offset(op, lhs, rhs, false, span),
        (l, ValueKind::Pointer) if l.is_integer() => eval_ptr_offset(op, rhs, lhs, true, span),
        _ => Err(unknown_kinds(lk, rk, span)),
    }
}

/// `and`/`or` on booleans.
///
/// Type checking lowers every other boolean operator before values reach
/// this point, so anything else is an internal error.
fn eval_bool_binary(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> EvalResult {
    let (Some(a), Some(b)) = (lhs.as_bool(), rhs.as_bool()) else {
        return Err(internal("bool value without a bool payload", span));
    };
    match op {
        BinaryOp::And => Ok(Value::bool(a && b, span)),
        BinaryOp::Or => Ok(Value::bool(a || b, span)),
        _ => Err(internal(
            format!("operator `{op}` reached the evaluator with bool operands"),
            span,
        )),
    }
}

/// Result kind of a mixed integer operation.
///
/// The wider kind wins. At equal width the unsigned kind wins, and two
/// kinds of equal width and signedness resolve to the left one.
pub(crate) fn promote_int(lhs: IntTy, rhs: IntTy, target: &TargetInfo) -> IntTy {
    let (lw, rw) = (target.int_width(lhs), target.int_width(rhs));
    if lw != rw {
        return if lw > rw { lhs } else { rhs };
    }
    let (ls, rs) = (
        ValueKind::from(lhs).is_signed(),
        ValueKind::from(rhs).is_signed(),
    );
    if ls && !rs {
        rhs
    } else {
        lhs
    }
}

#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    reason = "integer payloads are reinterpreted at their width on purpose"
)]
fn eval_int_binary(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    span: Span,
    target: &TargetInfo,
) -> EvalResult {
    let (Some((lt, lbits)), Some((rt, rbits))) = (lhs.as_int(), rhs.as_int()) else {
        return Err(internal("integer value without an integer payload", span));
    };

    if matches!(op, BinaryOp::Shl | BinaryOp::Shr) {
        return eval_shift(op, lt, lbits, rhs, span, target);
    }

    let ty = promote_int(lt, rt, target);
    let width = target.int_width(ty);
    let signed = ValueKind::from(ty).is_signed();
    let a = normalize(lbits, width, signed);
    let b = normalize(rbits, width, signed);
    let int = |bits: u64| -> EvalResult { Ok(Value::int(ty, bits, target, span)) };

    match op {
        BinaryOp::Add => int(a.wrapping_add(b)),
        BinaryOp::Sub => int(a.wrapping_sub(b)),
        BinaryOp::Mul => int(a.wrapping_mul(b)),
        BinaryOp::Div if b == 0 => Err(division_by_zero(span)),
        BinaryOp::Mod if b == 0 => Err(modulo_by_zero(span)),
        BinaryOp::Div if signed => int((a as i64).wrapping_div(b as i64) as u64),
        BinaryOp::Mod if signed => int((a as i64).wrapping_rem(b as i64) as u64),
        BinaryOp::Div => int(a / b),
        BinaryOp::Mod => int(a % b),
        BinaryOp::BitAnd => int(a & b),
        BinaryOp::BitOr => int(a | b),
        BinaryOp::BitXor => int(a ^ b),
        BinaryOp::Eq => Ok(Value::bool(a == b, span)),
        BinaryOp::NotEq => Ok(Value::bool(a != b, span)),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = if signed {
                (a as i64).cmp(&(b as i64))
            } else {
                a.cmp(&b)
            };
            Ok(Value::bool(compare(op, ordering), span))
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Shl | BinaryOp::Shr => {
            Err(unsupported_binary(op, lhs.kind(), rhs.kind(), span))
        }
    }
}

/// Shifts keep the left operand's kind; the amount must lie in `0..width`.
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    reason = "amount is range checked before narrowing"
)]
fn eval_shift(
    op: BinaryOp,
    ty: IntTy,
    bits: u64,
    amount: &Value,
    span: Span,
    target: &TargetInfo,
) -> EvalResult {
    let width = target.int_width(ty);
    let Some(n) = amount.int_value() else {
        return Err(internal("shift amount without an integer payload", span));
    };
    if n < 0 || n >= i128::from(width) {
        return Err(invalid_shift(n, width, span));
    }
    let n = n as u32;
    let shifted = match op {
        BinaryOp::Shl => bits << n,
        _ if ValueKind::from(ty).is_signed() => ((bits as i64) >> n) as u64,
        _ => bits >> n,
    };
    Ok(Value::int(ty, shifted, target, span))
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        BinaryOp::NotEq => ordering.is_ne(),
        _ => ordering.is_eq(),
    }
}

/// Float arithmetic, computed in `f64`.
///
/// `double` dominates `float`; an integer mixed with a `float` stays `float`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "float results follow IEEE conversion rules"
)]
fn eval_float_binary(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> EvalResult {
    let as_f64 = |v: &Value| v.as_f64().or_else(|| v.int_value().map(|i| i as f64));
    let (Some(a), Some(b)) = (as_f64(lhs), as_f64(rhs)) else {
        return Err(internal("numeric value without a numeric payload", span));
    };
    let double = lhs.kind() == ValueKind::Double || rhs.kind() == ValueKind::Double;
    let float = |x: f64| -> EvalResult {
        Ok(if double {
            Value::double(x, span)
        } else {
            Value::float(x as f32, span)
        })
    };

    match op {
        BinaryOp::Add => float(a + b),
        BinaryOp::Sub => float(a - b),
        BinaryOp::Mul => float(a * b),
        BinaryOp::Div => float(a / b),
        BinaryOp::Mod => float(a % b),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt
        | BinaryOp::GtEq => {
            // NaN compares unequal to everything, including itself.
            let result = match a.partial_cmp(&b) {
                Some(ordering) => compare(op, ordering),
                None => op == BinaryOp::NotEq,
            };
            Ok(Value::bool(result, span))
        }
        _ => Err(unsupported_binary(op, lhs.kind(), rhs.kind(), span)),
    }
}

fn eval_null_binary(op: BinaryOp, lhs: ValueKind, rhs: ValueKind, span: Span) -> Value {
    let both = lhs == ValueKind::Null && rhs == ValueKind::Null;
    match op {
        BinaryOp::Eq => Value::bool(both, span),
        BinaryOp::NotEq => Value::bool(!both, span),
        _ => Value::null(span),
    }
}

/// `str + n` and `n + str`: a view starting `n` bytes later.
fn eval_str_offset(
    op: BinaryOp,
    text: &Value,
    offset: &Value,
    span: Span,
) -> EvalResult {
    if op != BinaryOp::Add {
        return Err(unsupported_binary(op, ValueKind::String, offset.kind(), span));
    }
    let (Some(view), Some(n)) = (text.as_str_view(), offset.int_value()) else {
        return Err(internal("string operands without payloads", span));
    };
    u64::try_from(n)
        .ok()
        .and_then(|n| view.slice_from(n))
        .map(|sliced: StrView| Value::string(sliced, span))
        .ok_or_else(|| slice_out_of_bounds(n, view.len(), span))
}

/// Pointer arithmetic scaled by the pointee size.
///
/// `ptr + n`, `n + ptr` and `ptr - n`; a negative `n` moves the other way.
fn eval_ptr_offset(
    op: BinaryOp,
    pointer: &Value,
    count: &Value,
    int_on_left: bool,
    span: Span,
) -> EvalResult {
    let forward = match op {
        BinaryOp::Add => true,
        BinaryOp::Sub if !int_on_left => false,
        _ => {
            let (l, r) = if int_on_left {
                (count.kind(), ValueKind::Pointer)
            } else {
                (ValueKind::Pointer, count.kind())
            };
            return Err(invalid_pointer_op(
                format!("operator `{op}` cannot be applied to `{l}` and `{r}`"),
                span,
            ));
        }
    };
    let (Some(ptr), Some(n)) = (pointer.as_pointer(), count.int_value()) else {
        return Err(internal("pointer operands without payloads", span));
    };
    let forward = forward == (n >= 0);
    let moved: Option<PointerValue> = u64::try_from(n.unsigned_abs()).ok().and_then(|n| {
        if forward {
            ptr.increment(n)
        } else {
            ptr.decrement(n)
        }
    });
    moved
        .map(|p| Value::pointer(p, span))
        .ok_or_else(|| {
            invalid_pointer_op(
                format!("offset {n} moves `{ptr}` out of the address space"),
                span,
            )
        })
}
