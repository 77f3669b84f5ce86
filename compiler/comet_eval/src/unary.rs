//! Unary operators on comptime values.

use comet_ir::{Span, UnaryOp};

use crate::errors::{internal, unsupported_unary, EvalResult};
use crate::{TargetInfo, Value, ValueKind};

/// Evaluate `op operand`.
///
/// `Deref` needs comptime memory and is evaluated by the interpreter.
#[allow(clippy::cast_possible_truncation, reason = "f32 payloads round trip through f64")]
pub fn evaluate_unary(op: UnaryOp, operand: &Value, span: Span, target: &TargetInfo) -> EvalResult {
    let kind = operand.kind();
    if kind == ValueKind::Poison {
        return Ok(Value::poison(span));
    }
    match (op, kind) {
        (UnaryOp::Neg | UnaryOp::BitNot, k) if k.is_integer() => {
            let Some((ty, bits)) = operand.as_int() else {
                return Err(internal("integer value without an integer payload", span));
            };
            let bits = if op == UnaryOp::Neg {
                bits.wrapping_neg()
            } else {
                !bits
            };
            Ok(Value::int(ty, bits, target, span))
        }
        (UnaryOp::Neg, ValueKind::Float | ValueKind::Double) => match operand.as_f64() {
            Some(x) if kind == ValueKind::Float => Ok(Value::float(-(x as f32), span)),
            Some(x) => Ok(Value::double(-x, span)),
            None => Err(internal("float value without a float payload", span)),
        },
        (UnaryOp::Not, ValueKind::Bool) => operand
            .as_bool()
            .map(|b| Value::bool(!b, span))
            .ok_or_else(|| internal("bool value without a bool payload", span)),
        (UnaryOp::Deref, _) => Err(internal(
            "dereference must be evaluated against comptime memory",
            span,
        )),
        _ => Err(unsupported_unary(op.as_symbol(), kind, span)),
    }
}
