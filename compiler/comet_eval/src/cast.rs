//! `as` casts between comptime values.

use comet_ir::{FloatTy, IntTy, Span, Ty};

use crate::errors::{internal, invalid_cast, EvalResult};
use crate::{PointerValue, TargetInfo, Value, ValueKind};

/// Evaluate `value as ty`.
///
/// Integer casts wrap or extend; float to integer casts saturate with NaN
/// becoming zero.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "`as` semantics"
)]
pub fn evaluate_cast(value: &Value, ty: &Ty, span: Span, target: &TargetInfo) -> EvalResult {
    let from = value.kind();
    if from == ValueKind::Poison {
        return Ok(Value::poison(span));
    }
    let bad = || invalid_cast(from, ty.to_string(), span);

    match ty {
        Ty::Int(to) => {
            if let Some((_, bits)) = value.as_int() {
                return Ok(Value::int(*to, bits, target, span));
            }
            if let Some(b) = value.as_bool() {
                return Ok(Value::int(*to, u64::from(b), target, span));
            }
            if let Some(x) = value.as_f64() {
                return Ok(float_to_int(x, *to, target, span));
            }
            match value.as_pointer() {
                Some(ptr) if matches!(to, IntTy::Usize | IntTy::U64) => {
                    Ok(Value::int(*to, ptr.address().raw(), target, span))
                }
                _ => Err(bad()),
            }
        }
        Ty::Float(to) => {
            let x = match value.int_value() {
                Some(i) => i as f64,
                None => value.as_f64().ok_or_else(bad)?,
            };
            Ok(match to {
                FloatTy::F32 => Value::float(x as f32, span),
                FloatTy::F64 => Value::double(x, span),
            })
        }
        Ty::Bool => match from {
            ValueKind::Bool => Ok(value.clone().with_span(span)),
            k if k.is_integer() => value
                .int_value()
                .map(|i| Value::bool(i != 0, span))
                .ok_or_else(|| internal("integer value without an integer payload", span)),
            _ => Err(bad()),
        },
        Ty::Ptr(pointee) => match from {
            ValueKind::Null => Ok(Value::null(span)),
            ValueKind::String if **pointee == Ty::Int(IntTy::U8) => {
                let view = value.as_str_view().ok_or_else(bad)?;
                let ptr = PointerValue::new(view.address(), Ty::Int(IntTy::U8), target);
                Ok(Value::pointer(ptr, span))
            }
            ValueKind::Pointer => {
                let ptr = value.as_pointer().ok_or_else(bad)?;
                let ptr = PointerValue::new(ptr.address(), (**pointee).clone(), target);
                Ok(Value::pointer(ptr, span))
            }
            _ => Err(bad()),
        },
        _ if ValueKind::of_ty(ty) == from => Ok(value.clone().with_span(span)),
        _ => Err(bad()),
    }
}

/// Saturating float to integer conversion at the target width.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped into range first"
)]
fn float_to_int(x: f64, to: IntTy, target: &TargetInfo, span: Span) -> Value {
    let width = target.int_width(to);
    let (min, max) = if ValueKind::from(to).is_signed() {
        (-(1_i128 << (width - 1)), (1_i128 << (width - 1)) - 1)
    } else {
        (0, (1_i128 << width) - 1)
    };
    // `as i128` saturates and maps NaN to zero.
    let clamped = (x as i128).clamp(min, max);
    Value::int(to, clamped as u64, target, span)
}
