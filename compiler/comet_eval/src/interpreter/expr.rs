//! Expression evaluation.

use comet_ir::{Expr, ExprKind, FloatTy, Literal, Span, Ty, UnaryOp};

use super::{Flow, Interpreter};
use crate::errors::{
    invalid_pointer_op, memory_error, type_mismatch, undefined_name, unsupported_unary,
};
use crate::{
    ensure_sufficient_stack, evaluate_binary, evaluate_cast, evaluate_unary, EvalContext,
    PointerValue, ScopeId, Value, ValueKind,
};

impl Interpreter<'_> {
    /// Evaluate `expr` in `scope`.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, scope: ScopeId, ctx: &EvalContext<'_>) -> Flow {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope, ctx))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, scope: ScopeId, ctx: &EvalContext<'_>) -> Flow {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal(literal) => self.eval_literal(literal, scope, span),
            ExprKind::Ident(name) => match self.env.find_from(scope, *name) {
                Some(value) => Ok(value.clone().with_span(span)),
                None => Err(undefined_name(self.root.interner().lookup(*name), span).into()),
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval_expr(lhs, scope, ctx)?;
                let rhs = self.eval_expr(rhs, scope, ctx)?;
                Ok(evaluate_binary(*op, &lhs, &rhs, span, self.root.target())?)
            }
            ExprKind::Unary {
                op: UnaryOp::Deref,
                operand,
            } => {
                let pointer = self.eval_expr(operand, scope, ctx)?;
                Ok(self.deref(&pointer, span)?)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand, scope, ctx)?;
                Ok(evaluate_unary(*op, &operand, span, self.root.target())?)
            }
            ExprKind::Cast { expr, ty } => {
                let value = self.eval_expr(expr, scope, ctx)?;
                Ok(evaluate_cast(&value, ty, span, self.root.target())?)
            }
            ExprKind::Is { expr, ty } => {
                let value = self.eval_expr(expr, scope, ctx)?;
                if value.is_poison() {
                    return Ok(Value::poison(span));
                }
                Ok(Value::bool(value.kind() == ValueKind::of_ty(ty), span))
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.eval_expr(cond, scope, ctx)?;
                if cond.is_poison() {
                    return Ok(Value::poison(span));
                }
                let Some(taken) = cond.as_bool() else {
                    return Err(type_mismatch("bool", cond.kind(), cond.span()).into());
                };
                match (taken, else_branch) {
                    (true, _) => self.run_block(then_branch, scope, ctx),
                    (false, Some(else_branch)) => self.run_block(else_branch, scope, ctx),
                    (false, None) => Ok(Value::void(span)),
                }
            }
            ExprKind::Block(block) | ExprKind::Comptime(block) => self.run_block(block, scope, ctx),
            ExprKind::Call { callee, args } => self.call(*callee, args, span, scope, ctx),
        }
    }

    #[allow(clippy::cast_possible_truncation, reason = "f32 literals are stored widened")]
    fn eval_literal(&mut self, literal: &Literal, scope: ScopeId, span: Span) -> Flow {
        let target = *self.root.target();
        Ok(match literal {
            Literal::Void => Value::void(span),
            Literal::Bool(b) => Value::bool(*b, span),
            Literal::Int { value, ty } => Value::int(*ty, *value, &target, span),
            Literal::Float {
                value,
                ty: FloatTy::F32,
            } => Value::float(*value as f32, span),
            Literal::Float {
                value,
                ty: FloatTy::F64,
            } => Value::double(*value, span),
            Literal::Str(text) => {
                let view = self
                    .env
                    .alloc_str(scope, text.as_bytes())
                    .map_err(|err| memory_error(err, span))?;
                Value::string(view, span)
            }
            Literal::Null => Value::null(span),
        })
    }

    /// Read the pointee of `pointer` from comptime memory.
    fn deref(&self, pointer: &Value, span: Span) -> crate::EvalResult {
        match pointer.kind() {
            ValueKind::Poison => return Ok(Value::poison(span)),
            ValueKind::Null => return Err(memory_error(crate::MemoryError::Null, span)),
            ValueKind::Pointer => {}
            other => return Err(unsupported_unary(UnaryOp::Deref.as_symbol(), other, span)),
        }
        let Some(ptr) = pointer.as_pointer() else {
            return Ok(Value::poison(span));
        };
        let target = self.root.target();
        let size = target.size_of(ptr.pointee());
        let bytes = self
            .env
            .read(ptr.address(), size)
            .map_err(|err| memory_error(err, span))?;
        decode(ptr, bytes, target, span)
    }
}

/// Decode a little-endian scalar of the pointee type.
#[allow(clippy::cast_possible_truncation, reason = "f32 pointees read exactly four bytes")]
fn decode(
    ptr: &PointerValue,
    bytes: &[u8],
    target: &crate::TargetInfo,
    span: Span,
) -> crate::EvalResult {
    let mut raw = [0u8; 8];
    let len = bytes.len().min(8);
    raw[..len].copy_from_slice(&bytes[..len]);
    let bits = u64::from_le_bytes(raw);
    match ptr.pointee() {
        Ty::Int(ty) => Ok(Value::int(*ty, bits, target, span)),
        Ty::Bool => Ok(Value::bool(bits != 0, span)),
        Ty::Float(FloatTy::F32) => Ok(Value::float(f32::from_bits(bits as u32), span)),
        Ty::Float(FloatTy::F64) => Ok(Value::double(f64::from_bits(bits), span)),
        other => Err(invalid_pointer_op(
            format!("cannot dereference a pointer to `{other}` at comptime"),
            span,
        )),
    }
}
