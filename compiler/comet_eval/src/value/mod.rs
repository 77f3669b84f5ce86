//! Runtime values produced by compile-time evaluation.
//!
//! A [`Value`] is an immutable pairing of a [`ValueKind`] tag, a payload and
//! the span of the expression that produced it. Operations never mutate
//! their operands; they build new values.

pub(crate) mod int;
mod kind;
mod pointer;
mod string;

use std::fmt;
use std::rc::Rc;

use comet_ir::{FnDecl, IntTy, Span};

pub use kind::ValueKind;
pub use pointer::{Address, PointerValue};
pub use string::StrView;

use crate::{ScopeId, TargetInfo};

/// A `comptime` function together with the scope it was declared in.
///
/// Calls run the body in a fresh child of `scope`, so the function sees the
/// bindings that were visible at its declaration.
#[derive(Clone, Debug)]
pub struct FunctionValue {
    pub decl: Rc<FnDecl>,
    pub scope: ScopeId,
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.decl, &other.decl) && self.scope == other.scope
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    None,
    Bool(bool),
    /// Normalized bit pattern, see [`int::normalize`].
    Int(u64),
    Float(f32),
    Double(f64),
    Str(StrView),
    Ptr(PointerValue),
    Function(FunctionValue),
}

/// An evaluated value.
///
/// The kind is fixed at construction. Constructors are the only way to
/// pair a kind with a payload, so the two always agree.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    kind: ValueKind,
    payload: Payload,
    span: Span,
}

impl Value {
    fn make(kind: ValueKind, payload: Payload, span: Span) -> Self {
        Value {
            kind,
            payload,
            span,
        }
    }

    pub fn void(span: Span) -> Self {
        Self::make(ValueKind::Void, Payload::None, span)
    }

    pub fn bool(value: bool, span: Span) -> Self {
        Self::make(ValueKind::Bool, Payload::Bool(value), span)
    }

    /// Integer of type `ty` from any 64-bit pattern; the pattern is truncated
    /// to the type's width on `target`.
    pub fn int(ty: IntTy, bits: u64, target: &TargetInfo, span: Span) -> Self {
        let kind = ValueKind::from(ty);
        let bits = int::normalize(bits, target.int_width(ty), kind.is_signed());
        Self::make(kind, Payload::Int(bits), span)
    }

    pub fn float(value: f32, span: Span) -> Self {
        Self::make(ValueKind::Float, Payload::Float(value), span)
    }

    pub fn double(value: f64, span: Span) -> Self {
        Self::make(ValueKind::Double, Payload::Double(value), span)
    }

    pub fn string(view: StrView, span: Span) -> Self {
        Self::make(ValueKind::String, Payload::Str(view), span)
    }

    pub fn pointer(pointer: PointerValue, span: Span) -> Self {
        Self::make(ValueKind::Pointer, Payload::Ptr(pointer), span)
    }

    pub fn null(span: Span) -> Self {
        Self::make(ValueKind::Null, Payload::None, span)
    }

    pub fn function(function: FunctionValue, span: Span) -> Self {
        Self::make(ValueKind::Function, Payload::Function(function), span)
    }

    /// Degraded value standing in for a failed evaluation.
    pub fn poison(span: Span) -> Self {
        Self::make(ValueKind::Poison, Payload::None, span)
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// The same value attributed to a different source location.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    #[inline]
    pub fn is_poison(&self) -> bool {
        self.kind == ValueKind::Poison
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.kind == ValueKind::Null
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Integer type and normalized bit pattern.
    pub fn as_int(&self) -> Option<(IntTy, u64)> {
        match (self.kind.int_ty(), &self.payload) {
            (Some(ty), Payload::Int(bits)) => Some((ty, *bits)),
            _ => None,
        }
    }

    /// Mathematical value of an integer, whatever its width or signedness.
    pub fn int_value(&self) -> Option<i128> {
        match &self.payload {
            Payload::Int(bits) => Some(int::to_i128(*bits, self.kind.is_signed())),
            _ => None,
        }
    }

    /// Float or double widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.payload {
            Payload::Float(f) => Some(f64::from(f)),
            Payload::Double(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str_view(&self) -> Option<StrView> {
        match self.payload {
            Payload::Str(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerValue> {
        match &self.payload {
            Payload::Ptr(ptr) => Some(ptr),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match &self.payload {
            Payload::Function(function) => Some(function),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::None => f.write_str(self.kind.name()),
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Int(bits) => write!(f, "{}", int::to_i128(*bits, self.kind.is_signed())),
            Payload::Float(v) => write!(f, "{v}"),
            Payload::Double(v) => write!(f, "{v}"),
            Payload::Str(view) => write!(f, "str[{}] @ {}", view.len(), view.address()),
            Payload::Ptr(ptr) => write!(f, "{ptr}"),
            Payload::Function(function) => write!(f, "fn/{}", function.decl.params.len()),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
