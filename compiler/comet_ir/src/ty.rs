//! Resolved type descriptors attached by the type checker.
//!
//! Only the shapes the evaluator can produce a value for are represented.
//! Sizes that depend on the target (`isize`, `usize`, pointers) are
//! computed by the evaluator from its target facts.

use std::fmt;

/// Fixed-width integer types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IntTy {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntTy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
        }
    }
}

/// Floating-point types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FloatTy {
    F32,
    F64,
}

impl FloatTy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

/// A resolved type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Ty {
    Void,
    Bool,
    Int(IntTy),
    Float(FloatTy),
    Str,
    Null,
    /// Raw pointer to a value of the inner type.
    Ptr(Box<Ty>),
    /// A `comptime` function.
    Fn,
}

impl Ty {
    /// Shorthand for `*inner`.
    pub fn ptr_to(inner: Ty) -> Ty {
        Ty::Ptr(Box::new(inner))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Void => f.write_str("void"),
            Ty::Bool => f.write_str("bool"),
            Ty::Int(int) => f.write_str(int.name()),
            Ty::Float(float) => f.write_str(float.name()),
            Ty::Str => f.write_str("str"),
            Ty::Null => f.write_str("null"),
            Ty::Ptr(inner) => write!(f, "*{inner}"),
            Ty::Fn => f.write_str("fn"),
        }
    }
}
