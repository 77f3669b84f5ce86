//! Closed set of runtime value kinds.
//!
//! # Tag layout
//!
//! The integer kinds occupy one contiguous discriminant range so that
//! "is this any integer" is a single range check:
//! - 0-1: unit-like and bool
//! - 2-11: integers, signed before unsigned
//! - 12-13: floats
//! - 14-19: strings, pointers, null, functions and the special kinds

use std::fmt;

use comet_ir::{FloatTy, IntTy, Ty};

use crate::TargetInfo;

/// Kind tag of a [`Value`](crate::Value).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Void = 0,
    Bool = 1,

    // === Integers (2-11) ===
    I8 = 2,
    I16 = 3,
    I32 = 4,
    I64 = 5,
    Isize = 6,
    U8 = 7,
    U16 = 8,
    U32 = 9,
    U64 = 10,
    Usize = 11,

    // === Floats (12-13) ===
    /// 32-bit float.
    Float = 12,
    /// 64-bit float.
    Double = 13,

    String = 14,
    Pointer = 15,
    Null = 16,
    Function = 17,
    /// Degraded value left behind by a reported error.
    Poison = 18,
    /// Tag of a destruct sentinel. No `Value` ever carries it.
    Destruct = 19,
}

impl ValueKind {
    const FIRST_INTEGER: u8 = ValueKind::I8 as u8;
    const LAST_INTEGER: u8 = ValueKind::Usize as u8;
    const FIRST_SIGNED: u8 = ValueKind::I8 as u8;
    const LAST_SIGNED: u8 = ValueKind::Isize as u8;

    /// Any fixed-width integer kind.
    #[inline]
    pub const fn is_integer(self) -> bool {
        let v = self as u8;
        v >= Self::FIRST_INTEGER && v <= Self::LAST_INTEGER
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        let v = self as u8;
        v >= Self::FIRST_SIGNED && v <= Self::LAST_SIGNED
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ValueKind::Float | ValueKind::Double)
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// The integer type behind an integer kind.
    pub const fn int_ty(self) -> Option<IntTy> {
        Some(match self {
            ValueKind::I8 => IntTy::I8,
            ValueKind::I16 => IntTy::I16,
            ValueKind::I32 => IntTy::I32,
            ValueKind::I64 => IntTy::I64,
            ValueKind::Isize => IntTy::Isize,
            ValueKind::U8 => IntTy::U8,
            ValueKind::U16 => IntTy::U16,
            ValueKind::U32 => IntTy::U32,
            ValueKind::U64 => IntTy::U64,
            ValueKind::Usize => IntTy::Usize,
            _ => return None,
        })
    }

    /// Bit width of a numeric kind on `target`.
    pub const fn bit_width(self, target: &TargetInfo) -> Option<u32> {
        match self.int_ty() {
            Some(int) => Some(target.int_width(int)),
            None => match self {
                ValueKind::Float => Some(32),
                ValueKind::Double => Some(64),
                _ => None,
            },
        }
    }

    /// The kind a value of type `ty` has.
    pub fn of_ty(ty: &Ty) -> ValueKind {
        match ty {
            Ty::Void => ValueKind::Void,
            Ty::Bool => ValueKind::Bool,
            Ty::Int(int) => ValueKind::from(*int),
            Ty::Float(FloatTy::F32) => ValueKind::Float,
            Ty::Float(FloatTy::F64) => ValueKind::Double,
            Ty::Str => ValueKind::String,
            Ty::Null => ValueKind::Null,
            Ty::Ptr(_) => ValueKind::Pointer,
            Ty::Fn => ValueKind::Function,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Bool => "bool",
            ValueKind::I8 => "i8",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::Isize => "isize",
            ValueKind::U8 => "u8",
            ValueKind::U16 => "u16",
            ValueKind::U32 => "u32",
            ValueKind::U64 => "u64",
            ValueKind::Usize => "usize",
            ValueKind::Float => "f32",
            ValueKind::Double => "f64",
            ValueKind::String => "str",
            ValueKind::Pointer => "pointer",
            ValueKind::Null => "null",
            ValueKind::Function => "fn",
            ValueKind::Poison => "<error>",
            ValueKind::Destruct => "<destruct>",
        }
    }
}

impl From<IntTy> for ValueKind {
    fn from(int: IntTy) -> Self {
        match int {
            IntTy::I8 => ValueKind::I8,
            IntTy::I16 => ValueKind::I16,
            IntTy::I32 => ValueKind::I32,
            IntTy::I64 => ValueKind::I64,
            IntTy::Isize => ValueKind::Isize,
            IntTy::U8 => ValueKind::U8,
            IntTy::U16 => ValueKind::U16,
            IntTy::U32 => ValueKind::U32,
            IntTy::U64 => ValueKind::U64,
            IntTy::Usize => ValueKind::Usize,
        }
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueKind::{}", self.name())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const _: () = assert!(std::mem::size_of::<ValueKind>() == 1);
