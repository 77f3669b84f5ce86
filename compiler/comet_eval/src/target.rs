//! Facts about the compilation target that change evaluation results.

use comet_ir::{FloatTy, IntTy, Ty};

/// Width of a target pointer, and therefore of `isize`/`usize`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PointerWidth {
    W32,
    W64,
}

impl PointerWidth {
    pub const fn bits(self) -> u32 {
        match self {
            PointerWidth::W32 => 32,
            PointerWidth::W64 => 64,
        }
    }

    pub const fn bytes(self) -> u64 {
        self.bits() as u64 / 8
    }
}

/// Target facts held by the global root.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TargetInfo {
    pub pointer_width: PointerWidth,
}

impl TargetInfo {
    pub const fn new(pointer_width: PointerWidth) -> Self {
        TargetInfo { pointer_width }
    }

    /// The machine the compiler itself runs on.
    pub const fn host() -> Self {
        if cfg!(target_pointer_width = "32") {
            TargetInfo::new(PointerWidth::W32)
        } else {
            TargetInfo::new(PointerWidth::W64)
        }
    }

    /// Bit width of an integer type on this target.
    pub const fn int_width(&self, ty: IntTy) -> u32 {
        match ty {
            IntTy::I8 | IntTy::U8 => 8,
            IntTy::I16 | IntTy::U16 => 16,
            IntTy::I32 | IntTy::U32 => 32,
            IntTy::I64 | IntTy::U64 => 64,
            IntTy::Isize | IntTy::Usize => self.pointer_width.bits(),
        }
    }

    /// Size in bytes of a value of `ty` when stored in memory.
    ///
    /// Strings are a (pointer, length) pair.
    pub fn size_of(&self, ty: &Ty) -> u64 {
        let ptr = self.pointer_width.bytes();
        match ty {
            Ty::Void => 0,
            Ty::Bool => 1,
            Ty::Int(int) => u64::from(self.int_width(*int) / 8),
            Ty::Float(FloatTy::F32) => 4,
            Ty::Float(FloatTy::F64) => 8,
            Ty::Str => ptr * 2,
            Ty::Null | Ty::Ptr(_) | Ty::Fn => ptr,
        }
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self::host()
    }
}
