//! Addresses and pointer values.

use std::fmt;

use comet_ir::Ty;

use crate::TargetInfo;

/// Virtual address in comptime memory.
///
/// Every scope owns a disjoint region of the address space, so an address
/// also identifies the scope that owns the bytes behind it. Address zero is
/// never handed out.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address(u64);

impl Address {
    pub const NULL: Address = Address(0);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Address(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn checked_add(self, bytes: u64) -> Option<Address> {
        self.0.checked_add(bytes).map(Address)
    }

    #[inline]
    pub fn checked_sub(self, bytes: u64) -> Option<Address> {
        self.0.checked_sub(bytes).map(Address)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A typed pointer into comptime memory.
///
/// Arithmetic moves by whole pointees. A zero-sized pointee (`*void`)
/// steps one byte at a time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PointerValue {
    address: Address,
    pointee: Ty,
    stride: u64,
}

impl PointerValue {
    pub fn new(address: Address, pointee: Ty, target: &TargetInfo) -> Self {
        let stride = target.size_of(&pointee).max(1);
        PointerValue {
            address,
            pointee,
            stride,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn pointee(&self) -> &Ty {
        &self.pointee
    }

    /// Size in bytes of one pointee.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Pointer `count` pointees further on, or `None` on address overflow.
    #[must_use]
    pub fn increment(&self, count: u64) -> Option<PointerValue> {
        let bytes = count.checked_mul(self.stride)?;
        Some(self.at(self.address.checked_add(bytes)?))
    }

    /// Pointer `count` pointees back, or `None` on address underflow.
    #[must_use]
    pub fn decrement(&self, count: u64) -> Option<PointerValue> {
        let bytes = count.checked_mul(self.stride)?;
        Some(self.at(self.address.checked_sub(bytes)?))
    }

    fn at(&self, address: Address) -> PointerValue {
        PointerValue {
            address,
            pointee: self.pointee.clone(),
            stride: self.stride,
        }
    }
}

impl fmt::Display for PointerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*{} @ {}", self.pointee, self.address)
    }
}
