//! Scope allocator.
//!
//! Each scope owns a [`ScopeArena`]: a bump region of raw bytes in its own
//! slice of the virtual address space, a list of typed objects, and a list
//! of [`DestructSentinel`]s. Everything is released together when the scope
//! is popped, and because the arena is an ordinary owned value that happens
//! exactly once on every exit path.
//!
//! Byte allocations are tracked in an ordered map of `offset -> size` so a
//! read can be validated against a single live allocation.

mod sentinel;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

pub use sentinel::DestructSentinel;

use crate::{Address, ScopeId};

/// Bytes of address space reserved for each scope.
pub(crate) const REGION_SIZE: u64 = 1 << 32;

/// Errors from comptime memory access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("address {address} belongs to a scope that has already ended")]
    Dangling { address: Address },
    #[error("access of {len} bytes at {address} is outside any live allocation")]
    OutOfBounds { address: Address, len: u64 },
    #[error("pointer to {address} would outlive the scope that owns its target")]
    Escapes { address: Address },
    #[error("dereference of a null pointer")]
    Null,
    #[error("comptime memory of one scope exceeded its 4 GiB region")]
    Exhausted,
    #[error("{scope} is not a live scope")]
    DeadScope { scope: ScopeId },
}

/// Handle to an object stored with [`ScopeArena::allocate`].
pub struct ObjectId<T> {
    scope: ScopeId,
    index: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> ObjectId<T> {
    /// Scope whose teardown drops the object.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }
}

impl<T> Clone for ObjectId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectId<T> {}

impl<T> fmt::Debug for ObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}, {})", self.scope, self.index)
    }
}

/// Memory owned by one scope.
pub struct ScopeArena {
    // Field order is teardown order: sentinels, then objects, then bytes.
    finalizers: Vec<DestructSentinel>,
    objects: Vec<Box<dyn Any>>,
    scope: ScopeId,
    bytes: Vec<u8>,
    allocations: BTreeMap<u64, u64>,
}

impl ScopeArena {
    pub(crate) fn new(scope: ScopeId) -> Self {
        ScopeArena {
            finalizers: Vec::new(),
            objects: Vec::new(),
            scope,
            bytes: Vec::new(),
            allocations: BTreeMap::new(),
        }
    }

    /// First address of this arena's region.
    pub fn base(&self) -> Address {
        self.scope.region_base()
    }

    /// Copy `data` into the region and return its address.
    pub fn alloc_bytes(&mut self, data: &[u8]) -> Result<Address, MemoryError> {
        let offset = self.bytes.len() as u64;
        let len = data.len() as u64;
        if offset + len > REGION_SIZE {
            return Err(MemoryError::Exhausted);
        }
        self.bytes.extend_from_slice(data);
        self.allocations.insert(offset, len);
        // The region base is at least 1 << 32 and offsets stay below REGION_SIZE.
        Ok(Address::new(self.base().raw() + offset))
    }

    /// Whether `len` bytes at `address` lie inside one allocation.
    pub fn contains(&self, address: Address, len: u64) -> bool {
        let Some(offset) = address.raw().checked_sub(self.base().raw()) else {
            return false;
        };
        match self.allocations.range(..=offset).next_back() {
            Some((&start, &size)) => offset
                .checked_add(len)
                .is_some_and(|end| end <= start + size),
            None => false,
        }
    }

    /// Bounds-checked read.
    pub fn read(&self, address: Address, len: u64) -> Result<&[u8], MemoryError> {
        if !self.contains(address, len) {
            return Err(MemoryError::OutOfBounds { address, len });
        }
        let start = usize::try_from(address.raw() - self.base().raw())
            .map_err(|_| MemoryError::OutOfBounds { address, len })?;
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len))
            .ok_or(MemoryError::OutOfBounds { address, len })?;
        self.bytes
            .get(start..end)
            .ok_or(MemoryError::OutOfBounds { address, len })
    }

    /// Store `value` until the scope ends; its `Drop` runs at teardown.
    pub fn allocate<T: 'static>(&mut self, value: T) -> ObjectId<T> {
        self.objects.push(Box::new(value));
        ObjectId {
            scope: self.scope,
            index: self.objects.len() - 1,
            marker: PhantomData,
        }
    }

    /// Borrow an object allocated in this arena.
    pub fn get<T: 'static>(&self, id: ObjectId<T>) -> Option<&T> {
        if id.scope != self.scope {
            return None;
        }
        self.objects.get(id.index)?.downcast_ref::<T>()
    }

    /// Register a finalizer to run when the scope ends.
    pub fn defer(&mut self, sentinel: DestructSentinel) {
        self.finalizers.push(sentinel);
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn finalizer_count(&self) -> usize {
        self.finalizers.len()
    }

    pub fn bytes_used(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for ScopeArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeArena")
            .field("scope", &self.scope)
            .field("bytes", &self.bytes.len())
            .field("objects", &self.objects.len())
            .field("finalizers", &self.finalizers.len())
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
