use crate::value::Address;

/// Zero-copy view of string bytes held in a scope arena.
///
/// Slicing produces a new view over the same bytes; the view never owns
/// them and is only readable while the owning scope is alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StrView {
    address: Address,
    len: u64,
}

impl StrView {
    pub const fn new(address: Address, len: u64) -> Self {
        StrView { address, len }
    }

    pub const fn address(&self) -> Address {
        self.address
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View of the bytes from `offset` on, or `None` if `offset > len`.
    pub fn slice_from(&self, offset: u64) -> Option<StrView> {
        let len = self.len.checked_sub(offset)?;
        Some(StrView {
            address: self.address.checked_add(offset)?,
            len,
        })
    }
}
