//! Interned identifiers.

use std::fmt;

/// Interned string identifier.
///
/// A plain index into the [`StringInterner`](crate::StringInterner) that
/// produced it. Comparing two names compares identifiers, not text.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
