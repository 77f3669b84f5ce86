//! String interner for identifiers and string literals.
//!
//! Interned text is leaked so lookups can hand out `&'static str` without
//! holding the lock. The interner lives for the whole compilation, so the
//! leak is bounded by the number of distinct identifiers.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

struct InternTable {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// Thread-safe string interner.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned as [`Name::EMPTY`].
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        StringInterner {
            table: RwLock::new(InternTable {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct strings are interned.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.table.read().map.get(s) {
            return name;
        }

        let mut table = self.table.write();
        // Another writer may have won the race.
        if let Some(&name) = table.map.get(s) {
            return name;
        }

        let raw = u32::try_from(table.strings.len())
            .unwrap_or_else(|_| panic!("string interner exceeded u32::MAX entries"));
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(raw);
        table.strings.push(leaked);
        table.map.insert(leaked, name);
        name
    }

    /// Look up the text of a Name.
    ///
    /// # Panics
    /// Panics if `name` came from a different interner.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table.read().strings[name.index()]
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference-counted handle to a [`StringInterner`].
///
/// The evaluator keeps one of these in its global root; the parser and the
/// backends hold their own clones.
#[derive(Clone, Default, Debug)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("width");
        let b = interner.intern("width");
        let c = interner.intern("height");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.lookup(a), "width");
        assert_eq!(interner.lookup(c), "height");
    }

    #[test]
    fn test_empty_is_preinterned() {
        let interner = StringInterner::new();
        assert!(interner.is_empty());
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.lookup(Name::EMPTY), "");
    }

    #[test]
    fn test_shared_interner_clones_share_table() {
        let shared = SharedInterner::new();
        let other = shared.clone();
        let name = shared.intern("x");
        assert_eq!(other.lookup(name), "x");
        assert_eq!(other.len(), 2);
    }
}
