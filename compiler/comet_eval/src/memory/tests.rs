use std::cell::Cell;
use std::rc::Rc;

use super::*;
use pretty_assertions::assert_eq;

struct DropCounter(Rc<Cell<usize>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

fn arena() -> ScopeArena {
    ScopeArena::new(ScopeId::ROOT)
}

#[test]
fn test_alloc_bytes_bumps_within_region() {
    let mut arena = arena();
    let a = arena.alloc_bytes(b"hello").unwrap();
    let b = arena.alloc_bytes(b"!").unwrap();

    assert_eq!(a, arena.base());
    assert_eq!(b.raw(), a.raw() + 5);
    assert_eq!(arena.read(a, 5).unwrap(), b"hello");
    assert_eq!(arena.read(a.checked_add(2).unwrap(), 3).unwrap(), b"llo");
    assert_eq!(arena.bytes_used(), 6);
}

#[test]
fn test_read_must_stay_in_one_allocation() {
    let mut arena = arena();
    let a = arena.alloc_bytes(b"abc").unwrap();
    arena.alloc_bytes(b"def").unwrap();

    assert!(arena.contains(a, 3));
    assert!(!arena.contains(a, 4));
    assert_eq!(
        arena.read(a, 4),
        Err(MemoryError::OutOfBounds { address: a, len: 4 })
    );
    assert!(!arena.contains(Address::new(1), 1));
}

#[test]
fn test_empty_allocation_is_readable() {
    let mut arena = arena();
    let a = arena.alloc_bytes(b"").unwrap();
    assert_eq!(arena.read(a, 0).unwrap(), b"");
}

#[test]
fn test_objects_dropped_once_with_arena() {
    let drops = Rc::new(Cell::new(0));
    let mut arena = arena();
    let id = arena.allocate(DropCounter(Rc::clone(&drops)));
    arena.allocate(DropCounter(Rc::clone(&drops)));

    assert!(arena.get(id).is_some());
    assert_eq!(arena.object_count(), 2);
    assert_eq!(drops.get(), 0);

    drop(arena);
    assert_eq!(drops.get(), 2);
}

#[test]
fn test_get_rejects_foreign_handles() {
    let mut arena = arena();
    let mut other = ScopeArena::new(ScopeId::ROOT.next().unwrap());
    let id = other.allocate(5u32);
    arena.allocate(7u32);
    assert_eq!(arena.get(id), None);
    assert_eq!(other.get(id), Some(&5));
}

#[test]
fn test_sentinel_runs_at_teardown() {
    let runs = Rc::new(Cell::new(0));
    let mut arena = arena();
    let counter = Rc::clone(&runs);
    let sentinel = DestructSentinel::new(move || counter.set(counter.get() + 1));
    assert_eq!(sentinel.kind(), crate::ValueKind::Destruct);
    arena.defer(sentinel);

    assert_eq!(arena.finalizer_count(), 1);
    assert_eq!(runs.get(), 0);
    drop(arena);
    assert_eq!(runs.get(), 1);
}
