//! Native stack growth for deep comptime recursion.
//!
//! Nested blocks, calls and imports all recurse on the host stack. Every
//! recursive entry point of the interpreter goes through
//! [`ensure_sufficient_stack`] so a deeply nested comptime program grows
//! the stack instead of overflowing it.

/// Grow when less than this remains (100 KiB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1 MiB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
