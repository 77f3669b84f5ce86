//! Scope chain for compile-time evaluation.
//!
//! Scopes live in one stack owned by the [`Environment`], innermost last.
//! Each frame names its parent by [`ScopeId`] instead of holding a
//! reference, so a function body can hang off the scope it was declared in
//! rather than off the caller. Scope ids grow monotonically and are never
//! reused, which keeps the stack sorted by id and makes a stale id (or an
//! address inside a finished scope's region) detectable.
//!
//! A scope can also be retained by a live scope instead of popped
//! ([`Environment::retain_scope`]). It then leaves the stack but keeps its
//! bindings and memory until the retaining scope is popped. Imported
//! modules use this so their functions keep resolving names through the
//! module's own bindings.

use std::fmt;

use comet_ir::Name;
use rustc_hash::FxHashMap;

use crate::memory::{DestructSentinel, MemoryError, ObjectId, ScopeArena, REGION_SIZE};
use crate::{Address, StrView, Value, ValueKind};

/// Identifier of a scope.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global root scope. It has no parent.
    pub const ROOT: ScopeId = ScopeId(0);

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Start of the address region owned by this scope.
    pub const fn region_base(self) -> Address {
        Address::new((self.0 as u64 + 1) * REGION_SIZE)
    }

    /// Scope owning the region `address` falls in.
    pub fn owning(address: Address) -> Option<ScopeId> {
        let region = address.raw() / REGION_SIZE;
        let id = region.checked_sub(1)?;
        u32::try_from(id).ok().map(ScopeId)
    }

    pub(crate) fn next(self) -> Option<ScopeId> {
        // The last id would place its region past the end of the address space.
        self.0.checked_add(1).filter(|&id| id < u32::MAX).map(ScopeId)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// One scope: bindings, parent link and owned memory.
struct Frame {
    id: ScopeId,
    parent: Option<ScopeId>,
    bindings: FxHashMap<Name, Value>,
    arena: ScopeArena,
    /// Finished scopes kept alive until this one ends.
    retained: Vec<Frame>,
}

impl Frame {
    fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
        Frame {
            id,
            parent,
            bindings: FxHashMap::default(),
            arena: ScopeArena::new(id),
            retained: Vec::new(),
        }
    }

    fn find_retained(&self, scope: ScopeId) -> Option<&Frame> {
        self.retained.iter().find_map(|frame| {
            if frame.id == scope {
                Some(frame)
            } else {
                frame.find_retained(scope)
            }
        })
    }

    fn find_retained_mut(&mut self, scope: ScopeId) -> Option<&mut Frame> {
        self.retained.iter_mut().find_map(|frame| {
            if frame.id == scope {
                Some(frame)
            } else {
                frame.find_retained_mut(scope)
            }
        })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        // Retained scopes end before the scope keeping them, newest first.
        while self.retained.pop().is_some() {}
    }
}

/// Stack of live scopes, with the root at the bottom.
pub struct Environment {
    frames: Vec<Frame>,
    last_id: ScopeId,
}

impl Environment {
    /// Create an environment holding only the root scope.
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::new(ScopeId::ROOT, None)],
            last_id: ScopeId::ROOT,
        }
    }

    /// Innermost live scope.
    pub fn current(&self) -> ScopeId {
        self.frames.last().map_or(ScopeId::ROOT, |frame| frame.id)
    }

    /// Number of live scopes, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_live(&self, scope: ScopeId) -> bool {
        self.frame(scope).is_some()
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.frame(scope).and_then(|frame| frame.parent)
    }

    /// Push a new scope whose lookups fall back to `parent`.
    ///
    /// # Panics
    /// Panics if `parent` is not live or the scope id space is exhausted.
    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        assert!(self.is_live(parent), "push_scope: parent {parent} is not live");
        let id = self
            .last_id
            .next()
            .unwrap_or_else(|| panic!("comptime scope ids exhausted"));
        self.last_id = id;
        self.frames.push(Frame::new(id, Some(parent)));
        tracing::debug!(scope = %id, parent = %parent, depth = self.frames.len(), "push scope");
        id
    }

    /// Push a child of the current scope.
    pub fn push_child(&mut self) -> ScopeId {
        self.push_scope(self.current())
    }

    /// Pop the innermost scope, running its finalizers.
    ///
    /// # Panics
    /// Panics if `scope` is not the innermost scope or is the root. Scopes
    /// are only popped by the guards that pushed them, so either case is a
    /// bug in the evaluator.
    pub fn pop_scope(&mut self, scope: ScopeId) {
        if let Some(frame) = self.take_innermost(scope) {
            tracing::debug!(
                scope = %frame.id,
                objects = frame.arena.object_count(),
                finalizers = frame.arena.finalizer_count(),
                retained = frame.retained.len(),
                bytes = frame.arena.bytes_used(),
                "pop scope"
            );
        }
    }

    /// Take the innermost scope off the stack without ending it: it stays
    /// reachable by id, with its bindings and memory, until `keeper` is
    /// popped.
    ///
    /// Falls back to popping `scope` if `keeper` is not live.
    ///
    /// # Panics
    /// Panics under the same conditions as [`Environment::pop_scope`].
    pub fn retain_scope(&mut self, scope: ScopeId, keeper: ScopeId) {
        let Some(frame) = self.take_innermost(scope) else {
            return;
        };
        match self.frame_mut(keeper) {
            Some(keeper_frame) => {
                tracing::debug!(scope = %scope, keeper = %keeper, "retain scope");
                keeper_frame.retained.push(frame);
            }
            None => {
                tracing::debug!(scope = %scope, keeper = %keeper, "keeper gone, dropping scope");
            }
        }
    }

    fn take_innermost(&mut self, scope: ScopeId) -> Option<Frame> {
        assert!(scope != ScopeId::ROOT, "pop_scope: cannot pop the root scope");
        assert_eq!(self.current(), scope, "pop_scope: scopes must be popped innermost first");
        self.frames.pop()
    }

    /// Bind `name` in the current scope, replacing any binding there.
    pub fn declare(&mut self, name: Name, value: Value) {
        let current = self.current();
        self.declare_in(current, name, value);
    }

    /// Bind `name` in `scope` only. Returns `false` if `scope` is not live.
    pub fn declare_in(&mut self, scope: ScopeId, name: Name, value: Value) -> bool {
        match self.frame_mut(scope) {
            Some(frame) => {
                frame.bindings.insert(name, value);
                true
            }
            None => false,
        }
    }

    /// Look `name` up from the current scope outwards.
    pub fn find(&self, name: Name) -> Option<&Value> {
        self.find_from(self.current(), name)
    }

    /// Look `name` up from `scope` outwards through its parents.
    pub fn find_from(&self, scope: ScopeId, name: Name) -> Option<&Value> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let frame = self.frame(id)?;
            if let Some(value) = frame.bindings.get(&name) {
                return Some(value);
            }
            cursor = frame.parent;
        }
        None
    }

    /// Remove the nearest binding of `name` visible from the current scope.
    pub fn erase(&mut self, name: Name) -> bool {
        self.erase_from(self.current(), name)
    }

    /// Remove the nearest binding of `name` visible from `scope`.
    ///
    /// A missing binding is not an error: an earlier failure may already
    /// have dropped it. It is logged and `false` is returned.
    pub fn erase_from(&mut self, scope: ScopeId, name: Name) -> bool {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let Some(frame) = self.frame_mut(id) else {
                break;
            };
            if frame.bindings.remove(&name).is_some() {
                return true;
            }
            cursor = frame.parent;
        }
        tracing::warn!(name = name.raw(), scope = %scope, "erase of a name with no binding");
        false
    }

    /// Bindings declared directly in `scope`.
    pub fn bindings(&self, scope: ScopeId) -> impl Iterator<Item = (Name, &Value)> {
        self.frame(scope)
            .into_iter()
            .flat_map(|frame| frame.bindings.iter().map(|(name, value)| (*name, value)))
    }

    /// Store `value` in the current scope until it ends.
    pub fn allocate<T: 'static>(&mut self, value: T) -> ObjectId<T> {
        let current = self.current();
        self.frames
            .last_mut()
            .map(|frame| frame.arena.allocate(value))
            .unwrap_or_else(|| panic!("environment has no live scope ({current})"))
    }

    /// Store `value` in another live scope, typically an enclosing one, so
    /// it outlives the scope that produced it.
    pub fn allocate_in<T: 'static>(
        &mut self,
        scope: ScopeId,
        value: T,
    ) -> Result<ObjectId<T>, MemoryError> {
        self.frame_mut(scope)
            .map(|frame| frame.arena.allocate(value))
            .ok_or(MemoryError::DeadScope { scope })
    }

    pub fn object<T: 'static>(&self, id: ObjectId<T>) -> Option<&T> {
        self.frame(id.scope())?.arena.get(id)
    }

    /// Register a finalizer with `scope`.
    pub fn defer(&mut self, scope: ScopeId, sentinel: DestructSentinel) -> Result<(), MemoryError> {
        let frame = self.frame_mut(scope).ok_or(MemoryError::DeadScope { scope })?;
        frame.arena.defer(sentinel);
        Ok(())
    }

    /// Copy string bytes into `scope` and return a view of them.
    pub fn alloc_str(&mut self, scope: ScopeId, text: &[u8]) -> Result<StrView, MemoryError> {
        let frame = self.frame_mut(scope).ok_or(MemoryError::DeadScope { scope })?;
        let address = frame.arena.alloc_bytes(text)?;
        Ok(StrView::new(address, text.len() as u64))
    }

    /// Bounds-checked read of live comptime memory.
    pub fn read(&self, address: Address, len: u64) -> Result<&[u8], MemoryError> {
        if address == Address::NULL {
            return Err(MemoryError::Null);
        }
        let owner = ScopeId::owning(address).ok_or(MemoryError::OutOfBounds { address, len })?;
        let frame = self.frame(owner).ok_or(MemoryError::Dangling { address })?;
        frame.arena.read(address, len)
    }

    /// Bytes behind a string view.
    pub fn str_bytes(&self, view: StrView) -> Result<&[u8], MemoryError> {
        self.read(view.address(), view.len())
    }

    /// Make `value` safe to hand to `target`, which outlives the scope
    /// that produced it.
    ///
    /// Strings whose bytes live in a scope inner to `target` are copied
    /// into `target`. Pointers into such a scope cannot be fixed up and are
    /// rejected. Everything else is returned as is.
    pub fn promote(&mut self, value: Value, target: ScopeId) -> Result<Value, MemoryError> {
        match value.kind() {
            ValueKind::String => {
                let Some(view) = value.as_str_view() else {
                    return Ok(value);
                };
                if !self.outlives(view.address(), target) {
                    let bytes = self.str_bytes(view)?.to_vec();
                    let copy = self.alloc_str(target, &bytes)?;
                    return Ok(Value::string(copy, value.span()));
                }
                Ok(value)
            }
            ValueKind::Pointer => {
                let address = value.as_pointer().map(crate::PointerValue::address);
                match address {
                    Some(address) if !self.outlives(address, target) => {
                        Err(MemoryError::Escapes { address })
                    }
                    _ => Ok(value),
                }
            }
            _ => Ok(value),
        }
    }

    /// Whether the memory at `address` stays alive at least as long as `scope`.
    fn outlives(&self, address: Address, scope: ScopeId) -> bool {
        // A live scope with a larger id than the owner was pushed while the
        // owner was alive, so it ends first. A retained owner ends with its
        // keeper, which sits below every such scope on the stack.
        ScopeId::owning(address).is_some_and(|owner| owner <= scope)
    }

    fn frame(&self, scope: ScopeId) -> Option<&Frame> {
        match self.frames.binary_search_by_key(&scope, |frame| frame.id) {
            Ok(index) => self.frames.get(index),
            Err(_) => self.frames.iter().find_map(|frame| frame.find_retained(scope)),
        }
    }

    fn frame_mut(&mut self, scope: ScopeId) -> Option<&mut Frame> {
        match self.frames.binary_search_by_key(&scope, |frame| frame.id) {
            Ok(index) => self.frames.get_mut(index),
            Err(_) => self.frames.iter_mut().find_map(|frame| frame.find_retained_mut(scope)),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Environment {
    fn drop(&mut self) {
        // Innermost first, matching the order scopes would have been popped.
        while self.frames.pop().is_some() {}
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.frames.iter().map(|frame| (frame.id, frame.parent, &frame.arena)))
            .finish()
    }
}
