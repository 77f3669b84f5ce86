//! RAII scope guard for the interpreter.
//!
//! [`ScopedInterpreter`] pops its scope when dropped, on normal exit, on
//! `?` propagation and during unwinding alike. It holds `&mut Interpreter`
//! and derefs to it, so code inside the scope keeps using the interpreter
//! directly.
//!
//! A guard asked to [`retain_in`](ScopedInterpreter::retain_in) another
//! scope hands its scope over to that scope instead of ending it.

use std::ops::{Deref, DerefMut};

use super::Interpreter;
use crate::ScopeId;

/// Guard owning one pushed scope.
pub struct ScopedInterpreter<'guard, 'p> {
    interpreter: &'guard mut Interpreter<'p>,
    scope: ScopeId,
    keeper: Option<ScopeId>,
}

impl ScopedInterpreter<'_, '_> {
    /// The scope this guard pushed.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Keep this scope alive until `keeper` ends instead of popping it
    /// when the guard drops.
    pub fn retain_in(&mut self, keeper: ScopeId) {
        self.keeper = Some(keeper);
    }
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        match self.keeper {
            Some(keeper) => self.interpreter.env.retain_scope(self.scope, keeper),
            None => self.interpreter.env.pop_scope(self.scope),
        }
    }
}

impl<'p> Deref for ScopedInterpreter<'_, 'p> {
    type Target = Interpreter<'p>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'p> Interpreter<'p> {
    /// Push a child of `parent` that is popped when the guard drops.
    pub fn scoped(&mut self, parent: ScopeId) -> ScopedInterpreter<'_, 'p> {
        let scope = self.env.push_scope(parent);
        ScopedInterpreter {
            interpreter: self,
            scope,
            keeper: None,
        }
    }

    /// Run `f` inside a new child of `parent`.
    pub fn with_scope<T>(
        &mut self,
        parent: ScopeId,
        f: impl FnOnce(&mut ScopedInterpreter<'_, 'p>) -> T,
    ) -> T {
        let mut scoped = self.scoped(parent);
        f(&mut scoped)
    }
}
