//! Tree-walking comptime interpreter.
//!
//! Evaluation is driven by [`Interpreter::interpret_block`]: the block runs
//! in a fresh child scope, and a failing statement is reported once through
//! the bridge and replaced by `Poison` so the rest of the block still runs. Below statement level, errors travel up with `?`.
//!
//! # Scopes
//!
//! Every block, call and imported file gets its own scope through a
//! [`ScopedInterpreter`] guard, which pops it on every exit path. A result
//! leaving a scope is promoted into the receiving scope first, so string
//! bytes never outlive their arena.
//!
//! Helper modules:
//! - `expr` - expressions, including `Deref`
//! - `call` - comptime function calls
//! - `import` - file imports

mod builder;
mod call;
mod expr;
mod import;
mod scope_guard;

use comet_diagnostic::{Diagnostic, FileId};
use comet_ir::{Block, Expr, Name, SharedInterner, Stmt, StmtKind};

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use crate::bridge::{self, Subject};
use crate::errors::{memory_error, EvalError, EvalResult};
use crate::{EvalConfig, EvalContext, Environment, GlobalRoot, MemoryError, ScopeId, Value};

/// Parses an imported file.
///
/// The evaluator does not parse source itself; imports hand the file text
/// to whichever front end the driver plugs in here.
pub trait ModuleParser {
    fn parse(
        &self,
        file: FileId,
        source: &str,
        interner: &SharedInterner,
    ) -> Result<Block, Vec<Diagnostic>>;
}

/// An AST node that reduces to a comptime value.
pub trait ValueNode {
    fn reduce(
        &self,
        interp: &mut Interpreter<'_>,
        scope: ScopeId,
        ctx: &EvalContext<'_>,
    ) -> EvalResult;
}

impl ValueNode for Expr {
    fn reduce(
        &self,
        interp: &mut Interpreter<'_>,
        scope: ScopeId,
        ctx: &EvalContext<'_>,
    ) -> EvalResult {
        match interp.eval_expr(self, scope, ctx) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(err)) => Err(err),
        }
    }
}

/// Non-local exit from an expression.
#[derive(Debug)]
pub(crate) enum Unwind {
    Error(EvalError),
    /// `return` leaving the innermost function or driver block.
    Return(Value),
}

impl From<EvalError> for Unwind {
    fn from(err: EvalError) -> Self {
        Unwind::Error(err)
    }
}

pub(crate) type Flow<T = Value> = Result<T, Unwind>;

/// The comptime interpreter of one compilation.
pub struct Interpreter<'p> {
    pub(crate) root: GlobalRoot,
    pub(crate) env: Environment,
    parser: Option<&'p dyn ModuleParser>,
    config: EvalConfig,
    /// Comptime calls made so far, checked against the call budget.
    calls_made: u32,
}

impl<'p> Interpreter<'p> {
    pub fn new(root: GlobalRoot) -> Self {
        InterpreterBuilder::new(root).build()
    }

    pub fn root(&self) -> &GlobalRoot {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut GlobalRoot {
        &mut self.root
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Finish evaluation, handing back the root and its diagnostics.
    pub fn into_root(self) -> GlobalRoot {
        self.root
    }

    /// Bind `name` in the root scope.
    pub fn declare_global(&mut self, name: Name, value: Value) {
        self.env.declare_in(ScopeId::ROOT, name, value);
    }

    /// Run `block` in a new child of `parent` and return its value,
    /// promoted into `parent`.
    ///
    /// Statement errors are reported and evaluation continues; the block's
    /// value is `Poison` if its last statement failed. A `parent` that has
    /// already ended is reported as a dead scope and yields `Poison`.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %ctx.file(), parent = %parent))]
    pub fn interpret_block(&mut self, block: &Block, parent: ScopeId, ctx: &EvalContext<'_>) -> Value {
        if !self.env.is_live(parent) {
            let err = memory_error(MemoryError::DeadScope { scope: parent }, block.span);
            return bridge::poison(&mut self.root, ctx, &err);
        }
        let mut scoped = self.scoped(parent);
        let scope = scoped.scope();
        let value = scoped.run_reporting(&block.stmts, scope, ctx);
        match scoped.env.promote(value, parent) {
            Ok(value) => value,
            Err(err) => bridge::poison(&mut scoped.root, ctx, &memory_error(err, block.span)),
        }
    }

    /// Evaluate `expr` for a backend that needs its value.
    ///
    /// Returns `None` once the failure has been reported.
    pub fn evaluate_constant(
        &mut self,
        expr: &Expr,
        scope: ScopeId,
        ctx: &EvalContext<'_>,
    ) -> Option<Value> {
        match expr.reduce(self, scope, ctx) {
            Ok(value) if value.is_poison() => None,
            Ok(value) => Some(value),
            Err(err) => {
                bridge::report(&mut self.root, ctx, &err);
                None
            }
        }
    }

    /// Evaluate an array length: a non-negative integer constant.
    pub fn evaluate_array_length(
        &mut self,
        expr: &Expr,
        scope: ScopeId,
        ctx: &EvalContext<'_>,
    ) -> Option<u64> {
        let value = self.evaluate_constant(expr, scope, ctx)?;
        let length = value.int_value().and_then(|n| u64::try_from(n).ok());
        if length.is_none() {
            let message = format!(
                "array length must be a non-negative integer, found `{value}` of kind `{}`",
                value.kind()
            );
            bridge::error(&mut self.root, ctx, message, Subject::Value(&value));
        }
        length
    }

    /// Run statements in `scope`, reporting each failure and carrying on.
    ///
    /// A failed `let` still binds its name, to `Poison`, so later uses of
    /// it stay silent.
    fn run_reporting(&mut self, stmts: &[Stmt], scope: ScopeId, ctx: &EvalContext<'_>) -> Value {
        let mut last = Value::void(comet_ir::Span::DUMMY);
        for stmt in stmts {
            match self.exec_stmt(stmt, scope, ctx) {
                Ok(value) => last = value,
                Err(Unwind::Return(value)) => return value,
                Err(Unwind::Error(err)) => {
                    last = bridge::poison(&mut self.root, ctx, &err);
                    if let StmtKind::Let { name, .. } = &stmt.kind {
                        self.env.declare_in(scope, *name, last.clone());
                    }
                }
            }
        }
        last
    }

    /// Run statements in `scope`, stopping at the first error.
    fn run_stmts(&mut self, stmts: &[Stmt], scope: ScopeId, ctx: &EvalContext<'_>) -> Flow {
        let mut last = Value::void(comet_ir::Span::DUMMY);
        for stmt in stmts {
            last = self.exec_stmt(stmt, scope, ctx)?;
        }
        Ok(last)
    }

    /// Nested block: its own scope, value promoted into `parent`.
    pub(crate) fn run_block(&mut self, block: &Block, parent: ScopeId, ctx: &EvalContext<'_>) -> Flow {
        let mut scoped = self.scoped(parent);
        let scope = scoped.scope();
        let result = scoped.run_stmts(&block.stmts, scope, ctx);
        let promote = |env: &mut Environment, value: Value| {
            env.promote(value, parent)
                .map_err(|err| Unwind::Error(memory_error(err, block.span)))
        };
        match result {
            Ok(value) => promote(&mut scoped.env, value),
            Err(Unwind::Return(value)) => Err(Unwind::Return(promote(&mut scoped.env, value)?)),
            Err(err) => Err(err),
        }
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: ScopeId, ctx: &EvalContext<'_>) -> Flow {
        let void = Value::void(stmt.span);
        match &stmt.kind {
            StmtKind::Let { name, init } => {
                let value = self.eval_expr(init, scope, ctx)?;
                self.env.declare_in(scope, *name, value);
                Ok(void)
            }
            StmtKind::Expr(expr) => self.eval_expr(expr, scope, ctx),
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, scope, ctx)?,
                    None => void,
                };
                Err(Unwind::Return(value))
            }
            StmtKind::Fn(decl) => {
                self.declare_fn(decl, scope, stmt.span);
                Ok(void)
            }
            StmtKind::Import { path } => {
                self.import(path, stmt.span, scope, ctx)?;
                Ok(void)
            }
        }
    }
}

impl std::fmt::Debug for Interpreter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("env", &self.env)
            .field("config", &self.config)
            .field("calls_made", &self.calls_made)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
