//! Comptime function declarations and calls.

use std::rc::Rc;

use comet_ir::{Expr, FnDecl, Name, Span};
use smallvec::SmallVec;

use super::{Flow, Interpreter, Unwind};
use crate::errors::{
    arity_mismatch, budget_exceeded, memory_error, not_callable, recursion_limit, undefined_name,
};
use crate::memory::MemoryError;
use crate::{EvalContext, FunctionValue, ScopeId, Value};

impl Interpreter<'_> {
    /// Bind a `comptime fn` in the scope it is declared in.
    pub(crate) fn declare_fn(&mut self, decl: &Rc<FnDecl>, scope: ScopeId, span: Span) {
        let function = FunctionValue {
            decl: Rc::clone(decl),
            scope,
        };
        self.env.declare_in(scope, decl.name, Value::function(function, span));
    }

    /// Call the comptime function bound to `callee`.
    ///
    /// Arguments are evaluated left to right in the caller's scope. The
    /// body runs in a child of the scope the function was declared in, and
    /// its result is promoted into the caller's scope.
    #[tracing::instrument(level = "debug", skip_all, fields(depth = ctx.depth()))]
    pub(crate) fn call(
        &mut self,
        callee: Name,
        args: &[Expr],
        span: Span,
        scope: ScopeId,
        ctx: &EvalContext<'_>,
    ) -> Flow {
        let name = self.root.interner().lookup(callee);
        let Some(value) = self.env.find_from(scope, callee) else {
            return Err(undefined_name(name, span).into());
        };
        if value.is_poison() {
            return Ok(Value::poison(span));
        }
        let Some(function) = value.as_function().cloned() else {
            return Err(not_callable(name, span).into());
        };
        let params = &function.decl.params;
        if params.len() != args.len() {
            return Err(arity_mismatch(name, params.len(), args.len(), span).into());
        }

        let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expr(arg, scope, ctx)?;
            if value.is_poison() {
                return Ok(Value::poison(span));
            }
            values.push(value);
        }

        if ctx.depth() >= self.config.max_call_depth {
            return Err(recursion_limit(self.config.max_call_depth, span).into());
        }
        if self.calls_made >= self.config.call_budget {
            return Err(budget_exceeded(self.config.call_budget, span).into());
        }
        self.calls_made += 1;
        if !self.env.is_live(function.scope) {
            let err = MemoryError::DeadScope {
                scope: function.scope,
            };
            return Err(memory_error(err, span).into());
        }
        tracing::debug!(function = name, args = values.len(), "call");

        let inner = ctx.enter_call();
        let mut scoped = self.scoped(function.scope);
        let body_scope = scoped.scope();
        for (param, value) in params.iter().zip(values) {
            scoped.env.declare_in(body_scope, param.name, value);
        }
        let result = match scoped.run_stmts(&function.decl.body.stmts, body_scope, &inner) {
            Ok(value) | Err(Unwind::Return(value)) => value,
            Err(err) => return Err(err),
        };
        let result = scoped
            .env
            .promote(result.with_span(span), scope)
            .map_err(|err| memory_error(err, span))?;
        Ok(result)
    }
}
