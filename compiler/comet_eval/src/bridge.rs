//! Bridge from evaluation failures to the diagnostic sink.
//!
//! Evaluation code never talks to the [`DiagnosticQueue`](comet_diagnostic::DiagnosticQueue)
//! directly. Free-form errors go through [`error`], typed [`EvalError`]s
//! through [`report`]; both attach the current file from the context and
//! hand back an [`ErrorGuaranteed`].

use std::borrow::Cow;

use comet_diagnostic::ErrorGuaranteed;
use comet_ir::{Expr, Span, Ty};

use crate::errors::EvalError;
use crate::{EvalContext, GlobalRoot, Value};

/// What an error is about.
#[derive(Copy, Clone, Debug)]
pub enum Subject<'a> {
    Value(&'a Value),
    Node(&'a Expr),
    Type { ty: &'a Ty, span: Span },
}

impl Subject<'_> {
    pub fn span(&self) -> Span {
        match self {
            Subject::Value(value) => value.span(),
            Subject::Node(expr) => expr.span,
            Subject::Type { span, .. } => *span,
        }
    }
}

/// Report `message` about `subject`.
///
/// Literal messages are passed through without allocating.
pub fn error(
    root: &mut GlobalRoot,
    ctx: &EvalContext<'_>,
    message: impl Into<Cow<'static, str>>,
    subject: Subject<'_>,
) -> ErrorGuaranteed {
    let message = message.into();
    match subject {
        Subject::Value(value) => root.error_at_value(ctx, &message, value),
        Subject::Node(expr) => root.error_at_node(ctx, &message, expr),
        Subject::Type { ty, span } => root.error_at_type(ctx, &message, ty, span),
    }
}

/// Report a typed evaluation error.
pub fn report(root: &mut GlobalRoot, ctx: &EvalContext<'_>, err: &EvalError) -> ErrorGuaranteed {
    tracing::debug!(code = %err.error_code(), error = %err, "reporting evaluation error");
    root.emit_error(err.to_diagnostic(Some(ctx.file())))
}

/// Report `err` and produce the `Poison` that replaces the failed value.
pub fn poison(root: &mut GlobalRoot, ctx: &EvalContext<'_>, err: &EvalError) -> Value {
    report(root, ctx, err);
    Value::poison(err.span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::division_by_zero;
    use crate::TargetInfo;
    use comet_diagnostic::ErrorCode;
    use comet_ir::{IntTy, SharedInterner};
    use pretty_assertions::assert_eq;

    fn root_and_file() -> (GlobalRoot, EvalContext<'static>) {
        let mut root = GlobalRoot::new(TargetInfo::host(), SharedInterner::new());
        let file = root.sources_mut().add("bridge.cm", "comptime { 1 / 0 }");
        (root, EvalContext::new(file))
    }

    #[test]
    fn test_error_accepts_borrowed_and_owned_messages() {
        let (mut root, ctx) = root_and_file();
        let expr = Expr::int(1, IntTy::I32, Span::new(11, 12));
        error(&mut root, &ctx, "literal message", Subject::Node(&expr));
        error(
            &mut root,
            &ctx,
            format!("owned message {}", 2),
            Subject::Type {
                ty: &Ty::Bool,
                span: Span::new(0, 8),
            },
        );

        let diags = root.take_diagnostics();
        assert_eq!(diags[0].message, "literal message");
        assert_eq!(diags[0].labels[0].span, Span::new(11, 12));
        assert_eq!(diags[1].message, "owned message 2");
        assert_eq!(diags[1].code, ErrorCode::E6000);
    }

    #[test]
    fn test_report_yields_poison_at_error_span() {
        let (mut root, ctx) = root_and_file();
        let value = poison(&mut root, &ctx, &division_by_zero(Span::new(11, 16)));
        assert!(value.is_poison());
        assert_eq!(value.span(), Span::new(11, 16));

        let diags = root.take_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, ErrorCode::E6001);
        assert_eq!(diags[0].labels[0].file, Some(ctx.file()));
    }
}
