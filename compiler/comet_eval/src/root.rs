//! The global root: state shared by one whole compilation.

use comet_diagnostic::{
    Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode, ErrorGuaranteed, SourceMap,
};
use comet_ir::{Expr, SharedInterner, Span, Ty};

use crate::{EvalContext, TargetInfo, Value};

/// Root of every evaluation in a compilation.
///
/// Holds the target facts, the registered sources, the interner and the
/// diagnostic sink. The current file is not stored here; it travels in the
/// [`EvalContext`] handed to each reporting call.
#[derive(Debug)]
pub struct GlobalRoot {
    target: TargetInfo,
    sources: SourceMap,
    diagnostics: DiagnosticQueue,
    interner: SharedInterner,
}

impl GlobalRoot {
    pub fn new(target: TargetInfo, interner: SharedInterner) -> Self {
        Self::with_config(target, interner, DiagnosticConfig::default())
    }

    pub fn with_config(
        target: TargetInfo,
        interner: SharedInterner,
        config: DiagnosticConfig,
    ) -> Self {
        GlobalRoot {
            target,
            sources: SourceMap::new(),
            diagnostics: DiagnosticQueue::with_config(config),
            interner,
        }
    }

    #[inline]
    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    #[inline]
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut SourceMap {
        &mut self.sources
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    /// Report an error at the location of a value.
    pub fn error_at_value(
        &mut self,
        ctx: &EvalContext<'_>,
        message: &str,
        value: &Value,
    ) -> ErrorGuaranteed {
        self.error_at(ctx, message, value.span(), "this value")
    }

    /// Report an error at an expression.
    pub fn error_at_node(
        &mut self,
        ctx: &EvalContext<'_>,
        message: &str,
        expr: &Expr,
    ) -> ErrorGuaranteed {
        self.error_at(ctx, message, expr.span, "in this expression")
    }

    /// Report an error about a type written at `span`.
    pub fn error_at_type(
        &mut self,
        ctx: &EvalContext<'_>,
        message: &str,
        ty: &Ty,
        span: Span,
    ) -> ErrorGuaranteed {
        let label = format!("type `{ty}`");
        self.error_at(ctx, message, span, &label)
    }

    fn error_at(
        &mut self,
        ctx: &EvalContext<'_>,
        message: &str,
        span: Span,
        label: &str,
    ) -> ErrorGuaranteed {
        let diag = Diagnostic::error(ErrorCode::E6000)
            .with_message(message)
            .with_label(Some(ctx.file()), span, label);
        self.emit_error(diag)
    }

    /// Append a diagnostic of any severity. Returns `false` if it was
    /// filtered by the queue.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        tracing::debug!(code = %diag.code, message = %diag.message, "diagnostic");
        self.diagnostics.add(diag)
    }

    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        tracing::debug!(code = %diag.code, message = %diag.message, "error");
        self.diagnostics.emit_error(diag)
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.diagnostics.has_errors()
    }

    /// Take every diagnostic reported so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.flush()
    }
}
