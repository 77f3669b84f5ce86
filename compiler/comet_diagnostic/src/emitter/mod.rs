//! Diagnostic emitters.
//!
//! Evaluation diagnostics are printed as plain text lines; there is no
//! machine-readable format.

mod text;

pub use text::TextEmitter;

use crate::Diagnostic;

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);

    /// Emit a summary of errors/warnings.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
