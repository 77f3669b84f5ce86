//! Diagnostic queue: the single sink evaluation errors end up in.
//!
//! Features:
//! - Error limit so a broken `comptime` loop cannot flood the output
//! - Deduplication of identical back-to-back diagnostics
//! - `ErrorGuaranteed` proof that errors were emitted

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to the previous one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 50,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Ordered collection of reported diagnostics.
///
/// Diagnostics are kept in emission order, which for the evaluator is
/// evaluation order: depth-first, left to right.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    /// Errors dropped after the limit was reached.
    suppressed: usize,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            warning_count: 0,
            suppressed: 0,
            config,
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            self.suppressed += 1;
            return false;
        }

        if self.config.deduplicate && self.diagnostics.last() == Some(&diag) {
            return false;
        }

        if is_error {
            self.error_count += 1;
        } else if matches!(diag.severity, crate::Severity::Warning) {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);

        if is_error && self.limit_reached() {
            self.diagnostics.push(too_many_errors(self.config.error_limit));
        }
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// The proof is returned even when the diagnostic itself was filtered:
    /// filtering only happens when an equivalent error is already queued.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with a non-error diagnostic");
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// `Some` if at least one error was emitted.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        if self.error_count > 0 {
            Some(ErrorGuaranteed::new())
        } else {
            None
        }
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Number of errors dropped because of the error limit.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed
    }

    /// Take all diagnostics, resetting the queue.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        self.suppressed = 0;
        std::mem::take(&mut self.diagnostics)
    }

    /// Get diagnostics without clearing the queue.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting evaluation after {limit} errors"))
        .with_note("further errors are suppressed; raise the error limit to see them")
}
