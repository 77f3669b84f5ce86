use std::fmt;

use comet_ir::Span;

use crate::{ErrorCode, FileId};

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A labeled span with a message.
///
/// `file` is `None` for labels on synthesized code, which the emitter prints
/// without a location.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub file: Option<FileId>,
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the main error location).
    pub fn primary(file: Option<FileId>, span: Span, message: impl Into<String>) -> Self {
        Label {
            file,
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(file: Option<FileId>, span: Span, message: impl Into<String>) -> Self {
        Label {
            file,
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic with all context needed to print it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code for searchability.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Main error message.
    pub message: String,
    pub labels: Vec<Label>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(
        mut self,
        file: Option<FileId>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::primary(file, span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(
        mut self,
        file: Option<FileId>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(file, span, message));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The first primary label, if any.
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.is_primary)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        Ok(())
    }
}
