//! Evaluation errors.
//!
//! Every failure inside the evaluator is an [`EvalError`] travelling up
//! through `?` to the statement that started the evaluation, where the
//! diagnostics bridge reports it once. Factory functions build the common
//! cases.

use comet_diagnostic::{Diagnostic, ErrorCode, FileId};
use comet_ir::{BinaryOp, Span};

use crate::memory::MemoryError;
use crate::{Value, ValueKind};

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Arithmetic
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("shift amount {amount} is out of range for a {width}-bit integer")]
    InvalidShift { amount: i128, width: u32 },

    // Operators
    #[error("operator `{op}` cannot be applied to {operands}")]
    UnsupportedOperator { op: &'static str, operands: String },
    #[error("operation between values of unknown kind (`{lhs}` and `{rhs}`)")]
    UnknownKinds { lhs: ValueKind, rhs: ValueKind },
    #[error("type mismatch: expected {expected}, got `{got}`")]
    TypeMismatch { expected: &'static str, got: ValueKind },
    #[error("string slice offset {offset} is out of bounds for a string of length {len}")]
    SliceOutOfBounds { offset: i128, len: u64 },
    #[error("invalid pointer operation: {detail}")]
    InvalidPointerOp { detail: String },
    #[error("cannot cast `{from}` to `{to}`")]
    InvalidCast { from: ValueKind, to: String },

    // Names and calls
    #[error("undefined name `{name}`")]
    UndefinedName { name: String },
    #[error("`{name}` is not a comptime function")]
    NotCallable { name: String },
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("comptime call depth exceeded the limit of {limit}")]
    RecursionLimit { limit: u32 },
    #[error("comptime evaluation exceeded its budget of {budget} calls")]
    BudgetExceeded { budget: u32 },

    // Memory
    #[error(transparent)]
    Memory(#[from] MemoryError),

    // Imports
    #[error("cannot import `{path}`: {reason}")]
    Import { path: String, reason: String },

    /// A state type checking should have ruled out.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl EvalErrorKind {
    /// Map this error kind to its `ErrorCode`.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::DivisionByZero => ErrorCode::E6001,
            Self::ModuloByZero => ErrorCode::E6002,
            Self::UnsupportedOperator { .. } | Self::TypeMismatch { .. } => ErrorCode::E6003,
            Self::UnknownKinds { .. } => ErrorCode::E6004,
            Self::UndefinedName { .. } => ErrorCode::E6005,
            Self::InvalidPointerOp { .. } | Self::Memory(MemoryError::Null) => ErrorCode::E6006,
            Self::Import { .. } => ErrorCode::E6007,
            Self::SliceOutOfBounds { .. } => ErrorCode::E6008,
            Self::InvalidCast { .. } => ErrorCode::E6009,
            Self::InvalidShift { .. } => ErrorCode::E6010,
            Self::NotCallable { .. } | Self::ArityMismatch { .. } => ErrorCode::E6011,
            Self::RecursionLimit { .. }
            | Self::BudgetExceeded { .. }
            | Self::Memory(MemoryError::Exhausted) => ErrorCode::E6012,
            Self::Memory(_) => ErrorCode::E6013,
            Self::Internal { .. } => ErrorCode::E9001,
        }
    }

    /// Concise label for the primary span.
    pub fn primary_label(&self) -> &'static str {
        match self {
            Self::DivisionByZero => "divisor evaluates to zero",
            Self::ModuloByZero => "modulus evaluates to zero",
            Self::InvalidShift { .. } => "shift amount out of range",
            Self::UnsupportedOperator { .. } => "operator not supported",
            Self::UnknownKinds { .. } => "unsupported operand kinds",
            Self::TypeMismatch { .. } => "unexpected kind",
            Self::SliceOutOfBounds { .. } => "slice offset out of bounds",
            Self::InvalidPointerOp { .. } => "invalid pointer operation",
            Self::InvalidCast { .. } => "invalid cast",
            Self::UndefinedName { .. } => "not found in any enclosing scope",
            Self::NotCallable { .. } => "not callable",
            Self::ArityMismatch { .. } => "wrong number of arguments",
            Self::RecursionLimit { .. } => "recursion limit exceeded",
            Self::BudgetExceeded { .. } => "budget exceeded",
            Self::Memory(_) => "invalid memory access",
            Self::Import { .. } => "import failed",
            Self::Internal { .. } => "while evaluating this",
        }
    }
}

/// Evaluation error with its source location.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
    pub notes: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        EvalError {
            kind,
            span,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn error_code(&self) -> ErrorCode {
        self.kind.error_code()
    }

    /// Convert into a diagnostic located in `file`.
    #[cold]
    pub fn to_diagnostic(&self, file: Option<FileId>) -> Diagnostic {
        let mut diag = Diagnostic::error(self.error_code())
            .with_message(self.kind.to_string())
            .with_label(file, self.span, self.kind.primary_label());
        for note in &self.notes {
            diag = diag.with_note(note.clone());
        }
        if matches!(self.kind, EvalErrorKind::Internal { .. }) {
            diag = diag.with_note("this is a bug in the compiler; please report it");
        }
        diag
    }
}

// Factory functions

#[cold]
pub fn division_by_zero(span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero, span)
}

#[cold]
pub fn modulo_by_zero(span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::ModuloByZero, span)
}

#[cold]
pub fn invalid_shift(amount: i128, width: u32, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidShift { amount, width }, span)
}

#[cold]
pub fn unsupported_binary(op: BinaryOp, lhs: ValueKind, rhs: ValueKind, span: Span) -> EvalError {
    let operands = if lhs == rhs {
        format!("`{lhs}` operands")
    } else {
        format!("`{lhs}` and `{rhs}`")
    };
    EvalError::new(
        EvalErrorKind::UnsupportedOperator {
            op: op.as_symbol(),
            operands,
        },
        span,
    )
}

#[cold]
pub fn unsupported_unary(op: &'static str, operand: ValueKind, span: Span) -> EvalError {
    EvalError::new(
        EvalErrorKind::UnsupportedOperator {
            op,
            operands: format!("`{operand}`"),
        },
        span,
    )
}

#[cold]
pub fn unknown_kinds(lhs: ValueKind, rhs: ValueKind, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::UnknownKinds { lhs, rhs }, span)
}

#[cold]
pub fn type_mismatch(expected: &'static str, got: ValueKind, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::TypeMismatch { expected, got }, span)
}

#[cold]
pub fn slice_out_of_bounds(offset: i128, len: u64, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::SliceOutOfBounds { offset, len }, span)
}

#[cold]
pub fn invalid_pointer_op(detail: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidPointerOp {
            detail: detail.into(),
        },
        span,
    )
}

#[cold]
pub fn invalid_cast(from: ValueKind, to: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidCast {
            from,
            to: to.into(),
        },
        span,
    )
}

#[cold]
pub fn undefined_name(name: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedName { name: name.into() }, span)
}

#[cold]
pub fn not_callable(name: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable { name: name.into() }, span)
}

#[cold]
pub fn arity_mismatch(name: impl Into<String>, expected: usize, got: usize, span: Span) -> EvalError {
    EvalError::new(
        EvalErrorKind::ArityMismatch {
            name: name.into(),
            expected,
            got,
        },
        span,
    )
}

#[cold]
pub fn recursion_limit(limit: u32, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::RecursionLimit { limit }, span)
}

#[cold]
pub fn budget_exceeded(budget: u32, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::BudgetExceeded { budget }, span)
}

#[cold]
pub fn import_failed(path: impl Into<String>, reason: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(
        EvalErrorKind::Import {
            path: path.into(),
            reason: reason.into(),
        },
        span,
    )
}

#[cold]
pub fn memory_error(error: MemoryError, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::Memory(error), span)
}

#[cold]
pub fn internal(message: impl Into<String>, span: Span) -> EvalError {
    EvalError::new(
        EvalErrorKind::Internal {
            message: message.into(),
        },
        span,
    )
}
