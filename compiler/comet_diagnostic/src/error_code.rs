//! Error codes for evaluation diagnostics.

use std::fmt;

/// Error codes reported by the compile-time evaluator.
///
/// Format: E#### where the first digit indicates the phase:
/// - E6xxx: compile-time evaluation errors
/// - E9xxx: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Free-form comptime evaluation error
    E6000,
    /// Integer division by zero
    E6001,
    /// Integer modulo by zero
    E6002,
    /// Operator not supported for the operand kinds
    E6003,
    /// Operation between values of unknown kind
    E6004,
    /// Name not bound in any enclosing scope
    E6005,
    /// Invalid pointer operation
    E6006,
    /// Import could not be evaluated
    E6007,
    /// String slice out of bounds
    E6008,
    /// Invalid cast
    E6009,
    /// Shift amount out of range
    E6010,
    /// Invalid call of a comptime function
    E6011,
    /// Comptime recursion or call budget exceeded
    E6012,
    /// Access to memory owned by a finished scope
    E6013,
    /// Internal compiler error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E6000 => "E6000",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E6008 => "E6008",
            ErrorCode::E6009 => "E6009",
            ErrorCode::E6010 => "E6010",
            ErrorCode::E6011 => "E6011",
            ErrorCode::E6012 => "E6012",
            ErrorCode::E6013 => "E6013",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line summary used by `--explain` style lookups.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E6000 => "comptime evaluation error",
            ErrorCode::E6001 => "integer division by zero",
            ErrorCode::E6002 => "integer modulo by zero",
            ErrorCode::E6003 => "operator not supported for these operands",
            ErrorCode::E6004 => "operation between values of unknown kind",
            ErrorCode::E6005 => "undefined name",
            ErrorCode::E6006 => "invalid pointer operation",
            ErrorCode::E6007 => "import failed",
            ErrorCode::E6008 => "string slice out of bounds",
            ErrorCode::E6009 => "invalid cast",
            ErrorCode::E6010 => "shift amount out of range",
            ErrorCode::E6011 => "invalid call",
            ErrorCode::E6012 => "comptime evaluation limit exceeded",
            ErrorCode::E6013 => "dangling reference",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "too many errors",
        }
    }

    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E6")
    }

    pub fn is_internal_error(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
