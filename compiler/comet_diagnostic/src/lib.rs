//! Diagnostic system for compile-time evaluation errors.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Labels tying the message to a file and span (where it went wrong)
//! - Notes with extra context
//!
//! # Error Guarantees
//!
//! [`ErrorGuaranteed`] is type-level proof that at least one error was
//! emitted. It can only be obtained from [`DiagnosticQueue`].

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;
mod source_map;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use source_map::{FileId, SourceFile, SourceMap};
