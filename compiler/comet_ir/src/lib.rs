//! Intermediate representation shared by the Comet front end and the
//! compile-time evaluator.
//!
//! The evaluator only needs a small, already type-checked slice of the
//! language: literals, identifiers, operators, casts, blocks, `comptime`
//! function declarations and imports. Parsing and name resolution happen
//! elsewhere and hand their output over in these types.

pub mod ast;
mod interner;
mod name;
mod span;
mod ty;

pub use ast::{
    BinaryOp, Block, Expr, ExprKind, FnDecl, Literal, Param, Stmt, StmtKind, UnaryOp,
};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use ty::{FloatTy, IntTy, Ty};
