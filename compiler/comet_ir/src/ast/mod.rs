//! Type-checked AST handed to the compile-time evaluator.
//!
//! Identifiers are already resolved and every literal carries its final
//! type, so the evaluator never re-validates what it is given.

mod operators;

use std::rc::Rc;

pub use operators::{BinaryOp, UnaryOp};

use crate::{FloatTy, IntTy, Name, Span, Ty};

/// Literal values.
#[derive(Clone, PartialEq, Debug)]
pub enum Literal {
    Void,
    Bool(bool),
    /// Integer literal. `value` holds the bit pattern; negative literals are
    /// expressed as a negation of a positive one.
    Int { value: u64, ty: IntTy },
    Float { value: f64, ty: FloatTy },
    Str(String),
    Null,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    Literal(Literal),
    Ident(Name),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `expr as ty`
    Cast {
        expr: Box<Expr>,
        ty: Ty,
    },
    /// `expr is ty`
    Is {
        expr: Box<Expr>,
        ty: Ty,
    },
    If {
        cond: Box<Expr>,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    Block(Block),
    /// `comptime { ... }`
    Comptime(Block),
    /// Call of a `comptime` function by name.
    Call {
        callee: Name,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn literal(literal: Literal, span: Span) -> Self {
        Expr::new(ExprKind::Literal(literal), span)
    }

    pub fn int(value: u64, ty: IntTy, span: Span) -> Self {
        Expr::literal(Literal::Int { value, ty }, span)
    }

    pub fn string(text: impl Into<String>, span: Span) -> Self {
        Expr::literal(Literal::Str(text.into()), span)
    }

    pub fn ident(name: Name, span: Span) -> Self {
        Expr::new(ExprKind::Ident(name), span)
    }

    /// Binary expression spanning both operands.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let span = lhs.span.merge(rhs.span);
        Expr::new(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        )
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Block { stmts, span }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum StmtKind {
    Let { name: Name, init: Expr },
    Expr(Expr),
    Return(Option<Expr>),
    /// `comptime fn` declaration.
    Fn(Rc<FnDecl>),
    /// `import "path"`, relative to the importing file.
    Import { path: String },
}

#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Ty,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FnDecl {
    pub name: Name,
    pub params: Vec<Param>,
    pub ret: Ty,
    pub body: Block,
    pub span: Span,
}
