use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::{DestructSentinel, TargetInfo};
use comet_diagnostic::{DiagnosticConfig, ErrorCode};
use comet_ir::{BinaryOp, ExprKind, FnDecl, IntTy, Literal, Param, Span, Ty, UnaryOp};
use pretty_assertions::assert_eq;

const SP: Span = Span::DUMMY;

fn setup() -> (Interpreter<'static>, EvalContext<'static>) {
    let mut root = GlobalRoot::with_config(
        TargetInfo::host(),
        SharedInterner::new(),
        DiagnosticConfig::unlimited(),
    );
    let file = root.sources_mut().add("main.cm", "");
    (Interpreter::new(root), EvalContext::new(file))
}

fn name(interp: &Interpreter<'_>, text: &str) -> Name {
    interp.root().interner().intern(text)
}

fn int(value: u64) -> Expr {
    Expr::int(value, IntTy::I32, SP)
}

fn let_(name: Name, init: Expr) -> Stmt {
    Stmt::new(StmtKind::Let { name, init }, SP)
}

fn expr(expr: Expr) -> Stmt {
    Stmt::new(StmtKind::Expr(expr), SP)
}

fn ret(expr: Expr) -> Stmt {
    Stmt::new(StmtKind::Return(Some(expr)), SP)
}

fn block(stmts: Vec<Stmt>) -> Block {
    Block::new(stmts, SP)
}

fn call(callee: Name, args: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Call { callee, args }, Span::new(40, 48))
}

fn func(name: Name, params: &[Name], body: Vec<Stmt>) -> Stmt {
    let params = params
        .iter()
        .map(|&name| Param {
            name,
            ty: Ty::Int(IntTy::I32),
            span: SP,
        })
        .collect();
    let decl = FnDecl {
        name,
        params,
        ret: Ty::Int(IntTy::I32),
        body: block(body),
        span: SP,
    };
    Stmt::new(StmtKind::Fn(Rc::new(decl)), SP)
}

fn nested(stmts: Vec<Stmt>) -> Expr {
    Expr::new(ExprKind::Block(block(stmts)), SP)
}

fn counter(drops: &Rc<Cell<u32>>) -> DestructSentinel {
    let drops = Rc::clone(drops);
    DestructSentinel::new(move || drops.set(drops.get() + 1))
}

fn codes(interp: &mut Interpreter<'_>) -> Vec<ErrorCode> {
    interp
        .root_mut()
        .take_diagnostics()
        .iter()
        .map(|diag| diag.code)
        .collect()
}

#[test]
fn test_block_value_is_last_expression() {
    let (mut interp, ctx) = setup();
    let x = name(&interp, "x");
    let program = block(vec![
        let_(x, Expr::binary(BinaryOp::Add, int(1), int(2))),
        expr(Expr::binary(BinaryOp::Mul, Expr::ident(x, SP), int(10))),
    ]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(value.int_value(), Some(30));
    assert_eq!(value.kind(), crate::ValueKind::I32);
    assert!(codes(&mut interp).is_empty());
    assert_eq!(interp.env().depth(), 1);
}

#[test]
fn test_errors_are_reported_once_and_evaluation_continues() {
    let (mut interp, ctx) = setup();
    let x = name(&interp, "x");
    let y = name(&interp, "y");
    let program = block(vec![
        let_(x, Expr::binary(BinaryOp::Div, int(1), int(0))),
        let_(y, Expr::binary(BinaryOp::Add, Expr::ident(x, SP), int(1))),
        expr(Expr::ident(name(&interp, "missing"), Span::new(5, 12))),
        expr(Expr::ident(y, SP)),
    ]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert!(value.is_poison());
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6001, ErrorCode::E6005]);
}

#[test]
fn test_string_result_is_promoted_out_of_its_block() {
    let (mut interp, ctx) = setup();
    let program = block(vec![expr(Expr::binary(
        BinaryOp::Add,
        Expr::string("hello", SP),
        int(2),
    ))]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    let view = value.as_str_view().unwrap();
    assert_eq!(ScopeId::owning(view.address()), Some(ScopeId::ROOT));
    assert_eq!(interp.env().str_bytes(view).unwrap(), b"llo");
}

#[test]
fn test_nested_blocks_and_shadowing() {
    let (mut interp, ctx) = setup();
    let x = name(&interp, "x");
    let inner = Expr::new(
        ExprKind::Block(block(vec![
            let_(x, int(5)),
            expr(Expr::ident(x, SP)),
        ])),
        SP,
    );
    let program = block(vec![
        let_(x, int(1)),
        expr(Expr::binary(BinaryOp::Add, inner, Expr::ident(x, SP))),
    ]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(value.int_value(), Some(6));
}

#[test]
fn test_comptime_function_call() {
    let (mut interp, ctx) = setup();
    let add = name(&interp, "add");
    let (a, b) = (name(&interp, "a"), name(&interp, "b"));
    let program = block(vec![
        func(
            add,
            &[a, b],
            vec![ret(Expr::binary(
                BinaryOp::Add,
                Expr::ident(a, SP),
                Expr::ident(b, SP),
            ))],
        ),
        expr(call(add, vec![int(2), int(3)])),
    ]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(value.int_value(), Some(5));
    assert_eq!(value.span(), Span::new(40, 48));
}

#[test]
fn test_recursive_function_with_early_return() {
    let (mut interp, ctx) = setup();
    let fact = name(&interp, "fact");
    let n = name(&interp, "n");
    let body = vec![expr(Expr::new(
        ExprKind::If {
            cond: Box::new(Expr::binary(BinaryOp::LtEq, Expr::ident(n, SP), int(1))),
            then_branch: block(vec![ret(int(1))]),
            else_branch: Some(block(vec![ret(Expr::binary(
                BinaryOp::Mul,
                Expr::ident(n, SP),
                call(fact, vec![Expr::binary(BinaryOp::Sub, Expr::ident(n, SP), int(1))]),
            ))])),
        },
        SP,
    ))];
    let program = block(vec![func(fact, &[n], body), expr(call(fact, vec![int(5)]))]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(value.int_value(), Some(120));
    assert_eq!(interp.env().depth(), 1);
}

#[test]
fn test_recursion_limit() {
    let (interp, ctx) = setup();
    let mut interp = InterpreterBuilder::new(interp.into_root())
        .config(EvalConfig::default().with_max_call_depth(8))
        .build();
    let f = name(&interp, "f");
    let program = block(vec![func(f, &[], vec![expr(call(f, vec![]))]), expr(call(f, vec![]))]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert!(value.is_poison());
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6012]);
    assert_eq!(interp.env().depth(), 1);
}

#[test]
fn test_call_budget() {
    let (interp, ctx) = setup();
    let mut interp = InterpreterBuilder::new(interp.into_root())
        .config(EvalConfig::default().with_call_budget(2))
        .build();
    let one = name(&interp, "one");
    let program = block(vec![
        func(one, &[], vec![expr(int(1))]),
        expr(call(one, vec![])),
        expr(call(one, vec![])),
        expr(call(one, vec![])),
    ]);

    interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6012]);
}

#[test]
fn test_bad_calls() {
    let (mut interp, ctx) = setup();
    let id = name(&interp, "id");
    let v = name(&interp, "v");
    let x = name(&interp, "x");
    let program = block(vec![
        func(id, &[v], vec![expr(Expr::ident(v, SP))]),
        let_(x, int(3)),
        expr(call(id, vec![])),
        expr(call(x, vec![])),
        expr(call(name(&interp, "nope"), vec![])),
    ]);

    interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(
        codes(&mut interp),
        vec![ErrorCode::E6011, ErrorCode::E6011, ErrorCode::E6005]
    );
}

#[test]
fn test_function_body_sees_defining_scope_not_caller() {
    let (mut interp, ctx) = setup();
    let peek = name(&interp, "peek");
    let local = name(&interp, "local");
    let program = block(vec![
        func(peek, &[], vec![expr(Expr::ident(local, SP))]),
        expr(Expr::new(
            ExprKind::Block(block(vec![let_(local, int(7)), expr(call(peek, vec![]))])),
            SP,
        )),
    ]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert!(value.is_poison());
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6005]);
}

#[test]
fn test_deref_reads_string_bytes() {
    let (mut interp, ctx) = setup();
    let as_ptr = Expr::new(
        ExprKind::Cast {
            expr: Box::new(Expr::string("AB", SP)),
            ty: Ty::ptr_to(Ty::Int(IntTy::U8)),
        },
        SP,
    );
    let deref = Expr::new(
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand: Box::new(Expr::binary(BinaryOp::Add, as_ptr, int(1))),
        },
        SP,
    );

    let value = interp.interpret_block(&block(vec![expr(deref)]), ScopeId::ROOT, &ctx);
    assert_eq!(value.kind(), crate::ValueKind::U8);
    assert_eq!(value.int_value(), Some(i128::from(b'B')));
}

#[test]
fn test_pointer_cannot_escape_its_scope() {
    let (mut interp, ctx) = setup();
    let as_ptr = Expr::new(
        ExprKind::Cast {
            expr: Box::new(Expr::string("AB", SP)),
            ty: Ty::ptr_to(Ty::Int(IntTy::U8)),
        },
        SP,
    );

    let value = interp.interpret_block(&block(vec![expr(as_ptr)]), ScopeId::ROOT, &ctx);
    assert!(value.is_poison());
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6013]);
}

#[test]
fn test_deref_null_is_reported() {
    let (mut interp, ctx) = setup();
    let deref = Expr::new(
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand: Box::new(Expr::literal(Literal::Null, SP)),
        },
        SP,
    );
    interp.interpret_block(&block(vec![expr(deref)]), ScopeId::ROOT, &ctx);
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6006]);
}

#[test]
fn test_if_requires_bool_and_is_checks_kind() {
    let (mut interp, ctx) = setup();
    let bad_if = Expr::new(
        ExprKind::If {
            cond: Box::new(int(1)),
            then_branch: block(vec![]),
            else_branch: None,
        },
        SP,
    );
    let is_i32 = Expr::new(
        ExprKind::Is {
            expr: Box::new(int(1)),
            ty: Ty::Int(IntTy::I32),
        },
        SP,
    );
    let program = block(vec![expr(bad_if), expr(is_i32)]);

    let value = interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(value.as_bool(), Some(true));
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6003]);
}

#[test]
fn test_evaluate_constant_and_array_length() {
    let (mut interp, ctx) = setup();
    let n = name(&interp, "n");
    interp.declare_global(n, Value::int(IntTy::I32, 4, &TargetInfo::host(), SP));

    let len = Expr::binary(BinaryOp::Mul, Expr::ident(n, SP), int(2));
    assert_eq!(interp.evaluate_array_length(&len, ScopeId::ROOT, &ctx), Some(8));

    let negative = Expr::binary(BinaryOp::Sub, int(1), int(2));
    assert_eq!(interp.evaluate_array_length(&negative, ScopeId::ROOT, &ctx), None);

    let broken = Expr::binary(BinaryOp::Mod, int(1), int(0));
    assert_eq!(interp.evaluate_constant(&broken, ScopeId::ROOT, &ctx), None);

    assert_eq!(codes(&mut interp), vec![ErrorCode::E6000, ErrorCode::E6002]);
}

#[test]
fn test_comptime_block_expression() {
    let (mut interp, ctx) = setup();
    let comptime = Expr::new(
        ExprKind::Comptime(block(vec![ret(int(9)), expr(int(1))])),
        SP,
    );
    let value = comptime.reduce(&mut interp, ScopeId::ROOT, &ctx).unwrap();
    assert_eq!(value.int_value(), Some(9));
}

#[test]
fn test_import_without_parser_fails() {
    let (mut interp, ctx) = setup();
    let program = block(vec![Stmt::new(
        StmtKind::Import {
            path: "missing_module.cm".to_owned(),
        },
        SP,
    )]);
    interp.interpret_block(&program, ScopeId::ROOT, &ctx);
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6007]);
}

#[test]
fn test_finalizers_run_once_when_a_scope_exits_on_error() {
    let (mut interp, ctx) = setup();
    let drops = Rc::new(Cell::new(0));
    let stmts = vec![
        expr(nested(vec![expr(Expr::binary(BinaryOp::Div, int(1), int(0)))])),
        expr(int(7)),
    ];

    let result = {
        let mut scoped = interp.scoped(ScopeId::ROOT);
        let scope = scoped.scope();
        scoped.env.defer(scope, counter(&drops)).unwrap();
        scoped.run_stmts(&stmts, scope, &ctx)
    };

    assert!(
        matches!(result, Err(Unwind::Error(ref err)) if err.error_code() == ErrorCode::E6001),
        "{result:?}"
    );
    assert_eq!(drops.get(), 1);
    assert_eq!(interp.env().depth(), 1);
    drop(interp);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_finalizers_run_once_when_a_scope_exits_on_return() {
    let (mut interp, ctx) = setup();
    let drops = Rc::new(Cell::new(0));
    let stmts = vec![expr(nested(vec![ret(int(5)), expr(int(6))])), expr(int(7))];

    let result = {
        let mut scoped = interp.scoped(ScopeId::ROOT);
        let scope = scoped.scope();
        scoped.env.defer(scope, counter(&drops)).unwrap();
        scoped.run_stmts(&stmts, scope, &ctx)
    };

    match result {
        Err(Unwind::Return(value)) => assert_eq!(value.int_value(), Some(5)),
        other => panic!("expected an early return, got {other:?}"),
    }
    assert_eq!(drops.get(), 1);
    assert_eq!(interp.env().depth(), 1);
    drop(interp);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_interpret_block_under_an_ended_scope_is_reported() {
    let (mut interp, ctx) = setup();
    let stale = interp.with_scope(ScopeId::ROOT, |scoped| scoped.scope());

    let value = interp.interpret_block(&block(vec![expr(int(1))]), stale, &ctx);
    assert!(value.is_poison());
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6013]);
    assert_eq!(interp.env().depth(), 1);
}
