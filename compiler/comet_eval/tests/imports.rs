//! File imports against a real directory tree.
//!
//! A line-based stand-in parser understands `let NAME = 42`,
//! `let NAME = "text"`, `let NAME = "text" as *u8`, `fn NAME = 42` and
//! `fn NAME = other` (functions returning a constant or a name) and
//! `import "path"`.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::fs;
use std::path::Path;
use std::rc::Rc;

use comet_diagnostic::{Diagnostic, DiagnosticConfig, ErrorCode, FileId};
use comet_eval::{
    EvalContext, GlobalRoot, Interpreter, InterpreterBuilder, ModuleParser, ScopeId, TargetInfo,
    Value,
};
use comet_ir::{
    Block, Expr, ExprKind, FnDecl, IntTy, SharedInterner, Span, Stmt, StmtKind, Ty,
};
use pretty_assertions::assert_eq;

const SP: Span = Span::DUMMY;

struct LineParser;

impl ModuleParser for LineParser {
    fn parse(
        &self,
        file: FileId,
        source: &str,
        interner: &SharedInterner,
    ) -> Result<Block, Vec<Diagnostic>> {
        let mut stmts = Vec::new();
        let mut errors = Vec::new();
        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let kind = if let Some(path) = line.strip_prefix("import ") {
                Some(StmtKind::Import {
                    path: path.trim_matches('"').to_owned(),
                })
            } else if let Some((name, init)) = line.strip_prefix("let ").and_then(|r| r.split_once(" = ")) {
                let init = match init.strip_suffix(" as *u8") {
                    Some(text) => Expr::new(
                        ExprKind::Cast {
                            expr: Box::new(Expr::string(text.trim_matches('"'), SP)),
                            ty: Ty::ptr_to(Ty::Int(IntTy::U8)),
                        },
                        SP,
                    ),
                    None => match init.strip_prefix('"') {
                        Some(text) => Expr::string(text.trim_end_matches('"'), SP),
                        None => Expr::int(init.parse().unwrap(), IntTy::I32, SP),
                    },
                };
                Some(StmtKind::Let {
                    name: interner.intern(name),
                    init,
                })
            } else if let Some((name, value)) = line.strip_prefix("fn ").and_then(|r| r.split_once(" = ")) {
                let result = match value.parse() {
                    Ok(n) => Expr::int(n, IntTy::I32, SP),
                    Err(_) => Expr::ident(interner.intern(value), SP),
                };
                let body = Block::new(vec![Stmt::new(StmtKind::Return(Some(result)), SP)], SP);
                Some(StmtKind::Fn(Rc::new(FnDecl {
                    name: interner.intern(name),
                    params: Vec::new(),
                    ret: Ty::Int(IntTy::I32),
                    body,
                    span: SP,
                })))
            } else {
                None
            };
            match kind {
                Some(kind) => stmts.push(Stmt::new(kind, SP)),
                None => errors.push(
                    Diagnostic::error(ErrorCode::E6000)
                        .with_message(format!("cannot parse `{line}`"))
                        .with_label(Some(file), SP, "here"),
                ),
            }
        }
        if errors.is_empty() {
            Ok(Block::new(stmts, SP))
        } else {
            Err(errors)
        }
    }
}

fn write(dir: &Path, rel: &str, text: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Interpreter whose main file is `dir/main.cm`.
fn setup(dir: &Path, parser: &'static LineParser) -> (Interpreter<'static>, EvalContext<'static>) {
    write(dir, "main.cm", "");
    let mut root = GlobalRoot::with_config(
        TargetInfo::host(),
        SharedInterner::new(),
        DiagnosticConfig::unlimited(),
    );
    let main = fs::canonicalize(dir.join("main.cm")).unwrap();
    let file = root.sources_mut().add(main, "");
    let interp = InterpreterBuilder::new(root).parser(parser).build();
    (interp, EvalContext::new(file))
}

static PARSER: LineParser = LineParser;

fn import(path: &str) -> Stmt {
    Stmt::new(
        StmtKind::Import {
            path: path.to_owned(),
        },
        SP,
    )
}

fn ident(interp: &Interpreter<'_>, name: &str) -> Expr {
    Expr::ident(interp.root().interner().intern(name), SP)
}

fn codes(interp: &mut Interpreter<'_>) -> Vec<ErrorCode> {
    interp
        .root_mut()
        .take_diagnostics()
        .iter()
        .map(|d| d.code)
        .collect()
}

fn run(interp: &mut Interpreter<'_>, ctx: &EvalContext<'_>, stmts: Vec<Stmt>) -> Value {
    interp.interpret_block(&Block::new(stmts, SP), ScopeId::ROOT, ctx)
}

#[test]
fn test_import_relative_to_importing_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "lib/consts.cm", "let answer = 42\nimport \"more.cm\"");
    write(dir.path(), "lib/more.cm", "let extra = 7");
    let (mut interp, ctx) = setup(dir.path(), &PARSER);

    let sum = Expr::binary(
        comet_ir::BinaryOp::Add,
        ident(&interp, "answer"),
        ident(&interp, "extra"),
    );
    let stmts = vec![import("lib/consts.cm"), Stmt::new(StmtKind::Expr(sum), SP)];
    let value = run(&mut interp, &ctx, stmts);

    assert!(codes(&mut interp).is_empty());
    assert_eq!(value.int_value(), Some(49));
    assert_eq!(interp.root().sources().len(), 3);
}

#[test]
fn test_imported_strings_and_functions_outlive_the_module_scope() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "greet.cm", "let greeting = \"hello\"\nfn seven = 7");
    let (mut interp, ctx) = setup(dir.path(), &PARSER);

    let greeting = ident(&interp, "greeting");
    let tail = Expr::binary(comet_ir::BinaryOp::Add, greeting, Expr::int(3, IntTy::I32, SP));
    let value = run(&mut interp, &ctx, vec![import("greet.cm"), Stmt::new(StmtKind::Expr(tail), SP)]);
    let view = value.as_str_view().unwrap();
    assert_eq!(interp.env().str_bytes(view).unwrap(), b"lo");

    let seven = interp.root().interner().intern("seven");
    let call = Expr::new(ExprKind::Call { callee: seven, args: vec![] }, SP);
    let value = run(&mut interp, &ctx, vec![import("greet.cm"), Stmt::new(StmtKind::Expr(call), SP)]);
    assert_eq!(value.int_value(), Some(7));
    assert!(codes(&mut interp).is_empty());
}

#[test]
fn test_import_cycle_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.cm", "import \"b.cm\"\nlet a = 1");
    write(dir.path(), "b.cm", "import \"a.cm\"\nlet b = 2");
    let (mut interp, ctx) = setup(dir.path(), &PARSER);

    let b = ident(&interp, "b");
    let value = run(&mut interp, &ctx, vec![import("a.cm"), Stmt::new(StmtKind::Expr(b), SP)]);

    assert_eq!(value.int_value(), Some(2));
    let diags = interp.root_mut().take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, ErrorCode::E6007);
    assert!(diags[0].message.contains("import cycle"), "{}", diags[0].message);
}

#[test]
fn test_missing_file_and_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.cm", "let ok = 1\nthis is not valid");
    let (mut interp, ctx) = setup(dir.path(), &PARSER);

    run(&mut interp, &ctx, vec![import("nowhere.cm"), import("broken.cm")]);
    assert_eq!(
        codes(&mut interp),
        vec![ErrorCode::E6007, ErrorCode::E6000, ErrorCode::E6007]
    );
}

#[test]
fn test_imported_function_sees_module_bindings_not_importer_bindings() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "m.cm", "let k = 1\nfn getk = k");
    let (mut interp, ctx) = setup(dir.path(), &PARSER);

    let k = interp.root().interner().intern("k");
    let getk = interp.root().interner().intern("getk");
    let stmts = vec![
        import("m.cm"),
        Stmt::new(StmtKind::Let { name: k, init: Expr::int(2, IntTy::I32, SP) }, SP),
        Stmt::new(StmtKind::Expr(Expr::new(ExprKind::Call { callee: getk, args: vec![] }, SP)), SP),
    ];
    let value = run(&mut interp, &ctx, stmts);

    assert!(codes(&mut interp).is_empty());
    assert_eq!(value.int_value(), Some(1));
    assert_eq!(interp.env().depth(), 1);
}

#[test]
fn test_failed_export_is_poisoned_and_the_rest_are_still_exported() {
    let dir = tempfile::tempdir().unwrap();
    let mut module = String::from("let p = \"abc\" as *u8\n");
    for i in 0..20 {
        module.push_str(&format!("let z{i} = {i}\n"));
    }
    write(dir.path(), "m.cm", &module);
    let (mut interp, ctx) = setup(dir.path(), &PARSER);

    let sum = (1..20).fold(ident(&interp, "z0"), |acc, i| {
        Expr::binary(comet_ir::BinaryOp::Add, acc, ident(&interp, &format!("z{i}")))
    });
    let stmts = vec![
        import("m.cm"),
        Stmt::new(StmtKind::Expr(ident(&interp, "p")), SP),
        Stmt::new(StmtKind::Expr(sum), SP),
    ];
    let value = run(&mut interp, &ctx, stmts);

    assert_eq!(value.int_value(), Some(190));
    assert_eq!(codes(&mut interp), vec![ErrorCode::E6013]);
}
