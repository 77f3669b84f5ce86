//! `import "path"` statements.
//!
//! The imported file is read synchronously, parsed by the configured
//! [`ModuleParser`](super::ModuleParser) and interpreted in a child of the
//! root scope. Its top-level bindings are then copied into the importing
//! scope.
//!
//! The module scope is retained by the importing scope rather than popped,
//! so functions the module declares keep resolving names through the
//! module's bindings for as long as the importer can call them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use comet_diagnostic::FileId;
use comet_ir::{Name, Span};

use super::Interpreter;
use crate::bridge;
use crate::errors::{import_failed, memory_error, EvalError};
use crate::{EvalContext, MemoryError, ScopeId, Value};

/// Why an import could not be evaluated.
#[derive(Debug, thiserror::Error)]
enum ImportError {
    #[error("no module parser is configured")]
    NoParser,
    #[error("cannot resolve `{}`: {source}", path.display())]
    Resolve { path: PathBuf, source: io::Error },
    #[error("cannot read `{}`: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("import cycle: `{}` is already being evaluated", path.display())]
    Cycle { path: PathBuf },
    #[error("the file has {count} syntax error(s)")]
    Parse { count: usize },
}

impl Interpreter<'_> {
    #[tracing::instrument(level = "debug", skip(self, span, scope, ctx), fields(importer = %ctx.file()))]
    pub(crate) fn import(
        &mut self,
        path: &str,
        span: Span,
        scope: ScopeId,
        ctx: &EvalContext<'_>,
    ) -> Result<(), EvalError> {
        let file = self
            .load(path, ctx)
            .map_err(|err| import_failed(path, err.to_string(), span))?;
        let import_ctx = ctx.enter_file(file);

        let exports = self.with_scope(ScopeId::ROOT, |module| {
            let module_scope = module.scope();
            let Some(parser) = module.parser else {
                return Err(ImportError::NoParser);
            };
            let Some(text) = module.root.sources().get(file).map(|f| Arc::clone(f.text())) else {
                return Ok(Vec::new());
            };
            let block = match parser.parse(file, &text, module.root.interner()) {
                Ok(block) => block,
                Err(diagnostics) => {
                    let count = diagnostics.len();
                    for diag in diagnostics {
                        module.root.push(diag);
                    }
                    return Err(ImportError::Parse { count });
                }
            };
            module.run_reporting(&block.stmts, module_scope, &import_ctx);
            module.retain_in(scope);
            Ok(module.export(module_scope, scope))
        });

        let exports = exports.map_err(|err| import_failed(path, err.to_string(), span))?;
        tracing::debug!(path, bindings = exports.len(), "import finished");
        // A binding that cannot be exported is reported and bound to `Poison`;
        // the rest are still exported.
        for (name, value) in exports {
            let value = value.unwrap_or_else(|err| {
                bridge::poison(&mut self.root, ctx, &memory_error(err, span))
            });
            self.env.declare_in(scope, name, value);
        }
        Ok(())
    }

    /// Resolve `path` against the importing file and register its text.
    fn load(&mut self, path: &str, ctx: &EvalContext<'_>) -> Result<FileId, ImportError> {
        let base = self
            .root
            .sources()
            .get(ctx.file())
            .and_then(|file| file.path().parent())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let joined = base.join(path);
        let canonical = fs::canonicalize(&joined).map_err(|source| ImportError::Resolve {
            path: joined.clone(),
            source,
        })?;

        if let Some(existing) = self.root.sources().find(&canonical) {
            if ctx.is_importing(existing) {
                return Err(ImportError::Cycle { path: canonical });
            }
            return Ok(existing);
        }
        let text = fs::read_to_string(&canonical).map_err(|source| ImportError::Read {
            path: canonical.clone(),
            source,
        })?;
        Ok(self.root.sources_mut().add(canonical, text))
    }

    /// Top-level bindings of a module scope, made valid in `target`.
    ///
    /// Functions stay bound to the module scope. Strings are copied into
    /// `target`, and pointers into module memory are rejected.
    fn export(&mut self, module: ScopeId, target: ScopeId) -> Vec<(Name, Result<Value, MemoryError>)> {
        let bindings: Vec<(Name, Value)> = self
            .env
            .bindings(module)
            .map(|(name, value)| (name, value.clone()))
            .collect();
        bindings
            .into_iter()
            .map(|(name, value)| (name, self.env.promote(value, target)))
            .collect()
    }
}
