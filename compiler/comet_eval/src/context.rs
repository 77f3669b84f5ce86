//! Per-evaluation context threaded through the interpreter.

use comet_diagnostic::FileId;

/// Where evaluation currently is: the file being evaluated, the chain of
/// files that imported it, and the comptime call depth.
///
/// Contexts are immutable. Entering an import or a call produces a new
/// context that borrows the current one, so nothing has to be restored on
/// the way out.
#[derive(Copy, Clone, Debug)]
pub struct EvalContext<'a> {
    file: FileId,
    importer: Option<&'a EvalContext<'a>>,
    depth: u32,
}

impl EvalContext<'static> {
    /// Context for the top-level file of a compilation.
    pub fn new(file: FileId) -> Self {
        EvalContext {
            file,
            importer: None,
            depth: 0,
        }
    }
}

impl<'a> EvalContext<'a> {
    #[inline]
    pub fn file(&self) -> FileId {
        self.file
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Context for evaluating `file`, imported from `self`.
    pub fn enter_file<'b>(&'b self, file: FileId) -> EvalContext<'b>
    where
        'a: 'b,
    {
        EvalContext {
            file,
            importer: Some(self),
            depth: self.depth,
        }
    }

    /// Context one comptime call deeper.
    #[must_use]
    pub fn enter_call(self) -> Self {
        EvalContext {
            depth: self.depth.saturating_add(1),
            ..self
        }
    }

    /// Files from this one outwards to the top-level file.
    pub fn import_chain(&self) -> impl Iterator<Item = FileId> + '_ {
        std::iter::successors(Some(self), |ctx| ctx.importer).map(|ctx| ctx.file)
    }

    /// Whether `file` is already being evaluated somewhere up the chain.
    pub fn is_importing(&self, file: FileId) -> bool {
        self.import_chain().any(|f| f == file)
    }
}
