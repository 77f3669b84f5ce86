//! `InterpreterBuilder` for creating configured interpreters.

use super::{Interpreter, ModuleParser};
use crate::{EvalConfig, Environment, GlobalRoot};

/// Builder for [`Interpreter`].
///
/// Without a parser, `import` statements fail with a diagnostic.
pub struct InterpreterBuilder<'p> {
    root: GlobalRoot,
    parser: Option<&'p dyn ModuleParser>,
    config: EvalConfig,
}

impl<'p> InterpreterBuilder<'p> {
    pub fn new(root: GlobalRoot) -> Self {
        InterpreterBuilder {
            root,
            parser: None,
            config: EvalConfig::default(),
        }
    }

    /// Set the parser used for imported files.
    #[must_use]
    pub fn parser(mut self, parser: &'p dyn ModuleParser) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Set call depth and budget limits.
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Interpreter<'p> {
        Interpreter {
            root: self.root,
            env: Environment::new(),
            parser: self.parser,
            config: self.config,
            calls_made: 0,
        }
    }
}
