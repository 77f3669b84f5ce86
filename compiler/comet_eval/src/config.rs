//! Interpreter limits.

/// Bounds on comptime function calls.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EvalConfig {
    /// Deepest allowed chain of nested comptime calls.
    pub max_call_depth: u32,
    /// Total comptime calls allowed per interpreter.
    pub call_budget: u32,
}

impl EvalConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: u32 = 64;
    pub const DEFAULT_CALL_BUDGET: u32 = 100_000;

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: u32) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_call_budget(mut self, budget: u32) -> Self {
        self.call_budget = budget;
        self
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            call_budget: Self::DEFAULT_CALL_BUDGET,
        }
    }
}
