//! Comet compile-time evaluation engine.
//!
//! Reduces already type-checked `comptime` code to values while compiling.
//!
//! # Architecture
//!
//! - [`Value`]: immutable tagged values over a closed [`ValueKind`]
//! - [`Environment`]: stack of scopes with explicit parents; every scope
//!   owns an arena and a disjoint address region
//! - [`evaluate_binary`], [`evaluate_unary`], [`evaluate_cast`]: operator
//!   dispatch with numeric promotion
//! - [`GlobalRoot`] and [`bridge`]: one diagnostic sink per compilation
//! - [`Interpreter`]: the driver, entered through
//!   [`Interpreter::interpret_block`]
//!
//! Failures are [`EvalError`]s until the statement that started them
//! reports them once; the failed value then continues as `Poison`.

pub mod bridge;
mod cast;
mod config;
mod context;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod memory;
mod operators;
mod root;
mod stack;
mod target;
mod unary;
pub mod value;

pub use bridge::Subject;
pub use cast::evaluate_cast;
pub use config::EvalConfig;
pub use context::EvalContext;
pub use environment::{Environment, ScopeId};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{
    Interpreter, InterpreterBuilder, ModuleParser, ScopedInterpreter, ValueNode,
};
pub use memory::{DestructSentinel, MemoryError, ObjectId, ScopeArena};
pub use operators::evaluate_binary;
pub use root::GlobalRoot;
pub use stack::ensure_sufficient_stack;
pub use target::{PointerWidth, TargetInfo};
pub use unary::evaluate_unary;
pub use value::{Address, FunctionValue, PointerValue, StrView, Value, ValueKind};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or a global subscriber already
/// exists. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .try_init();
        }
    });
}
