//! Rill evaluation engine.
//!
//! Turns a parsed script into a call tree and evaluates it against chained,
//! closure-capable contexts.
//!
//! - [`value`]: the closed set of runtime values and their capabilities
//! - [`RunContext`]: scope frames stored in a per-runtime arena
//! - [`Call`] / [`Block`]: the executable tree
//! - [`build`]: syntax tree to call tree, removing shortcut sugar
//! - [`eval_call`] / [`run_block`]: call resolution and block execution
//! - [`builtins`]: the core native library
//! - [`Runtime`]: the embedding surface tying these together

pub mod builtins;
mod builder;
mod call;
mod config;
mod context;
pub mod errors;
mod exec;
mod module;
mod print_handler;
mod runtime;
mod stack;
pub mod value;

pub use builder::{build, BuildError};
pub use call::{Argument, Block, Call, CallTarget, NativeFn, NativeFunction};
pub use config::EvalConfig;
pub use context::{BackgroundGuard, ContextId, RunContext};
pub use exec::{eval_call, run_block, FALLBACK_HANDLER};
pub use module::{FnModule, Module, ModuleSlot};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use runtime::{Runtime, RuntimeBuilder, ScriptError};
pub use stack::ensure_sufficient_stack;
pub use value::{ErrorKind, ErrorValue, EvalResult, Identity, TypeTag, Value};
