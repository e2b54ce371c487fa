//! Rill command-line host.
//!
//! The `rill` binary is a thin shell over this library: option parsing,
//! logging setup, runtime construction and the host-only `task` module.

pub mod commands;
mod options;
mod task;
mod tracing_setup;

pub use options::{parse_options, CliOptions};
pub use task::{TaskHandle, TaskModule};
pub use tracing_setup::init_tracing;

use rill_codec::CodecModule;
use rill_eval::{stdout_handler, Runtime, SharedPrintHandler};

/// Runtime configured from command-line options, printing to stdout.
pub fn build_runtime(options: &CliOptions) -> Runtime {
    build_runtime_with(options, stdout_handler())
}

/// Runtime configured from command-line options with a chosen print handler.
pub fn build_runtime_with(options: &CliOptions, print: SharedPrintHandler) -> Runtime {
    let mut builder = Runtime::builder()
        .debug(options.debug)
        .print_handler(print)
        .module(CodecModule)
        .module(TaskModule);
    if let Some(depth) = options.max_depth {
        builder = builder.max_call_depth(depth);
    }
    builder.build()
}
