//! The `check` command: parse and build a script without running it.

use super::{exit_with, read_file};
use crate::{build_runtime, CliOptions};

/// Report whether a script compiles, and how many top-level calls it has.
pub fn check_file(path: &str, options: &CliOptions) {
    let source = read_file(path);
    let runtime = build_runtime(options);
    match runtime.compile(path, &source) {
        Ok(block) => println!("{path}: ok ({} calls)", block.calls().len()),
        Err(error) => exit_with(&error),
    }
}
