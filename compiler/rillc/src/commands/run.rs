//! The `run` command: evaluate a script file.

use tracing::debug;

use super::{exit_with, read_file};
use crate::{build_runtime, CliOptions};

/// Run a script. A halting error at the end of the script exits with
/// status 1 after printing it.
pub fn run_file(path: &str, options: &CliOptions) {
    let source = read_file(path);
    let runtime = build_runtime(options);
    match runtime.run_script(path, &source) {
        Ok(value) => debug!(result = %value, frames = runtime.frame_count(), "script finished"),
        Err(error) => exit_with(&error),
    }
}
