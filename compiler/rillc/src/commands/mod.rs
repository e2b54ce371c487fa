//! Command handlers for the `rill` CLI.
//!
//! Each submodule implements one command. Handlers report problems on
//! stderr and exit the process with status 1; the shared helpers for that
//! live here.

mod check;
mod repl;
mod run;
mod snapshot;

pub use check::check_file;
pub use repl::{run_repl, Repl, ReplStep};
pub use run::run_file;
pub use snapshot::{load_snapshot, snapshot_file};

use rill_eval::ScriptError;

/// Read a script, exiting with a readable message on failure.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("error: {msg}");
            std::process::exit(1);
        }
    }
}

/// Text shown to the user for a failed script.
///
/// A build failure means the parser handed over a tree the builder cannot
/// use, which is a bug in Rill rather than in the script.
pub fn describe_error(error: &ScriptError) -> String {
    match error {
        ScriptError::Build { .. } => format!("internal error: {error}"),
        ScriptError::Parse { .. } | ScriptError::Runtime(_) => format!("error: {error}"),
    }
}

/// Print `error` and exit.
pub(crate) fn exit_with(error: &ScriptError) -> ! {
    eprintln!("{}", describe_error(error));
    std::process::exit(1);
}
