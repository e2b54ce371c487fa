//! The interactive shell.
//!
//! Each entry runs against the same runtime, so bindings persist. An entry
//! with an unclosed bracket or string continues on the next line. Errors
//! are printed and the session goes on.

use std::io::{BufRead, Write};

use rill_eval::{Runtime, ScriptError};
use rill_parse::ParseError;

use super::describe_error;
use crate::{build_runtime, CliOptions};

const PROMPT: &str = "rill> ";
const CONTINUE_PROMPT: &str = "  ... ";

/// Outcome of feeding one line to the shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplStep {
    /// The entry is not finished yet.
    Incomplete,
    /// Display form of a non-nil result.
    Value(String),
    /// The entry evaluated to nil, or was blank.
    Quiet,
    Error(String),
    /// Text produced by a shell command.
    Info(String),
    Quit,
}

/// Shell state: the runtime plus any unfinished entry.
pub struct Repl {
    runtime: Runtime,
    pending: String,
    entries: usize,
}

impl Repl {
    pub fn new(runtime: Runtime) -> Self {
        Repl {
            runtime,
            pending: String::new(),
            entries: 0,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn is_continuing(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn feed(&mut self, line: &str) -> ReplStep {
        if self.pending.is_empty() {
            if let Some(step) = self.command(line.trim()) {
                return step;
            }
        }
        self.pending.push_str(line);
        self.pending.push('\n');
        if self.pending.trim().is_empty() {
            self.pending.clear();
            return ReplStep::Quiet;
        }

        self.entries += 1;
        let name = format!("<repl {}>", self.entries);
        match self.runtime.run_script(&name, &self.pending) {
            Err(ScriptError::Parse {
                source: ParseError::Unclosed { .. },
                ..
            }) => {
                self.entries -= 1;
                ReplStep::Incomplete
            }
            Err(error) => {
                self.pending.clear();
                ReplStep::Error(describe_error(&error))
            }
            Ok(value) => {
                self.pending.clear();
                if value.is_nil() {
                    ReplStep::Quiet
                } else {
                    ReplStep::Value(value.to_string())
                }
            }
        }
    }

    fn command(&self, line: &str) -> Option<ReplStep> {
        let step = match line {
            ":quit" | ":q" => ReplStep::Quit,
            ":keys" => ReplStep::Info(self.runtime.root().keys().join(" ")),
            ":modules" => ReplStep::Info(self.runtime.root().module_names().join(" ")),
            ":help" => ReplStep::Info(
                [
                    ":keys     names bound in the session",
                    ":modules  registered modules",
                    ":quit     leave the shell",
                ]
                .join("\n"),
            ),
            _ => return None,
        };
        Some(step)
    }
}

/// Run the shell on stdin until end of input or `:quit`.
pub fn run_repl(options: &CliOptions) {
    let mut repl = Repl::new(build_runtime(options));
    println!("Rill {} (:help for commands)", env!("CARGO_PKG_VERSION"));

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let prompt = if repl.is_continuing() {
            CONTINUE_PROMPT
        } else {
            PROMPT
        };
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("error: cannot read input: {e}");
                break;
            }
            None => {
                println!();
                break;
            }
        };
        match repl.feed(&line) {
            ReplStep::Value(text) | ReplStep::Info(text) => println!("{text}"),
            ReplStep::Error(text) => eprintln!("{text}"),
            ReplStep::Quit => break,
            ReplStep::Incomplete | ReplStep::Quiet => {}
        }
    }
}
