//! Destination for `print` and `println` output.
//!
//! Scripts never touch stdout directly: the runtime owns a print handler
//! chosen at construction time. The CLI prints to stdout, tests capture
//! into a buffer, and embedders that want no output use `Silent`.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Print handler, dispatched by variant.
pub enum PrintHandler {
    Stdout,
    Buffer(Mutex<String>),
    Silent,
}

impl PrintHandler {
    pub fn print(&self, text: &str) {
        match self {
            PrintHandler::Stdout => {
                let mut out = std::io::stdout().lock();
                // A closed stdout is not a script error.
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            PrintHandler::Buffer(buffer) => buffer.lock().push_str(text),
            PrintHandler::Silent => {}
        }
    }

    pub fn println(&self, text: &str) {
        match self {
            PrintHandler::Stdout => println!("{text}"),
            PrintHandler::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(text);
                buffer.push('\n');
            }
            PrintHandler::Silent => {}
        }
    }

    /// Captured output; empty unless buffering.
    pub fn output(&self) -> String {
        match self {
            PrintHandler::Buffer(buffer) => buffer.lock().clone(),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }

    /// Drain and return the captured output.
    pub fn take_output(&self) -> String {
        match self {
            PrintHandler::Buffer(buffer) => std::mem::take(&mut *buffer.lock()),
            PrintHandler::Stdout | PrintHandler::Silent => String::new(),
        }
    }
}

/// Print handler shared between a runtime and its concurrent tasks.
pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}
