//! Error values.
//!
//! Errors are ordinary values: natives return them, blocks inspect them and
//! scripts can catch them with `try`. An error only halts a block when it is
//! not marked ignorable, and a fatal error always halts.

use std::fmt;

/// Severity of an error value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Runtime,
    Fatal,
}

/// Script location an error was raised at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TracePoint {
    pub script: String,
    pub line: u32,
}

/// Error payload carried by `Value::Error`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorValue {
    kind: ErrorKind,
    message: String,
    trace: Option<TracePoint>,
    ignorable: bool,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorValue {
            kind: ErrorKind::Runtime,
            message: message.into(),
            trace: None,
            ignorable: false,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ErrorValue {
            kind: ErrorKind::Fatal,
            ..ErrorValue::new(message)
        }
    }

    #[must_use]
    pub fn with_trace(mut self, script: impl Into<String>, line: u32) -> Self {
        self.trace = Some(TracePoint {
            script: script.into(),
            line,
        });
        self
    }

    #[must_use]
    pub fn ignorable(mut self, ignorable: bool) -> Self {
        self.ignorable = ignorable;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace(&self) -> Option<&TracePoint> {
        self.trace.as_ref()
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::Fatal
    }

    pub fn is_ignorable(&self) -> bool {
        self.ignorable
    }

    /// Whether a block must stop after producing this error.
    pub fn halts(&self) -> bool {
        self.is_fatal() || !self.ignorable
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ErrorKind::Runtime => "error",
            ErrorKind::Fatal => "fatal error",
        };
        match &self.trace {
            Some(trace) => write!(
                f,
                "{label}(at {} at line {}: {})",
                trace.script, trace.line, self.message
            ),
            None => write!(f, "{label}({})", self.message),
        }
    }
}

impl std::error::Error for ErrorValue {}

#[cfg(test)]
mod tests;
