//! Script metadata: name, source text and a line offset table.
//!
//! Every `Argument` and `Call` built from source points back at the
//! `ScriptInfo` it came from, so an error can be traced to
//! `<script-name> at line <n>` without keeping the syntax tree alive.

use std::sync::Arc;

use crate::Span;

/// Shared handle to script metadata.
pub type SharedScript = Arc<ScriptInfo>;

/// Name and source of one script, with line starts pre-computed.
#[derive(Debug)]
pub struct ScriptInfo {
    name: String,
    source: String,
    /// Byte offset of each line start; `line_starts[0] == 0`.
    line_starts: Vec<u32>,
}

impl ScriptInfo {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        ScriptInfo {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// Wrap in an `Arc` for sharing between calls and arguments.
    pub fn shared(name: impl Into<String>, source: impl Into<String>) -> SharedScript {
        Arc::new(Self::new(name, source))
    }

    /// Metadata for values created by the host rather than parsed.
    pub fn synthetic(name: impl Into<String>) -> SharedScript {
        Self::shared(name, String::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 1-based line number containing `offset`.
    pub fn line_of(&self, offset: u32) -> u32 {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(idx).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// Source text covered by `span`, or `""` when out of range.
    pub fn slice(&self, span: Span) -> &str {
        self.source.get(span.to_range()).unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests;
