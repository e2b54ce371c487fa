//! Rill IR - shared source-level types for the Rill runtime.
//!
//! This crate sits below every other Rill crate and holds only data:
//!
//! - [`Span`]: compact byte-offset ranges into a script
//! - [`ScriptInfo`]: script name, source text and a line table for
//!   turning offsets into line numbers when errors are traced
//! - [`SyntaxNode`] / [`SyntaxKind`]: the positioned concrete syntax tree
//!   that a parser hands to the call-tree builder

mod script;
mod span;
mod syntax;

pub use script::{ScriptInfo, SharedScript};
pub use span::{Span, SpanError};
pub use syntax::{SyntaxKind, SyntaxNode};
