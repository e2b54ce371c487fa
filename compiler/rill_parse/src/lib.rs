//! Rill Parse - recursive-descent parser producing a concrete syntax tree.
//!
//! The output is a [`SyntaxNode`] tree following the shape contract
//! documented in `rill_ir::syntax`. The parser does no desugaring: colon and
//! dot shortcuts, pipes and list literals are emitted as their own node
//! kinds and rewritten later by the call-tree builder.

mod parser;

pub use parser::{parse, ParseError};
pub use rill_ir::{SyntaxKind, SyntaxNode};
