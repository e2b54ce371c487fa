//! Rill Lexer - tokenizes Rill source with `logos`.
//!
//! Literal values are not decoded here: tokens carry only their kind and
//! span, and the call-tree builder slices the script to read them. The one
//! exception is integer range checking, which surfaces as an `Error` token
//! so the parser can report it against the offending span.

mod lexer;

pub use lexer::{interpolation_ranges, lex, Token, TokenKind, TokenList};
