//! Concrete syntax tree handed from a parser to the call-tree builder.
//!
//! The tree is deliberately untyped: a node is a rule kind, a byte span and
//! ordered children. Leaf text (identifier names, number literals, string
//! bodies) is recovered by slicing the owning script with the node's span.
//!
//! # Shape contract
//!
//! - `Script` / `Block`: children are `Call` nodes.
//! - `Call`: first child is the target expression; the rest are argument
//!   expressions, `DotShortcut` nodes (each following an `Identifier`), at
//!   most one `ColonShortcut`, and at most one trailing `Pipe`.
//! - `ColonShortcut`: exactly one `Call` child (the right-hand side).
//! - `DotShortcut`: exactly one `Identifier` child.
//! - `Pipe`: exactly one `Call` child.
//! - `SubCall`: exactly one `Call` child.
//! - `List`: children are expressions.
//! - `String`: children are `Script` nodes, one per `{...}` interpolation,
//!   in source order; their spans cover the text between the braces.
//! - `Identifier`, `Integer`, `Float`: leaves.

use crate::Span;

/// Grammar rule that produced a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Script,
    Call,
    Identifier,
    Integer,
    Float,
    String,
    Block,
    SubCall,
    List,
    ColonShortcut,
    DotShortcut,
    Pipe,
}

impl SyntaxKind {
    /// Whether a node of this kind may appear as a call target or argument.
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::Integer
                | SyntaxKind::Float
                | SyntaxKind::String
                | SyntaxKind::Block
                | SyntaxKind::SubCall
                | SyntaxKind::List
        )
    }
}

/// One positioned node of the concrete syntax tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        SyntaxNode {
            kind,
            span,
            children,
        }
    }

    pub fn leaf(kind: SyntaxKind, span: Span) -> Self {
        SyntaxNode {
            kind,
            span,
            children: Vec::new(),
        }
    }

    /// The only child, if there is exactly one.
    pub fn single_child(&self) -> Option<&SyntaxNode> {
        match self.children.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Count nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SyntaxNode::node_count)
            .sum::<usize>()
    }
}
