//! Syntax tree to call tree.
//!
//! The builder is the only consumer of `SyntaxNode`s. It removes all
//! surface sugar so the engine only ever sees plain calls:
//!
//! - `target: rhs` becomes `set target rhs`
//! - `a.b.c` becomes one namespaced identifier
//! - `a | b` attaches `b` as the pipe of `a`
//! - `[x y]` becomes a call to the pre-bound list constructor
//! - string escapes are resolved and `{...}` interpolations become blocks
//!
//! A tree that breaks the parser contract is a `BuildError`. These are
//! internal faults, not script errors.

use rill_ir::{SharedScript, Span, SyntaxKind, SyntaxNode};

use crate::builtins::list_constructor;
use crate::call::{Argument, Block, Call};
use crate::value::{Identifier, Interpolation, Value};

/// Contract violation between parser and builder.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("expected {expected} node, found {found:?} at {span}")]
    UnexpectedNode {
        expected: &'static str,
        found: SyntaxKind,
        span: Span,
    },
    #[error("malformed {kind:?} node at {span}: {reason}")]
    Malformed {
        kind: SyntaxKind,
        span: Span,
        reason: &'static str,
    },
    #[error("invalid {what} literal «{text}» at {span}")]
    InvalidLiteral {
        what: &'static str,
        text: String,
        span: Span,
    },
}

type BuildResult<T> = Result<T, BuildError>;

/// Build the block for a `Script` node of `script`.
#[tracing::instrument(level = "debug", skip_all, fields(script = script.name()))]
pub fn build(root: &SyntaxNode, script: &SharedScript) -> BuildResult<Block> {
    if root.kind != SyntaxKind::Script {
        return Err(BuildError::UnexpectedNode {
            expected: "Script",
            found: root.kind,
            span: root.span,
        });
    }
    Builder { script }.block(root)
}

struct Builder<'a> {
    script: &'a SharedScript,
}

impl Builder<'_> {
    fn text(&self, span: Span) -> &str {
        self.script.slice(span)
    }

    fn literal(&self, value: Value, span: Span) -> Argument {
        Argument::literal(value, span, self.script.clone())
    }

    fn block(&self, node: &SyntaxNode) -> BuildResult<Block> {
        let calls = node
            .children
            .iter()
            .map(|child| self.call(child))
            .collect::<BuildResult<Vec<_>>>()?;
        Ok(Block::new(calls))
    }

    fn call(&self, node: &SyntaxNode) -> BuildResult<Call> {
        if node.kind != SyntaxKind::Call {
            return Err(BuildError::UnexpectedNode {
                expected: "Call",
                found: node.kind,
                span: node.span,
            });
        }
        let Some((target_node, rest)) = node.children.split_first() else {
            return Err(BuildError::Malformed {
                kind: node.kind,
                span: node.span,
                reason: "call without a target",
            });
        };

        let mut target = self.expr(target_node)?;
        let mut args: Vec<Argument> = Vec::new();
        let mut pipe = None;

        for child in rest {
            match child.kind {
                SyntaxKind::DotShortcut => {
                    let last = args.last_mut().unwrap_or(&mut target);
                    *last = self.extend_path(last, child)?;
                }
                SyntaxKind::ColonShortcut => {
                    if !args.is_empty() {
                        return Err(BuildError::Malformed {
                            kind: child.kind,
                            span: child.span,
                            reason: "`:` after call arguments",
                        });
                    }
                    let value = self.colon_value(child)?;
                    let set = self.literal(Value::identifier("set"), target.span());
                    args.push(std::mem::replace(&mut target, set));
                    args.push(value);
                }
                SyntaxKind::Pipe => {
                    let next = single(child, SyntaxKind::Call)?;
                    pipe = Some(self.call(next)?);
                }
                _ => args.push(self.expr(child)?),
            }
        }

        let call = Call::new(target, args, node.span, self.script.clone());
        Ok(match pipe {
            Some(next) => call.with_pipe(next),
            None => call,
        })
    }

    /// Right-hand side of `target: rhs` as the second argument of `set`.
    ///
    /// A bare expression is passed directly; anything else is wrapped as a
    /// nested call.
    fn colon_value(&self, node: &SyntaxNode) -> BuildResult<Argument> {
        let rhs = single(node, SyntaxKind::Call)?;
        if let Some(only) = rhs.single_child() {
            if only.kind.is_expression() {
                return self.expr(only);
            }
        }
        let call = self.call(rhs)?;
        Ok(self.literal(Value::call(call), rhs.span))
    }

    /// Append the identifier of a `DotShortcut` to a preceding identifier.
    fn extend_path(&self, base: &Argument, dot: &SyntaxNode) -> BuildResult<Argument> {
        let Some(ident) = base.value().as_identifier() else {
            return Err(BuildError::Malformed {
                kind: dot.kind,
                span: dot.span,
                reason: "`.` must follow an identifier",
            });
        };
        let segment = single(dot, SyntaxKind::Identifier)?;
        let segments = ident
            .segments()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.text(segment.span)));
        let Some(path) = Identifier::from_segments(segments) else {
            return Err(BuildError::Malformed {
                kind: dot.kind,
                span: dot.span,
                reason: "empty identifier path",
            });
        };
        Ok(self.literal(Value::path(path), base.span().merge(dot.span)))
    }

    fn expr(&self, node: &SyntaxNode) -> BuildResult<Argument> {
        let value = match node.kind {
            SyntaxKind::Identifier => Value::identifier(self.text(node.span)),
            SyntaxKind::Integer => {
                let text = self.text(node.span);
                let parsed = text.replace('_', "").parse::<i64>();
                Value::int(parsed.map_err(|_| invalid("integer", text, node.span))?)
            }
            SyntaxKind::Float => {
                let text = self.text(node.span);
                let parsed = text.replace('_', "").parse::<f64>();
                match parsed {
                    Ok(f) if f.is_finite() => Value::float(f),
                    _ => return Err(invalid("float", text, node.span)),
                }
            }
            SyntaxKind::String => self.string(node)?,
            SyntaxKind::Block => Value::block(self.block(node)?),
            SyntaxKind::SubCall => {
                let inner = single(node, SyntaxKind::Call)?;
                Value::call(self.call(inner)?)
            }
            SyntaxKind::List => Value::call(self.list(node)?),
            found => {
                return Err(BuildError::UnexpectedNode {
                    expected: "expression",
                    found,
                    span: node.span,
                })
            }
        };
        Ok(self.literal(value, node.span))
    }

    fn list(&self, node: &SyntaxNode) -> BuildResult<Call> {
        let mut items: Vec<Argument> = Vec::with_capacity(node.children.len());
        for child in &node.children {
            if child.kind == SyntaxKind::DotShortcut {
                let Some(last) = items.last_mut() else {
                    return Err(BuildError::Malformed {
                        kind: child.kind,
                        span: child.span,
                        reason: "`.` at the start of a list",
                    });
                };
                *last = self.extend_path(last, child)?;
            } else {
                items.push(self.expr(child)?);
            }
        }
        Ok(Call::bound(
            list_constructor(),
            items,
            node.span,
            self.script.clone(),
        ))
    }

    /// Unescape a string literal and attach its interpolation blocks.
    fn string(&self, node: &SyntaxNode) -> BuildResult<Value> {
        let body_start = node.span.start.saturating_add(1);
        let body_end = node.span.end.saturating_sub(1).max(body_start);
        let body = self.text(Span::new(body_start, body_end));

        let mut text = String::with_capacity(body.len());
        let mut interpolations = Vec::with_capacity(node.children.len());
        let mut pending = node.children.iter().peekable();
        let mut chars = body.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            let offset = body_start + u32::try_from(i).unwrap_or(u32::MAX);
            if let Some(script) = pending.next_if(|s| s.span.start == offset + 1) {
                if script.kind != SyntaxKind::Script {
                    return Err(BuildError::UnexpectedNode {
                        expected: "Script",
                        found: script.kind,
                        span: script.span,
                    });
                }
                interpolations.push(Interpolation {
                    offset: text.len(),
                    block: self.block(script)?,
                });
                // Skip the interpolated source and its closing brace.
                let resume = (script.span.end - body_start) as usize + 1;
                while chars.next_if(|&(j, _)| j < resume).is_some() {}
                continue;
            }
            if c == '\\' {
                match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, escaped @ ('"' | '\\' | '{' | '}'))) => text.push(escaped),
                    Some((_, other)) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => text.push('\\'),
                }
            } else {
                text.push(c);
            }
        }

        if let Some(stray) = pending.next() {
            return Err(BuildError::Malformed {
                kind: SyntaxKind::String,
                span: stray.span,
                reason: "interpolation outside the string body",
            });
        }
        Ok(if interpolations.is_empty() {
            Value::string(text)
        } else {
            Value::interpolated(text, interpolations)
        })
    }
}

/// The only child of `node`, which must be of kind `kind`.
fn single(node: &SyntaxNode, kind: SyntaxKind) -> BuildResult<&SyntaxNode> {
    match node.single_child() {
        Some(child) if child.kind == kind => Ok(child),
        Some(child) => Err(BuildError::UnexpectedNode {
            expected: kind_name(kind),
            found: child.kind,
            span: child.span,
        }),
        None => Err(BuildError::Malformed {
            kind: node.kind,
            span: node.span,
            reason: "expected exactly one child",
        }),
    }
}

fn kind_name(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::Call => "Call",
        SyntaxKind::Identifier => "Identifier",
        SyntaxKind::Script => "Script",
        _ => "expression",
    }
}

fn invalid(what: &'static str, text: &str, span: Span) -> BuildError {
    BuildError::InvalidLiteral {
        what,
        text: text.to_string(),
        span,
    }
}

#[cfg(test)]
mod tests;
