//! Recursive-descent parser over the token stream.

use rill_ir::{Span, SyntaxKind, SyntaxNode};
use rill_lexer::{interpolation_ranges, lex, Token, TokenKind};

/// User-facing syntax error with the span it applies to.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {found}, expected {expected}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },
    #[error("invalid token")]
    InvalidToken { span: Span },
    #[error("unclosed {delimiter}")]
    Unclosed { delimiter: &'static str, span: Span },
    #[error("{message}")]
    Misplaced { message: &'static str, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unexpected { span, .. }
            | ParseError::InvalidToken { span }
            | ParseError::Unclosed { span, .. }
            | ParseError::Misplaced { span, .. } => *span,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Parse a whole script into a `Script` node.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> ParseResult<SyntaxNode> {
    let tokens = lex(source).as_slice().to_vec();
    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    Parser::new(source, tokens).parse_script(Span::new(0, end))
}

struct Parser<'src> {
    /// Full script text; all token spans are absolute offsets into it.
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    /// Newline handling per open delimiter: `true` inside `(...)` and `[...]`.
    skip_newlines: Vec<bool>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
            skip_newlines: Vec::new(),
        }
    }

    fn token_at(&self, index: usize) -> Token {
        self.tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY))
    }

    fn peek(&mut self) -> Token {
        if self.skip_newlines.last().copied().unwrap_or(false) {
            while self.token_at(self.pos).kind == TokenKind::Newline {
                self.pos += 1;
            }
        }
        self.token_at(self.pos)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn expect_close(&mut self, kind: TokenKind, delimiter: &'static str, open: Span) -> ParseResult<Token> {
        let token = self.peek();
        if token.kind == kind {
            return Ok(self.bump());
        }
        if token.kind == TokenKind::Eof {
            return Err(ParseError::Unclosed {
                delimiter,
                span: open,
            });
        }
        Err(ParseError::Unexpected {
            expected: kind.describe(),
            found: token.kind.describe(),
            span: token.span,
        })
    }

    fn parse_script(&mut self, span: Span) -> ParseResult<SyntaxNode> {
        let calls = self.parse_calls(TokenKind::Eof)?;
        Ok(SyntaxNode::new(SyntaxKind::Script, span, calls))
    }

    /// Parse separator-delimited calls up to (not including) `terminator`.
    fn parse_calls(&mut self, terminator: TokenKind) -> ParseResult<Vec<SyntaxNode>> {
        let mut calls = Vec::new();
        loop {
            while matches!(
                self.peek().kind,
                TokenKind::Newline | TokenKind::Semicolon
            ) {
                self.bump();
            }
            let next = self.peek();
            if next.kind == terminator || next.kind == TokenKind::Eof {
                break;
            }
            calls.push(self.parse_call()?);

            let after = self.peek();
            match after.kind {
                TokenKind::Newline | TokenKind::Semicolon => {}
                kind if kind == terminator || kind == TokenKind::Eof => break,
                kind => {
                    return Err(ParseError::Unexpected {
                        expected: "`;` or newline",
                        found: kind.describe(),
                        span: after.span,
                    })
                }
            }
        }
        Ok(calls)
    }

    fn parse_call(&mut self) -> ParseResult<SyntaxNode> {
        let target = self.parse_expr()?;
        let start = target.span;
        let mut last_is_identifier = target.kind == SyntaxKind::Identifier;
        let mut has_arguments = false;
        let mut children = vec![target];

        loop {
            let next = self.peek();
            match next.kind {
                TokenKind::Dot => {
                    if !last_is_identifier {
                        return Err(ParseError::Misplaced {
                            message: "`.` must follow an identifier",
                            span: next.span,
                        });
                    }
                    children.push(self.parse_dot()?);
                }
                TokenKind::Colon => {
                    if has_arguments {
                        return Err(ParseError::Misplaced {
                            message: "`:` must directly follow the call target",
                            span: next.span,
                        });
                    }
                    self.bump();
                    let rhs = self.parse_call()?;
                    let span = next.span.merge(rhs.span);
                    children.push(SyntaxNode::new(SyntaxKind::ColonShortcut, span, vec![rhs]));
                    break;
                }
                TokenKind::Pipe => {
                    self.bump();
                    let rhs = self.parse_call()?;
                    let span = next.span.merge(rhs.span);
                    children.push(SyntaxNode::new(SyntaxKind::Pipe, span, vec![rhs]));
                    break;
                }
                kind if kind.starts_expression() => {
                    let expr = self.parse_expr()?;
                    last_is_identifier = expr.kind == SyntaxKind::Identifier;
                    has_arguments = true;
                    children.push(expr);
                }
                _ => break,
            }
        }

        let end = children.last().map_or(start, |c| c.span);
        Ok(SyntaxNode::new(SyntaxKind::Call, start.merge(end), children))
    }

    fn parse_dot(&mut self) -> ParseResult<SyntaxNode> {
        let dot = self.bump();
        let name = self.peek();
        if name.kind != TokenKind::Ident {
            return Err(ParseError::Unexpected {
                expected: "identifier after `.`",
                found: name.kind.describe(),
                span: name.span,
            });
        }
        self.bump();
        let ident = SyntaxNode::leaf(SyntaxKind::Identifier, name.span);
        Ok(SyntaxNode::new(
            SyntaxKind::DotShortcut,
            dot.span.merge(name.span),
            vec![ident],
        ))
    }

    fn parse_expr(&mut self) -> ParseResult<SyntaxNode> {
        let token = self.bump();
        match token.kind {
            TokenKind::Ident => Ok(SyntaxNode::leaf(SyntaxKind::Identifier, token.span)),
            TokenKind::Int => Ok(SyntaxNode::leaf(SyntaxKind::Integer, token.span)),
            TokenKind::Float => Ok(SyntaxNode::leaf(SyntaxKind::Float, token.span)),
            TokenKind::Str => self.parse_string(token.span),
            TokenKind::LParen => {
                self.skip_newlines.push(true);
                if self.peek().kind == TokenKind::RParen {
                    return Err(ParseError::Misplaced {
                        message: "empty `()` is not a call",
                        span: token.span.merge(self.peek().span),
                    });
                }
                let call = self.parse_call()?;
                let close = self.expect_close(TokenKind::RParen, "`(`", token.span)?;
                self.skip_newlines.pop();
                Ok(SyntaxNode::new(
                    SyntaxKind::SubCall,
                    token.span.merge(close.span),
                    vec![call],
                ))
            }
            TokenKind::LBrace => {
                self.skip_newlines.push(false);
                let calls = self.parse_calls(TokenKind::RBrace)?;
                let close = self.expect_close(TokenKind::RBrace, "`{`", token.span)?;
                self.skip_newlines.pop();
                Ok(SyntaxNode::new(
                    SyntaxKind::Block,
                    token.span.merge(close.span),
                    calls,
                ))
            }
            TokenKind::LBracket => {
                self.skip_newlines.push(true);
                let mut items: Vec<SyntaxNode> = Vec::new();
                loop {
                    let next = self.peek();
                    match next.kind {
                        TokenKind::RBracket | TokenKind::Eof => break,
                        TokenKind::Dot
                            if items.last().is_some_and(|n| {
                                matches!(n.kind, SyntaxKind::Identifier | SyntaxKind::DotShortcut)
                            }) =>
                        {
                            items.push(self.parse_dot()?);
                        }
                        _ => items.push(self.parse_expr()?),
                    }
                }
                let close = self.expect_close(TokenKind::RBracket, "`[`", token.span)?;
                self.skip_newlines.pop();
                Ok(SyntaxNode::new(
                    SyntaxKind::List,
                    token.span.merge(close.span),
                    items,
                ))
            }
            TokenKind::Error => Err(ParseError::InvalidToken { span: token.span }),
            kind => Err(ParseError::Unexpected {
                expected: "expression",
                found: kind.describe(),
                span: token.span,
            }),
        }
    }

    /// Build a `String` node, parsing each `{...}` interpolation as a script.
    fn parse_string(&mut self, span: Span) -> ParseResult<SyntaxNode> {
        let body_start = span.start.saturating_add(1);
        let body_end = span.end.saturating_sub(1).max(body_start);
        let body = self
            .source
            .get(body_start as usize..body_end as usize)
            .unwrap_or("");

        let mut children = Vec::new();
        for range in interpolation_ranges(body) {
            let start = body_start + u32::try_from(range.start).unwrap_or(0);
            let end = body_start + u32::try_from(range.end).unwrap_or(0);
            let inner = self.source.get(start as usize..end as usize).unwrap_or("");
            let tokens = lex(inner)
                .as_slice()
                .iter()
                .map(|t| Token::new(t.kind, Span::new(t.span.start + start, t.span.end + start)))
                .collect();
            let mut sub = Parser::new(self.source, tokens);
            children.push(sub.parse_script(Span::new(start, end))?);
        }
        Ok(SyntaxNode::new(SyntaxKind::String, span, children))
    }
}
