//! Token definitions and the `lex` entry point.

use logos::Logos;
use rill_ir::Span;

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"\\[ \t]*\n")]
enum RawToken {
    #[token("\n")]
    Newline,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("|")]
    Pipe,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[regex(r"-?[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<i64>().is_ok())]
    Int,

    #[regex(r"-?[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,

    #[token("\"", lex_string)]
    Str,

    #[regex(r"[A-Za-z_?!<>=+*/%][A-Za-z0-9_?!<>=+*/%\-]*")]
    Ident,
}

/// Consume the rest of a string literal after its opening quote.
fn lex_string(lex: &mut logos::Lexer<RawToken>) -> bool {
    let bytes = lex.remainder().as_bytes();
    match scan_string_body(bytes, 0) {
        Some(end) => {
            lex.bump(end);
            true
        }
        None => {
            lex.bump(bytes.len());
            false
        }
    }
}

/// Scan a string body starting at `i`; returns the index after the closing quote.
fn scan_string_body(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            b'{' => i = scan_interpolation(bytes, i + 1)?,
            _ => i += 1,
        }
    }
    None
}

/// Scan an interpolation body starting after `{`; returns the index after `}`.
fn scan_interpolation(bytes: &[u8], mut i: usize) -> Option<usize> {
    let mut depth = 1usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = scan_string_body(bytes, i + 1)?,
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Byte ranges of `{...}` interpolation bodies inside a string body.
///
/// `body` is the text between the quotes; returned ranges exclude the braces.
/// Escaped braces (`\{`) are skipped.
pub fn interpolation_ranges(body: &str) -> Vec<std::ops::Range<usize>> {
    let bytes = body.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'{' => {
                let Some(end) = scan_interpolation(bytes, i + 1) else {
                    break;
                };
                ranges.push(i + 1..end - 1);
                i = end;
            }
            _ => i += 1,
        }
    }
    ranges
}

/// Token kinds seen by the parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Newline,
    Semicolon,
    Colon,
    Dot,
    Pipe,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Int,
    Float,
    Str,
    Ident,
    /// Unrecognized input, unterminated string, or out-of-range integer.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable description for parse errors.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Newline => "newline",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::Pipe => "`|`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::Str => "string",
            TokenKind::Ident => "identifier",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of input",
        }
    }

    /// Whether this token can begin an expression.
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Int
                | TokenKind::Float
                | TokenKind::Str
                | TokenKind::LParen
                | TokenKind::LBrace
                | TokenKind::LBracket
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Tokens of one script, always terminated by an `Eof` token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`, or the trailing `Eof` when past the end.
    pub fn get(&self, index: usize) -> Token {
        self.tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .copied()
            .unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY))
    }

    pub fn kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.tokens.iter().map(|t| t.kind)
    }
}

/// Lex source code into a `TokenList`.
pub fn lex(source: &str) -> TokenList {
    let mut tokens = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(result) = logos.next() {
        let span = Span::from_range(logos.span());
        let kind = match result {
            Ok(raw) => convert_token(raw),
            Err(()) => TokenKind::Error,
        };
        tokens.push(Token::new(kind, span));
    }

    let eof = u32::try_from(source.len()).unwrap_or(u32::MAX);
    tokens.push(Token::new(TokenKind::Eof, Span::point(eof)));
    TokenList { tokens }
}

fn convert_token(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Newline => TokenKind::Newline,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Int => TokenKind::Int,
        RawToken::Float => TokenKind::Float,
        RawToken::Str => TokenKind::Str,
        RawToken::Ident => TokenKind::Ident,
    }
}
