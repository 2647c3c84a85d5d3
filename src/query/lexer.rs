use logos::Logos;

use super::error::QueryError;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum TokenKind {
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    /// Node names, kind names and predicate positions.
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_.\-]*", |lex| lex.slice().to_string())]
    Name(String),
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Split path text into tokens. Whitespace between tokens is ignored.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let position = lexer.span().start;
        match result {
            Ok(kind) => tokens.push(Token { kind, position }),
            Err(()) => return Err(QueryError::syntax("unexpected character", source, position)),
        }
    }

    Ok(tokens)
}
