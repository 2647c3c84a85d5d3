use super::ast::{Axis, NodeTest, PathExpr, Query, Step};
use super::error::QueryError;
use super::lexer::{tokenize, Token, TokenKind};

/// Parse query text into a [`Query`].
pub fn parse(source: &str) -> Result<Query, QueryError> {
    let trimmed = source.trim();
    let offset = source.len() - source.trim_start().len();

    if trimmed.is_empty() {
        return Err(QueryError::syntax("empty query", source, 0));
    }
    if trimmed == "*" {
        return Ok(Query::All);
    }
    if let Some(rest) = trimmed.strip_prefix('#') {
        let id = rest.trim();
        if id.is_empty() {
            return Err(QueryError::syntax("expected an id after '#'", source, offset + 1));
        }
        return Ok(Query::Id(id.to_string()));
    }

    let tokens = tokenize(source)?;
    Parser {
        source,
        tokens,
        pos: 0,
    }
    .path()
    .map(Query::Path)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Byte offset of the current token, or the end of the source.
    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.position)
            .unwrap_or(self.source.len())
    }

    fn error(&self, message: &str) -> QueryError {
        QueryError::syntax(message, self.source, self.position())
    }

    fn path(&mut self) -> Result<PathExpr, QueryError> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(TokenKind::Slash) => {
                self.advance();
                if self.peek().is_none() {
                    return Ok(PathExpr {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Some(TokenKind::DoubleSlash) => {
                self.advance();
                steps.push(Step::descendant_or_self());
                true
            }
            _ => false,
        };

        steps.push(self.step()?);
        loop {
            match self.peek() {
                None => break,
                Some(TokenKind::Slash) => {
                    self.advance();
                }
                Some(TokenKind::DoubleSlash) => {
                    self.advance();
                    steps.push(Step::descendant_or_self());
                }
                Some(_) => return Err(self.error("expected '/' between steps")),
            }
            steps.push(self.step()?);
        }

        Ok(PathExpr { absolute, steps })
    }

    fn step(&mut self) -> Result<Step, QueryError> {
        let (axis, test) = match self.peek() {
            Some(TokenKind::Star) => (Axis::Child, NodeTest::Any),
            Some(TokenKind::Dot) => (Axis::SelfNode, NodeTest::Any),
            Some(TokenKind::DotDot) => (Axis::Parent, NodeTest::Any),
            Some(TokenKind::Name(name)) => (Axis::Child, name_test(name)),
            Some(_) => return Err(self.error("expected a step")),
            None => return Err(self.error("expected a step at end of query")),
        };
        self.advance();

        let mut predicates = Vec::new();
        while matches!(self.peek(), Some(TokenKind::LBracket)) {
            self.advance();
            predicates.push(self.position_predicate()?);
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn position_predicate(&mut self) -> Result<usize, QueryError> {
        let at = self.position();
        let value = match self.peek() {
            Some(TokenKind::Name(text)) if text.chars().all(|c| c.is_ascii_digit()) => {
                text.parse::<usize>().ok()
            }
            _ => None,
        };
        let Some(value) = value else {
            return Err(self.error("expected a position inside '[ ]'"));
        };
        if value == 0 {
            return Err(QueryError::syntax(
                "positions start at 1",
                self.source,
                at,
            ));
        }
        self.advance();
        match self.peek() {
            Some(TokenKind::RBracket) => {
                self.advance();
                Ok(value)
            }
            _ => Err(self.error("expected ']'")),
        }
    }
}

fn name_test(name: &str) -> NodeTest {
    if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        NodeTest::Kind(name.to_string())
    } else {
        NodeTest::Name(name.to_string())
    }
}
