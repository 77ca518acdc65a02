use crate::lexer::{Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("{message}")]
    UnexpectedToken {
        expected: TokenKind,
        message: &'static str,
    },
    #[error("Expect expression.")]
    NonExpression,
    #[error("Invalid assignment target.")]
    InvalidLValue,
    #[error("Can't have more than {limit} parameters.")]
    TooManyParameters { limit: usize },
    #[error("Can't have more than {limit} arguments.")]
    TooManyArguments { limit: usize },
    #[error("Can't return from top-level code.")]
    NonFunctionReturn,
    #[error("Can't nest more than {limit} levels.")]
    TooDeep { limit: usize },
}

/// ` at end` for the end of input, otherwise ` at '<lexeme>'`.
fn location(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => " at end".into(),
        _ => format!(" at '{}'", token.lexeme),
    }
}

/// A syntax error, reported against the token where it was noticed.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("[line {}] Error{}: {kind}", .token.line, location(.token))]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    pub token: Token,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, token: &Token) -> Self {
        Self {
            kind,
            token: token.clone(),
        }
    }

    pub fn line(&self) -> u32 {
        self.token.line
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "PA001",
            ParserErrorKind::NonExpression => "PA002",
            ParserErrorKind::InvalidLValue => "PA003",
            ParserErrorKind::TooManyParameters { .. } => "PA004",
            ParserErrorKind::TooManyArguments { .. } => "PA005",
            ParserErrorKind::NonFunctionReturn => "PA006",
            ParserErrorKind::TooDeep { .. } => "PA007",
        }
    }
}
