use crate::lexer::Token;
use compact_str::CompactString;

/// A name as written in the source, together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: IdentName,
    pub line: u32,
}

impl Ident {
    pub fn new(name: impl Into<IdentName>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

impl From<&Token> for Ident {
    fn from(token: &Token) -> Self {
        Self {
            name: token.lexeme.clone(),
            line: token.line,
        }
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub type IdentName = CompactString;
