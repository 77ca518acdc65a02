mod span;

use compact_str::CompactString;
pub use span::Span;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keywords
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("and", TokenKind::KeywordAnd),
        ("class", TokenKind::KeywordClass),
        ("else", TokenKind::KeywordElse),
        ("false", TokenKind::KeywordFalse),
        ("for", TokenKind::KeywordFor),
        ("fun", TokenKind::KeywordFun),
        ("if", TokenKind::KeywordIf),
        ("nil", TokenKind::KeywordNil),
        ("or", TokenKind::KeywordOr),
        ("print", TokenKind::KeywordPrint),
        ("return", TokenKind::KeywordReturn),
        ("super", TokenKind::KeywordSuper),
        ("this", TokenKind::KeywordThis),
        ("true", TokenKind::KeywordTrue),
        ("var", TokenKind::KeywordVar),
        ("while", TokenKind::KeywordWhile),
    ])
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Miscellaneous
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Star,
    // Operators
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Slash,

    // Literals
    NumericLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordAnd,
    KeywordClass,
    KeywordElse,
    KeywordFalse,
    KeywordFor,
    KeywordFun,
    KeywordIf,
    KeywordNil,
    KeywordOr,
    KeywordPrint,
    KeywordReturn,
    KeywordSuper,
    KeywordThis,
    KeywordTrue,
    KeywordVar,
    KeywordWhile,

    // End of file.
    Eof,
}

impl TokenKind {
    /// Tokens that open a new declaration or statement. Error recovery stops in front of them.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::KeywordClass
                | TokenKind::KeywordFun
                | TokenKind::KeywordVar
                | TokenKind::KeywordFor
                | TokenKind::KeywordIf
                | TokenKind::KeywordWhile
                | TokenKind::KeywordPrint
                | TokenKind::KeywordReturn
        )
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::LeftParenthesis => "LEFT_PAREN",
            TokenKind::RightParenthesis => "RIGHT_PAREN",
            TokenKind::LeftBrace => "LEFT_BRACE",
            TokenKind::RightBrace => "RIGHT_BRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::Dot => "DOT",
            TokenKind::Minus => "MINUS",
            TokenKind::Plus => "PLUS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Star => "STAR",
            TokenKind::Bang => "BANG",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::LessThan => "LESS",
            TokenKind::LessThanEqual => "LESS_EQUAL",
            TokenKind::GreaterThan => "GREATER",
            TokenKind::GreaterThanEqual => "GREATER_EQUAL",
            TokenKind::Slash => "SLASH",
            TokenKind::NumericLiteral => "NUMBER",
            TokenKind::StringLiteral => "STRING",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::KeywordAnd => "AND",
            TokenKind::KeywordClass => "CLASS",
            TokenKind::KeywordElse => "ELSE",
            TokenKind::KeywordFalse => "FALSE",
            TokenKind::KeywordFor => "FOR",
            TokenKind::KeywordFun => "FUN",
            TokenKind::KeywordIf => "IF",
            TokenKind::KeywordNil => "NIL",
            TokenKind::KeywordOr => "OR",
            TokenKind::KeywordPrint => "PRINT",
            TokenKind::KeywordReturn => "RETURN",
            TokenKind::KeywordSuper => "SUPER",
            TokenKind::KeywordThis => "THIS",
            TokenKind::KeywordTrue => "TRUE",
            TokenKind::KeywordVar => "VAR",
            TokenKind::KeywordWhile => "WHILE",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// The decoded value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenLiteral {
    Number(f64),
    String(CompactString),
}

impl Display for TokenLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenLiteral::Number(v) => write!(f, "{v:?}"),
            TokenLiteral::String(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text covered by the token.
    pub lexeme: CompactString,
    /// Present only for numeric and string literals.
    pub literal: Option<TokenLiteral>,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: u32,
}

impl Token {
    pub fn eof(offset: u32, line: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: CompactString::default(),
            literal: None,
            span: Span::new(offset, 0),
            line,
        }
    }
}
