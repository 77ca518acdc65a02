use super::cursor::{SourceChar, SourcePosition};
use super::token::{Span, Token, TokenKind, TokenLiteral, KEYWORD_HASHMAP};
use super::{LexicalError, LexicalErrorKind};

pub enum LexerStateTransition {
    Stay,
    ChangeState(LexerState),
    ChangeStateAndEmit {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
    },
    ChangeStateAndEmitAndPutBack {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
        put_back: SourceChar,
    },
    ChangeStateAndEmitAndPutBackTwo {
        new_state: LexerState,
        token_or_error: Result<Token, LexicalError>,
        put_back: (SourceChar, SourceChar),
    },
}

impl LexerStateTransition {
    fn emit(token_or_error: Result<Token, LexicalError>) -> Self {
        Self::ChangeStateAndEmit {
            new_state: LexerState::Normal,
            token_or_error,
        }
    }

    fn emit_and_put_back(token_or_error: Result<Token, LexicalError>, put_back: SourceChar) -> Self {
        Self::ChangeStateAndEmitAndPutBack {
            new_state: LexerState::Normal,
            token_or_error,
            put_back,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum LexerState {
    #[default]
    Normal,
    Operator(OperatorState),
    Slash(SourceChar),
    LineComment,
    BlockComment(BlockCommentState),
    String(SourceChar),
    Number(NumberState),
    NumberDot(NumberDotState),
    Ident(SourceChar),
}

impl LexerState {
    pub fn execute(
        &self,
        source: &str,
        next_char: Option<SourceChar>,
        position: SourcePosition,
    ) -> LexerStateTransition {
        match self {
            LexerState::Normal => execute_normal(source, next_char, position),
            LexerState::Operator(s) => s.execute(source, next_char),
            LexerState::Slash(first) => execute_slash(source, *first, next_char),
            LexerState::LineComment => execute_line_comment(next_char),
            LexerState::BlockComment(s) => s.execute(next_char, position),
            LexerState::String(start) => execute_string(source, *start, next_char, position),
            LexerState::Number(s) => s.execute(source, next_char, position),
            LexerState::NumberDot(s) => s.execute(source, next_char),
            LexerState::Ident(start) => execute_ident(source, *start, next_char, position),
        }
    }
}

fn make_token(
    source: &str,
    kind: TokenKind,
    span: Span,
    line: u32,
    literal: Option<TokenLiteral>,
) -> Token {
    Token {
        kind,
        lexeme: source[span.range()].into(),
        literal,
        span,
        line,
    }
}

fn single_char_token(source: &str, kind: TokenKind, c: SourceChar) -> Token {
    make_token(
        source,
        kind,
        Span::between(c.offset, c.next_offset()),
        c.line,
        None,
    )
}

fn execute_normal(
    source: &str,
    next_char: Option<SourceChar>,
    position: SourcePosition,
) -> LexerStateTransition {
    let Some(c) = next_char else {
        return LexerStateTransition::emit(Ok(Token::eof(position.offset, position.line)));
    };

    let just = |kind: TokenKind| LexerStateTransition::emit(Ok(single_char_token(source, kind, c)));
    let operator = |single: TokenKind, double: TokenKind| {
        LexerStateTransition::ChangeState(LexerState::Operator(OperatorState {
            first: c,
            single,
            double,
        }))
    };

    match c.value {
        // Single character tokens
        '(' => just(TokenKind::LeftParenthesis),
        ')' => just(TokenKind::RightParenthesis),
        '{' => just(TokenKind::LeftBrace),
        '}' => just(TokenKind::RightBrace),
        ',' => just(TokenKind::Comma),
        '.' => just(TokenKind::Dot),
        '-' => just(TokenKind::Minus),
        '+' => just(TokenKind::Plus),
        ';' => just(TokenKind::Semicolon),
        '*' => just(TokenKind::Star),
        // One or two character tokens
        '!' => operator(TokenKind::Bang, TokenKind::BangEqual),
        '=' => operator(TokenKind::Equal, TokenKind::EqualEqual),
        '<' => operator(TokenKind::LessThan, TokenKind::LessThanEqual),
        '>' => operator(TokenKind::GreaterThan, TokenKind::GreaterThanEqual),
        // Division or comment
        '/' => LexerStateTransition::ChangeState(LexerState::Slash(c)),
        '"' => LexerStateTransition::ChangeState(LexerState::String(c)),
        '0'..='9' => LexerStateTransition::ChangeState(LexerState::Number(NumberState {
            start: c,
            fractional: false,
        })),
        'a'..='z' | 'A'..='Z' | '_' => LexerStateTransition::ChangeState(LexerState::Ident(c)),
        ' ' | '\r' | '\t' | '\n' => LexerStateTransition::Stay,
        other => LexerStateTransition::emit(Err(LexicalError {
            kind: LexicalErrorKind::Unrecognized(other),
            span: Span::between(c.offset, c.next_offset()),
            line: c.line,
        })),
    }
}

#[derive(Debug, Clone)]
pub struct OperatorState {
    first: SourceChar,
    single: TokenKind,
    double: TokenKind,
}

impl OperatorState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(second) if second.value == '=' => LexerStateTransition::emit(Ok(make_token(
                source,
                self.double,
                Span::between(self.first.offset, second.next_offset()),
                self.first.line,
                None,
            ))),
            Some(other) => LexerStateTransition::emit_and_put_back(
                Ok(single_char_token(source, self.single, self.first)),
                other,
            ),
            None => {
                LexerStateTransition::emit(Ok(single_char_token(source, self.single, self.first)))
            }
        }
    }
}

fn execute_slash(
    source: &str,
    first: SourceChar,
    next_char: Option<SourceChar>,
) -> LexerStateTransition {
    match next_char {
        Some(SourceChar { value: '/', .. }) => {
            LexerStateTransition::ChangeState(LexerState::LineComment)
        }
        Some(SourceChar { value: '*', .. }) => {
            LexerStateTransition::ChangeState(LexerState::BlockComment(BlockCommentState {
                start: first,
                closing: false,
            }))
        }
        Some(other) => LexerStateTransition::emit_and_put_back(
            Ok(single_char_token(source, TokenKind::Slash, first)),
            other,
        ),
        None => LexerStateTransition::emit(Ok(single_char_token(source, TokenKind::Slash, first))),
    }
}

fn execute_line_comment(next_char: Option<SourceChar>) -> LexerStateTransition {
    match next_char {
        Some(SourceChar { value: '\n', .. }) | None => {
            LexerStateTransition::ChangeState(LexerState::Normal)
        }
        Some(_) => LexerStateTransition::Stay,
    }
}

#[derive(Debug, Clone)]
pub struct BlockCommentState {
    start: SourceChar,
    /// Set when the previous character was a `*`.
    closing: bool,
}

impl BlockCommentState {
    fn execute(
        &self,
        next_char: Option<SourceChar>,
        position: SourcePosition,
    ) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::emit(Err(LexicalError {
                kind: LexicalErrorKind::UnclosedComment,
                span: Span::between(self.start.offset, position.offset),
                line: self.start.line,
            }));
        };

        match (c.value, self.closing) {
            ('/', true) => LexerStateTransition::ChangeState(LexerState::Normal),
            ('*', false) => LexerStateTransition::ChangeState(LexerState::BlockComment(Self {
                start: self.start,
                closing: true,
            })),
            ('*', true) => LexerStateTransition::Stay,
            (_, true) => LexerStateTransition::ChangeState(LexerState::BlockComment(Self {
                start: self.start,
                closing: false,
            })),
            (_, false) => LexerStateTransition::Stay,
        }
    }
}

fn execute_string(
    source: &str,
    start: SourceChar,
    next_char: Option<SourceChar>,
    position: SourcePosition,
) -> LexerStateTransition {
    match next_char {
        Some(c) if c.value == '"' => {
            let contents = &source[start.next_offset() as usize..c.offset as usize];
            LexerStateTransition::emit(Ok(make_token(
                source,
                TokenKind::StringLiteral,
                Span::between(start.offset, c.next_offset()),
                start.line,
                Some(TokenLiteral::String(contents.into())),
            )))
        }
        Some(_) => LexerStateTransition::Stay,
        None => LexerStateTransition::emit(Err(LexicalError {
            kind: LexicalErrorKind::UnclosedString,
            span: Span::between(start.offset, position.offset),
            line: start.line,
        })),
    }
}

fn number_token(source: &str, start: SourceChar, end: u32) -> Token {
    let span = Span::between(start.offset, end);
    let value: f64 = source[span.range()]
        .parse()
        .expect("Numeric lexemes are ASCII digits with at most one inner dot.");
    make_token(
        source,
        TokenKind::NumericLiteral,
        span,
        start.line,
        Some(TokenLiteral::Number(value)),
    )
}

#[derive(Debug, Clone)]
pub struct NumberState {
    start: SourceChar,
    fractional: bool,
}

impl NumberState {
    fn execute(
        &self,
        source: &str,
        next_char: Option<SourceChar>,
        position: SourcePosition,
    ) -> LexerStateTransition {
        let Some(c) = next_char else {
            return LexerStateTransition::emit(Ok(number_token(
                source,
                self.start,
                position.offset,
            )));
        };

        match c.value {
            '0'..='9' => LexerStateTransition::Stay,
            '.' if !self.fractional => {
                LexerStateTransition::ChangeState(LexerState::NumberDot(NumberDotState {
                    start: self.start,
                    dot: c,
                }))
            }
            _ => LexerStateTransition::emit_and_put_back(
                Ok(number_token(source, self.start, c.offset)),
                c,
            ),
        }
    }
}

/// A number followed by a `.` that is only part of the literal if a digit comes next.
#[derive(Debug, Clone)]
pub struct NumberDotState {
    start: SourceChar,
    dot: SourceChar,
}

impl NumberDotState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        let token = || Ok(number_token(source, self.start, self.dot.offset));
        match next_char {
            Some(c) if c.value.is_ascii_digit() => {
                LexerStateTransition::ChangeState(LexerState::Number(NumberState {
                    start: self.start,
                    fractional: true,
                }))
            }
            Some(c) => LexerStateTransition::ChangeStateAndEmitAndPutBackTwo {
                new_state: LexerState::Normal,
                token_or_error: token(),
                put_back: (self.dot, c),
            },
            None => LexerStateTransition::emit_and_put_back(token(), self.dot),
        }
    }
}

fn ident_or_keyword(source: &str, start: SourceChar, end: u32) -> Token {
    let span = Span::between(start.offset, end);
    let kind = KEYWORD_HASHMAP
        .get(&source[span.range()])
        .copied()
        .unwrap_or(TokenKind::Ident);
    make_token(source, kind, span, start.line, None)
}

fn execute_ident(
    source: &str,
    start: SourceChar,
    next_char: Option<SourceChar>,
    position: SourcePosition,
) -> LexerStateTransition {
    match next_char {
        Some(c) if c.value.is_ascii_alphanumeric() || c.value == '_' => LexerStateTransition::Stay,
        Some(c) => {
            LexerStateTransition::emit_and_put_back(Ok(ident_or_keyword(source, start, c.offset)), c)
        }
        None => LexerStateTransition::emit(Ok(ident_or_keyword(source, start, position.offset))),
    }
}
