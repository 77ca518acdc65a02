mod cursor;
mod error;
pub mod formatter;
mod state;
mod token;

use cursor::{SourceChar, SourcePosition};
pub use error::{LexicalError, LexicalErrorKind};
use state::{LexerState, LexerStateTransition};
use std::str::Chars;
pub use token::{Span, Token, TokenKind, TokenLiteral};

#[derive(Debug)]
enum LookAhead {
    None,
    Single(SourceChar),
    Double(SourceChar, SourceChar),
}

#[derive(Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Chars<'src>,
    state: LexerState,
    lookahead: LookAhead,
    offset: u32,
    line: u32,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            state: LexerState::default(),
            lookahead: LookAhead::None,
            offset: 0,
            line: 1,
            finished: false,
        }
    }
}

impl<'src> Lexer<'src> {
    fn next_char(&mut self) -> Option<SourceChar> {
        match self.lookahead {
            LookAhead::None => {
                let c = self.chars.next()?;
                let line = self.line;
                if c == '\n' {
                    self.line += 1;
                }
                let old_offset = self.offset;
                self.offset += c.len_utf8() as u32;
                Some(SourceChar {
                    value: c,
                    offset: old_offset,
                    line,
                })
            }
            LookAhead::Single(lookahead) => {
                self.lookahead = LookAhead::None;
                Some(lookahead)
            }
            LookAhead::Double(first, second) => {
                self.lookahead = LookAhead::Single(second);
                Some(first)
            }
        }
    }

    fn put_back_char(&mut self, c: SourceChar) {
        self.lookahead = match self.lookahead {
            LookAhead::None => LookAhead::Single(c),
            LookAhead::Single(next) => LookAhead::Double(c, next),
            LookAhead::Double(..) => unreachable!("At most two characters are ever put back."),
        };
    }

    fn put_back_two_chars(&mut self, first: SourceChar, second: SourceChar) {
        self.put_back_char(second);
        self.put_back_char(first);
    }

    /// The position just past the furthest character handed out.
    fn current_position(&self) -> SourcePosition {
        SourcePosition {
            offset: self.offset,
            line: self.line,
        }
    }

    /// Produces the next token, or a lexical error for characters that could not form one.
    /// Once the end of input is reached every further call yields another `EOF` token.
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        loop {
            let next_char = self.next_char();
            let position = self.current_position();
            let transition = self.state.execute(self.source, next_char, position);

            match transition {
                LexerStateTransition::Stay => {}
                LexerStateTransition::ChangeState(new_state) => {
                    self.state = new_state;
                }
                LexerStateTransition::ChangeStateAndEmit {
                    new_state,
                    token_or_error,
                } => {
                    self.state = new_state;
                    return token_or_error;
                }
                LexerStateTransition::ChangeStateAndEmitAndPutBack {
                    new_state,
                    token_or_error,
                    put_back,
                } => {
                    self.state = new_state;
                    self.put_back_char(put_back);
                    return token_or_error;
                }
                LexerStateTransition::ChangeStateAndEmitAndPutBackTwo {
                    new_state,
                    token_or_error,
                    put_back,
                } => {
                    self.state = new_state;
                    self.put_back_two_chars(put_back.0, put_back.1);
                    return token_or_error;
                }
            }
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexicalError>;

    /// Ends after yielding the `EOF` token.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if matches!(result, Ok(Token { kind: TokenKind::Eof, .. })) {
            self.finished = true;
        }
        Some(result)
    }
}

/// Every token of a source text, plus the lexical errors met along the way.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Always ends with an `EOF` token.
    pub tokens: Vec<Token>,
    pub errors: Vec<LexicalError>,
}

impl ScanResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn scan(source: &str) -> ScanResult {
    let mut result = ScanResult::default();
    for token_or_error in Lexer::new(source) {
        match token_or_error {
            Ok(token) => result.tokens.push(token),
            Err(error) => {
                tracing::debug!(code = error.code(), line = error.line, "lexical error");
                result.errors.push(error)
            }
        }
    }
    tracing::trace!(tokens = result.tokens.len(), "scanned source");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_yields_only_eof() {
        let result = scan("");
        assert!(!result.has_errors());
        assert_eq!(result.tokens, vec![Token::eof(0, 1)]);
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            kinds("123."),
            vec![TokenKind::NumericLiteral, TokenKind::Dot, TokenKind::Eof]
        );
        assert_eq!(
            kinds("1.x"),
            vec![
                TokenKind::NumericLiteral,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
        let tokens = scan("12.5").tokens;
        assert_eq!(tokens[0].literal, Some(TokenLiteral::Number(12.5)));
    }

    #[test]
    fn lines_advance_inside_strings_and_comments() {
        let tokens = scan("\"a\nb\" /* x\n\n */ y").tokens;
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[0].literal, Some(TokenLiteral::String("a\nb".into())));
        assert_eq!(tokens[1].lexeme, "y");
        assert_eq!(tokens[1].line, 4);
    }

    #[test]
    fn block_comment_with_stars_closes() {
        assert_eq!(kinds("/* ** **/ 1"), vec![TokenKind::NumericLiteral, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_inputs_are_reported() {
        let result = scan("\"abc");
        assert_eq!(result.errors[0].kind, LexicalErrorKind::UnclosedString);
        assert_eq!(result.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

        let result = scan("/* never closed");
        assert_eq!(result.errors[0].kind, LexicalErrorKind::UnclosedComment);
    }

    #[test]
    fn unknown_characters_do_not_stop_scanning() {
        let result = scan("@ # 1");
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].kind, LexicalErrorKind::Unrecognized('@'));
        assert_eq!(
            result.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::NumericLiteral, TokenKind::Eof]
        );
    }
}
