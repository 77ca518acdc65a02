use super::token::{Token, TokenKind};
use super::{LexicalError, LexicalErrorKind};
use crate::report::Diagnostic;

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
    /// Formats a lexer error into a string.
    fn format_error(&self, error: &LexicalError) -> String;
}

/// `<KIND> <lexeme> <literal>` per token with `null` standing in for a missing literal.
pub struct BasicFormatter;

impl TokenFormatter for BasicFormatter {
    fn format(&self, token: &Token) -> String {
        match token.literal {
            Some(ref literal) => format!("{} {} {literal}", token.kind, token.lexeme),
            None => format!("{} {} null", token.kind, token.lexeme),
        }
    }

    fn format_error(&self, error: &LexicalError) -> String {
        format!("{error}")
    }
}

pub struct DebugFormatter;

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }

    fn format_error(&self, error: &LexicalError) -> String {
        format!("{error:?}")
    }
}

pub struct PrettyFormatter<'src> {
    name: &'src str,
    text: &'src str,
}

impl<'src> PrettyFormatter<'src> {
    pub fn new(name: &'src str, text: &'src str) -> Self {
        Self { name, text }
    }
}

impl<'src> TokenFormatter for PrettyFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let line = token.line;
        match token.kind {
            TokenKind::Eof => format!("({line}) EOF"),
            kind => format!("({line}) {kind} {}", token.lexeme),
        }
    }

    fn format_error(&self, error: &LexicalError) -> String {
        let label = match error.kind {
            LexicalErrorKind::Unrecognized(c) => format!("'{c}' does not start any token"),
            LexicalErrorKind::UnclosedString => "String starts here".into(),
            LexicalErrorKind::UnclosedComment => "Comment starts here".into(),
        };
        Diagnostic {
            code: error.code(),
            message: error.kind.to_string(),
            label,
            span: error.span,
        }
        .render(self.name, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::scan;

    #[test]
    fn basic_token_listing() {
        let lines: Vec<String> = scan("var x = 1.5; print \"hi\";")
            .tokens
            .iter()
            .map(|t| BasicFormatter.format(t))
            .collect();
        assert_eq!(
            lines,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 1.5 1.5",
                "SEMICOLON ; null",
                "PRINT print null",
                "STRING \"hi\" hi",
                "SEMICOLON ; null",
                "EOF  null",
            ]
        );
    }

    #[test]
    fn integral_numbers_keep_decimal_point_in_literal() {
        let tokens = scan("42").tokens;
        assert_eq!(BasicFormatter.format(&tokens[0]), "NUMBER 42 42.0");
    }

    #[test]
    fn basic_lexical_error() {
        let errors = scan("\n\n$").errors;
        assert_eq!(
            BasicFormatter.format_error(&errors[0]),
            "[line 3] Error: Unexpected character: $"
        );
    }

    #[test]
    fn pretty_error_mentions_code() {
        let text = "\"open";
        let errors = scan(text).errors;
        let rendered = PrettyFormatter::new("main.lox", text).format_error(&errors[0]);
        assert!(rendered.contains("LX002"));
        assert!(rendered.contains("Unterminated string."));
    }

    #[test]
    fn pretty_token_listing_shows_lines() {
        let text = "a\n\"b\"";
        let formatter = PrettyFormatter::new("main.lox", text);
        let lines: Vec<String> = scan(text).tokens.iter().map(|t| formatter.format(t)).collect();
        assert_eq!(lines, vec!["(1) IDENTIFIER a", "(2) STRING \"b\"", "(2) EOF"]);
    }
}
