use color_eyre::eyre::{Context, Result};
use proptest::prelude::*;
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use ferrox::lexer::{
    formatter::{BasicFormatter, TokenFormatter},
    scan, Lexer, LexicalErrorKind, Token, TokenKind, TokenLiteral,
};

fn check(input: &str, expected: &str, test_name: &str) {
    let formatter = BasicFormatter;
    let mut lines = Vec::new();
    for token_or_error in Lexer::new(input) {
        match token_or_error {
            Ok(token) => lines.push(formatter.format(&token)),
            Err(error) => lines.push(formatter.format_error(&error)),
        }
    }

    assert_eq!(lines.join("\n"), expected.trim_end(), "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "EOF  null", "smoke");
}

#[test]
fn operators_take_longest_match() {
    check(
        "!= ! == = <= < >= >",
        "BANG_EQUAL != null\nBANG ! null\nEQUAL_EQUAL == null\nEQUAL = null\n\
         LESS_EQUAL <= null\nLESS < null\nGREATER_EQUAL >= null\nGREATER > null\nEOF  null",
        "operators",
    );
}

#[test]
fn errors_are_interleaved_with_tokens() {
    check(
        "1 @\n\"open",
        "NUMBER 1 1.0\n[line 1] Error: Unexpected character: @\n\
         [line 2] Error: Unterminated string.\nEOF  null",
        "errors",
    );
}

#[test]
fn eof_line_counts_every_newline() {
    let tokens = scan("a\n\n\n").tokens;
    assert_eq!(tokens.last().map(|t| t.line), Some(4));
}

#[test]
fn whitespace_only_input_yields_only_eof() {
    let result = scan(" \t\r\n  \n");
    assert!(result.errors.is_empty());
    assert_eq!(
        result.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![TokenKind::Eof]
    );
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/lexer/in");
    let output_dir = Path::new("./test_data/lexer/out");

    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "lox" {
            continue;
        }

        let test_name = AsRef::<Path>::as_ref(
            path.file_name()
                .expect("File name can't be none as the path is to a real file."),
        );

        let input = read_to_string(&path).context("Failed to open input test data file")?;

        let expected = {
            let output_file_name = test_name.with_extension("txt");
            let output_path = output_dir.join(output_file_name);
            read_to_string(output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded, "At least one lexer test case failed");
    Ok(())
}

// Property-based tests

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just(",".to_string()),
        Just(".".to_string()),
        Just("-".to_string()),
        Just("+".to_string()),
        Just(";".to_string()),
        Just("*".to_string()),
        Just("!".to_string()),
        Just("!=".to_string()),
        Just("=".to_string()),
        Just("==".to_string()),
        Just("<".to_string()),
        Just("<=".to_string()),
        Just(">".to_string()),
        Just(">=".to_string()),
        Just("/".to_string()),
    ]
}

fn numeric_literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,12}",            // Integer literals
        "[0-9]{1,8}\\.[0-9]{1,8}" // Decimal literals
    ]
}

fn string_literal_strategy() -> impl Strategy<Value = String> {
    "[^\"]*".prop_map(|s: String| format!("\"{}\"", s))
}

fn identifier_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_]*".prop_filter("Keywords are not identifiers", |s| {
        !KEYWORDS.contains(&s.as_str())
    })
}

static KEYWORDS: [&str; 16] = [
    "and", "class", "else", "false", "for", "fun", "if", "nil", "or", "print", "return", "super",
    "this", "true", "var", "while",
];

fn keyword_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(KEYWORDS.as_slice()).prop_map(|s| s.to_string())
}

fn line_comment_strategy() -> impl Strategy<Value = String> {
    "[^\n]*".prop_map(|s: String| format!("//{}\n", s))
}

fn block_comment_strategy() -> impl Strategy<Value = String> {
    "[^*]*".prop_map(|s: String| format!("/*{}*/", s))
}

fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        symbol_strategy(),
        numeric_literal_strategy(),
        string_literal_strategy(),
        identifier_strategy(),
        keyword_strategy(),
    ]
}

fn token_sequence_with_comments_strategy() -> impl Strategy<Value = String> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(
        prop_oneof![
            4 => token_strategy(),
            1 => line_comment_strategy(),
            1 => block_comment_strategy(),
        ],
        MIN_TOKEN_COUNT..MAX_TOKEN_COUNT,
    )
    .prop_map(|tokens| tokens.join(" "))
}

fn token_sequence_without_comments_strategy() -> impl Strategy<Value = Vec<String>> {
    const MIN_TOKEN_COUNT: usize = 1;
    const MAX_TOKEN_COUNT: usize = 100;
    prop::collection::vec(token_strategy(), MIN_TOKEN_COUNT..MAX_TOKEN_COUNT)
}

proptest! {
    #[test]
    fn lexer_handles_valid_tokens_without_comments(input in token_sequence_without_comments_strategy()) {
        let result = scan(&input.join(" "));
        prop_assert!(result.errors.is_empty());
        // Add 1 to include EOF token
        prop_assert_eq!(result.tokens.len(), input.len() + 1);
        for (token, text) in result.tokens.iter().zip(input.iter()) {
            prop_assert_eq!(token.lexeme.as_str(), text.as_str());
        }
    }

    #[test]
    fn lexer_handles_valid_tokens_with_comments(input in token_sequence_with_comments_strategy()) {
        let mut scanner = Lexer::new(&input);
        loop {
            match scanner.next_token() {
                Ok(Token { kind: TokenKind::Eof, .. }) => break,
                token => prop_assert!(token.is_ok()),
            }
        }
    }

    #[test]
    fn numeric_literal_value_matches_parsed_text(input in numeric_literal_strategy()) {
        let tokens = scan(&input).tokens;
        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].kind, TokenKind::NumericLiteral);
        let expected: f64 = input.parse().unwrap();
        prop_assert_eq!(&tokens[0].literal, &Some(TokenLiteral::Number(expected)));
    }

    #[test]
    fn lexeme_always_matches_span(input in "\\PC{0,64}") {
        for token in scan(&input).tokens {
            prop_assert_eq!(&input[token.span.range()], token.lexeme.as_str());
        }
    }

    #[test]
    fn unterminated_string_is_reported_on_opening_line(prefix in "[a-z \n]{0,10}", body in "[^\"]*") {
        let newlines = prefix.matches('\n').count() as u32;
        let result = scan(&format!("{prefix}\"{body}"));
        prop_assert_eq!(result.errors.len(), 1);
        prop_assert_eq!(&result.errors[0].kind, &LexicalErrorKind::UnclosedString);
        prop_assert_eq!(result.errors[0].line, newlines + 1);
    }
}
