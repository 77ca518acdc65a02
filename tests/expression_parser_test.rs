use color_eyre::eyre::{Context, Result};
use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use ferrox::lexer::scan;
use ferrox::parser::{
    formatter::{
        BasicParserFormatter, ExpressionFormatter, ParserFormatter, SExpressionFormatter,
    },
    Parser,
};

fn render(input: &str) -> String {
    let result = Parser::new(scan(input).tokens).parse_expression();
    match result {
        Ok(ref tree) => SExpressionFormatter.format(tree),
        Err(ref errors) => errors
            .iter()
            .map(|e| BasicParserFormatter.format_error(e))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn check(input: &str, expected: &str, test_name: &str) {
    assert_eq!(render(input), expected.trim_end(), "Failed the test {test_name}");
}

#[test]
fn smoke_test() {
    check("", "[line 1] Error at end: Expect expression.", "smoke");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    check("1 + 2 * 3", "(+ 1 (* 2 3))", "precedence");
    check("(1 + 2) * 3", "(* (group (+ 1 2)) 3)", "grouping");
}

#[test]
fn binary_operators_are_left_associative() {
    check("1 - 2 - 3", "(- (- 1 2) 3)", "subtraction");
    check("8 / 4 / 2", "(/ (/ 8 4) 2)", "division");
    check("a or b or c", "(or (or a b) c)", "or");
}

#[test]
fn assignment_is_right_associative() {
    check("a = b = 1", "(= a (= b 1))", "chained assignment");
}

#[test]
fn logical_precedence() {
    check(
        "a or b and c == d",
        "(or a (and b (== c d)))",
        "logical over equality",
    );
}

#[test]
fn unary_operators_nest() {
    check("!!true", "(! (! true))", "double bang");
    check("-a * b", "(* (- a) b)", "negation binds tight");
}

#[test]
fn chained_calls() {
    check("f()(1)(2, 3)", "(call (call (call f) 1) 2 3)", "call chain");
}

#[test]
fn error_messages_cite_the_token() {
    check("(1 + 2", "[line 1] Error at end: Expect ')' after expression.", "paren");
    check("1 +\n;", "[line 2] Error at ';': Expect expression.", "operand");
    check(
        "1 = 2",
        "[line 1] Error at '=': Invalid assignment target.",
        "l-value",
    );
    check("f(1,", "[line 1] Error at end: Expect expression.", "argument");
}

#[test]
fn trailing_tokens_are_rejected() {
    check(
        "1 + 2 )",
        "[line 1] Error at ')': Expect end of expression.",
        "stray paren",
    );
    check(
        "a\nb",
        "[line 2] Error at 'b': Expect end of expression.",
        "two expressions",
    );
}

#[test]
fn test_all() -> Result<()> {
    let input_dir = Path::new("./test_data/parser/in");
    let output_dir = Path::new("./test_data/parser/out");

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
            read_to_string(&output_path).context("Failed to open output test data file")?
        };

        let res = std::panic::catch_unwind(|| {
            check(&input, &expected, &test_name.to_string_lossy());
        });
        if res.is_err() {
            succeeded = false;
        }
    }

    assert!(succeeded, "At least one parser test case failed");
    Ok(())
}
