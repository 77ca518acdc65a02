pub mod interpreter;
pub mod lexer;
pub mod parser;
mod report;
pub mod string;

use interpreter::error::RuntimeError;
use interpreter::formatter::{
    BasicFormatter as BasicValueFormatter, DebugFormatter as DebugValueFormatter,
    PrettyFormatter as PrettyValueFormatter, ValueFormatter,
};
use interpreter::{SystemContext, TreeWalkInterpreter};
use lexer::formatter::{
    BasicFormatter as BasicTokenFormatter, DebugFormatter as DebugTokenFormatter, PrettyFormatter,
    TokenFormatter,
};
use parser::formatter::{
    BasicParserFormatter, DebugParserFormatter, ParserFormatter, PrettyParserFormatter,
};
use parser::Parser;

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagnosticStyle {
    /// One line per error, `[line n] Error...`.
    #[default]
    Basic,
    /// Annotated source snippets.
    Pretty,
    /// The `Debug` form of each error value.
    Debug,
}

/// What happened while running one source text.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Rendered diagnostics in the order they were found.
    pub diagnostics: Vec<String>,
    pub had_compile_error: bool,
    pub runtime_error: Option<RuntimeError>,
}

impl RunReport {
    /// 65 for lexical or syntax errors, 70 for a runtime error, 0 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.had_compile_error {
            65
        } else if self.runtime_error.is_some() {
            70
        } else {
            0
        }
    }
}

/// Scans, parses and runs source texts against one long-lived interpreter, so bindings made by
/// earlier runs stay visible to later ones.
#[derive(Debug, Default)]
pub struct Session {
    interpreter: TreeWalkInterpreter,
    style: DiagnosticStyle,
}

impl Session {
    pub fn new(style: DiagnosticStyle) -> Self {
        Self {
            interpreter: TreeWalkInterpreter::new(),
            style,
        }
    }

    /// Whatever parsed is executed even when errors were reported.
    pub fn run<C: SystemContext>(&self, name: &str, source: &str, context: &mut C) -> RunReport {
        let mut report = RunReport::default();

        let (token_formatter, parser_formatter, value_formatter): (
            Box<dyn TokenFormatter + '_>,
            Box<dyn ParserFormatter + '_>,
            Box<dyn ValueFormatter + '_>,
        ) = match self.style {
            DiagnosticStyle::Basic => (
                Box::new(BasicTokenFormatter),
                Box::new(BasicParserFormatter),
                Box::new(BasicValueFormatter),
            ),
            DiagnosticStyle::Pretty => (
                Box::new(PrettyFormatter::new(name, source)),
                Box::new(PrettyParserFormatter::new(name, source)),
                Box::new(PrettyValueFormatter::new(name, source)),
            ),
            DiagnosticStyle::Debug => (
                Box::new(DebugTokenFormatter),
                Box::new(DebugParserFormatter),
                Box::new(DebugValueFormatter),
            ),
        };

        let scanned = lexer::scan(source);
        for error in scanned.errors.iter() {
            report.diagnostics.push(token_formatter.format_error(error));
        }

        let program = Parser::new(scanned.tokens).parse();
        for error in program.errors.iter() {
            report.diagnostics.push(parser_formatter.format_error(error));
        }
        report.had_compile_error = scanned.errors.len() + program.errors.len() > 0;
        tracing::debug!(
            name,
            lexical_errors = scanned.errors.len(),
            syntax_errors = program.errors.len(),
            "compiled source"
        );

        if let Err(error) = self.interpreter.interpret(&program, context) {
            tracing::debug!(code = error.code(), line = error.line, "runtime error");
            report.diagnostics.push(value_formatter.format_error(&error));
            report.runtime_error = Some(error);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interpreter::context::BufferedContext;

    #[test]
    fn bindings_survive_between_runs() {
        let session = Session::default();
        let mut context = BufferedContext::new();
        assert_eq!(session.run("<1>", "var a = 1;", &mut context).exit_code(), 0);
        assert_eq!(context.get_data(), "");
        assert_eq!(session.run("<2>", "print a + 1;", &mut context).exit_code(), 0);
        assert_eq!(context.into_data(), "2\n");
    }

    #[test]
    fn compile_errors_take_precedence() {
        let session = Session::default();
        let mut context = BufferedContext::new();
        let report = session.run("<test>", "print 1;\nprint ;\nprint -\"x\";", &mut context);
        assert_eq!(
            report.diagnostics,
            vec![
                "[line 2] Error at ';': Expect expression.",
                "Operand must be a number.\n[line 3]",
            ]
        );
        assert_eq!(report.exit_code(), 65);
        assert_eq!(context.into_data(), "1\n");
    }

    #[test]
    fn debug_style_renders_error_values() {
        let session = Session::new(DiagnosticStyle::Debug);
        let mut context = BufferedContext::new();
        let report = session.run("<test>", "@\nprint -nil;", &mut context);
        assert_eq!(report.diagnostics.len(), 2);
        assert!(report.diagnostics[0].starts_with("LexicalError {"));
        assert!(report.diagnostics[1].starts_with("RuntimeError {"));
        assert!(report.diagnostics[1].contains("NonNumeric"));

        let report = session.run("<test>", "print ;", &mut context);
        assert!(report.diagnostics[0].starts_with("ParserError {"));
        assert!(report.diagnostics[0].contains("NonExpression"));
    }
}
