use super::error::RuntimeError;
use crate::lexer::Span;
use crate::report::Diagnostic;

pub trait ValueFormatter {
    fn format_error(&self, error: &RuntimeError) -> String;
}

pub struct DebugFormatter;

impl ValueFormatter for DebugFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error:?}")
    }
}

/// `<message>\n[line n]`
pub struct BasicFormatter;

impl ValueFormatter for BasicFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        format!("{error}")
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

    /// Runtime errors only know their line, so the whole line is highlighted.
    fn line_span(&self, line: u32) -> Span {
        let mut start = 0;
        for (index, text) in self.text.split_inclusive('\n').enumerate() {
            if index + 1 == line as usize {
                let content = text.trim_end_matches(['\n', '\r']);
                return Span::new(start as u32, content.len() as u32);
            }
            start += text.len();
        }
        Span::new(self.text.len() as u32, 0)
    }
}

impl<'src> ValueFormatter for PrettyFormatter<'src> {
    fn format_error(&self, error: &RuntimeError) -> String {
        Diagnostic {
            code: error.code(),
            message: error.kind.to_string(),
            label: format!("Raised on line {}", error.line),
            span: self.line_span(error.line),
        }
        .render(self.name, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::error::RuntimeErrorKind;

    #[test]
    fn basic_error_puts_line_below_message() {
        let error = RuntimeErrorKind::UndefinedVariable("y".into()).at(4);
        assert_eq!(
            BasicFormatter.format_error(&error),
            "Undefined variable 'y'.\n[line 4]"
        );
    }

    #[test]
    fn pretty_line_span_covers_the_line() {
        let formatter = PrettyFormatter::new("test.lox", "var a;\nprint b;\n");
        assert_eq!(formatter.line_span(2), Span::new(7, 8));
        assert_eq!(formatter.line_span(9), Span::new(16, 0));
    }
}
