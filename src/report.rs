use crate::lexer::Span;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

/// A single diagnostic rendered against the source it came from.
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub label: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn render(&self, name: &str, text: &str) -> String {
        // Spans past the end of the text (the EOF token) are clamped so the label stays printable.
        let end = (self.span.end() as usize).min(text.len());
        let start = (self.span.start as usize).min(end);
        let range = match text[..start].char_indices().next_back() {
            Some((previous, _)) if start == end => previous..end,
            _ => start..end,
        };

        let mut output = std::io::Cursor::new(Vec::new());
        Report::build(ReportKind::Error, (name, range.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_code(self.code)
            .with_message(&self.message)
            .with_label(
                Label::new((name, range))
                    .with_message(&self.label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((name, Source::from(text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
