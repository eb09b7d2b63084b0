use ariadne::{Color, Label, Report, ReportKind, Source};
use cv_core::SyntaxError;

/// Render a syntax error with a labelled source excerpt.
///
/// `source` must be the text the error's span refers to (the preprocessed
/// text for parse errors).
pub fn render_syntax_error(source: &str, filename: &str, error: &SyntaxError) -> String {
    let mut output = Vec::new();

    let start = error.span.start.min(source.len());
    let end = error.span.end.clamp(start, source.len());
    let span = start..end;

    Report::build(ReportKind::Error, (filename, span.clone()))
        .with_message(format!(
            "Line {}, Column {}: {}",
            error.line, error.column, error.message
        ))
        .with_label(
            Label::new((filename, span))
                .with_message(&error.message)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut output)
        .ok();

    String::from_utf8(output).unwrap_or_default()
}
