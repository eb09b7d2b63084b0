//! The Clairvoyant compiler pipeline: `#include` preprocessing, lexing,
//! parsing, template resolution and JavaScript generation.

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod preprocess;

use std::path::Path;

use cv_core::{BuildConfig, CvError, CvResult, Reporter, SyntaxError};

pub use compiler::{CompileOutput, compile};
pub use diagnostics::render_syntax_error;
pub use preprocess::{PreprocessOptions, preprocess};

/// Lex and parse already-preprocessed text into a program.
///
/// Only the first lexer or parser error is returned.
pub fn parse_program(source: &str) -> Result<ast::Program, SyntaxError> {
    let (tokens, lex_errors) = lexer::lex(source);
    if let Some(e) = lex_errors.into_iter().next() {
        return Err(SyntaxError::at(source, e.span, e.message));
    }

    parser::parse(&tokens).map_err(|errors| match errors.into_iter().next() {
        Some(e) => SyntaxError::at(source, e.span, e.message),
        None => SyntaxError::at(source, 0..0, "could not parse program"),
    })
}

/// Read a source file and expand its includes.
pub fn load_source(path: &Path) -> CvResult<String> {
    let source = std::fs::read_to_string(path).map_err(|e| CvError::io(path, e))?;
    let expanded = preprocess(&source, &PreprocessOptions::for_file(path))?;
    tracing::debug!(
        path = %path.display(),
        bytes = expanded.len(),
        "loaded source"
    );
    Ok(expanded)
}

/// Send a fatal error to the reporter as the matching terminal event.
pub fn report_failure(reporter: &mut dyn Reporter, error: &CvError) {
    match error {
        CvError::Syntax(e) => reporter.syntax_error(e),
        other => reporter.error(other),
    }
}

/// Parse and compile preprocessed text, reporting any fatal error.
pub fn compile_str(
    source: &str,
    config: &BuildConfig,
    reporter: &mut dyn Reporter,
) -> CvResult<CompileOutput> {
    let result = match parse_program(source) {
        Ok(program) => compile(&program, config, reporter),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = &result {
        report_failure(reporter, e);
    }
    result
}

/// Load, parse and compile a source file, reporting any fatal error.
pub fn compile_file(
    path: &Path,
    config: &BuildConfig,
    reporter: &mut dyn Reporter,
) -> CvResult<CompileOutput> {
    let source = load_source(path).inspect_err(|e| report_failure(reporter, e))?;
    compile_str(&source, config, reporter)
}
