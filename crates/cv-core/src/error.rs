use std::path::PathBuf;

/// Alias for `Result<T, CvError>`.
pub type CvResult<T> = Result<T, CvError>;

/// Malformed source text, located by 1-based line and column.
///
/// Produced by the preprocessor (unreadable or cyclic includes), the lexer
/// and the parser. Always fatal: no artifact is generated once one occurs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Line {line}, Column {column}: {message}")]
pub struct SyntaxError {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number, counted in characters.
    pub column: usize,
    /// Human-readable description.
    pub message: String,
    /// Byte range in the (preprocessed) source, for excerpt rendering.
    pub span: std::ops::Range<usize>,
}

impl SyntaxError {
    /// Create a syntax error at a byte offset of `source`.
    pub fn at(source: &str, span: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        let (line, column) = line_col(source, span.start);
        Self {
            line,
            column,
            message: message.into(),
            span,
        }
    }
}

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// Offsets past the end of `source` clamp to the end position.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Errors that can occur while compiling or persisting a project.
#[derive(Debug, thiserror::Error)]
pub enum CvError {
    /// Malformed source or an include that could not be expanded.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A template extends a template that is not declared before it.
    #[error("Template parent '{parent}' not defined (extended by '{template}')")]
    UndeclaredParent {
        /// The template declaring the parent.
        template: String,
        /// The unresolved parent name.
        parent: String,
    },

    /// A system extends something other than `RenderSystem` or `BehaviorSystem`.
    #[error("Expected 'RenderSystem' or 'BehaviorSystem' but got '{base}' (system '{system}')")]
    UnknownSystemBase {
        /// The offending system.
        system: String,
        /// The unrecognized base name.
        base: String,
    },

    /// A system whose required-component set resolved to nothing.
    #[error("System '{system}' does not have required components or entities")]
    EmptyRequirements {
        /// The rejected system.
        system: String,
    },

    /// A warning was issued while warnings are configured to abort the build.
    #[error("build aborted on warning: {0}")]
    WarningAbort(String),

    /// Reading or writing a file failed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl CvError {
    /// Wrap an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CvError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = SyntaxError {
            line: 3,
            column: 7,
            message: "unexpected '}'".into(),
            span: 20..21,
        };
        assert_eq!(err.to_string(), "Line 3, Column 7: unexpected '}'");
    }

    #[test]
    fn line_col_first_line() {
        assert_eq!(line_col("project Demo", 0), (1, 1));
        assert_eq!(line_col("project Demo", 8), (1, 9));
    }

    #[test]
    fn line_col_later_lines() {
        let source = "a\nbc\ndef";
        assert_eq!(line_col(source, 2), (2, 1));
        assert_eq!(line_col(source, 4), (2, 3));
        assert_eq!(line_col(source, 7), (3, 3));
    }

    #[test]
    fn line_col_clamps_past_end() {
        assert_eq!(line_col("ab", 99), (1, 3));
    }

    #[test]
    fn line_col_counts_chars_not_bytes() {
        let source = "é: x";
        assert_eq!(line_col(source, 2), (1, 2));
    }

    #[test]
    fn syntax_error_at_offset() {
        let err = SyntaxError::at("x\n  y", 4..5, "bad");
        assert_eq!((err.line, err.column), (2, 3));
    }

    #[test]
    fn converts_into_cv_error() {
        let err: CvError = SyntaxError::at("", 0..0, "empty").into();
        assert!(matches!(err, CvError::Syntax(_)));
        assert_eq!(err.to_string(), "Line 1, Column 1: empty");
    }
}
