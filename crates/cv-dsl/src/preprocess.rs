//! Textual `#include` expansion.
//!
//! A directive is a line whose first non-blank text is `#include` followed
//! by a quoted path. Each pass replaces every directive line with the
//! referenced file's contents, and passes repeat until the text stops
//! changing. Directives inside an inlined file are rewritten to absolute
//! paths against that file's directory, so the next pass resolves them
//! correctly.
//!
//! Every file may be expanded at most once per run (the root file counts as
//! expanded when its path is known); a second expansion is reported as an
//! include cycle.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use cv_core::SyntaxError;

const DIRECTIVE: &str = "#include";

/// Hard cap on expansion passes.
pub const MAX_PASSES: usize = 64;

/// Where relative include paths are resolved from.
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Directory of the root source file.
    pub source_folder: PathBuf,
    /// The root source file itself, when the text came from a file.
    pub source_path: Option<PathBuf>,
}

impl PreprocessOptions {
    /// Options resolving includes against `source_folder`.
    pub fn new(source_folder: impl Into<PathBuf>) -> Self {
        Self {
            source_folder: source_folder.into(),
            source_path: None,
        }
    }

    /// Options for the source file at `path`, resolving against its directory.
    pub fn for_file(path: &Path) -> Self {
        let folder = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(folder).with_source_path(path)
    }

    /// Record the root file so that it cannot include itself.
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}

/// Expand every `#include` directive in `source` until a fixpoint is reached.
pub fn preprocess(source: &str, options: &PreprocessOptions) -> Result<String, SyntaxError> {
    let mut preprocessor = Preprocessor::new(options);
    let mut current = source.to_string();

    for pass in 1..=MAX_PASSES {
        let next = preprocessor.pass(&current)?;
        if next == current {
            tracing::debug!(passes = pass, "preprocessing reached fixpoint");
            return Ok(current);
        }
        current = next;
    }

    Err(SyntaxError::at(
        &current,
        0..0,
        format!("includes still unresolved after {MAX_PASSES} passes"),
    ))
}

struct Preprocessor<'o> {
    options: &'o PreprocessOptions,
    expanded: HashSet<PathBuf>,
}

/// A recognized directive on one line.
struct Directive<'s> {
    /// Byte offset of `#include` within the line.
    column: usize,
    /// The path between the quotes.
    path: &'s str,
}

impl<'o> Preprocessor<'o> {
    fn new(options: &'o PreprocessOptions) -> Self {
        let mut expanded = HashSet::new();
        if let Some(root) = options
            .source_path
            .as_ref()
            .and_then(|path| path.canonicalize().ok())
        {
            expanded.insert(root);
        }
        Self { options, expanded }
    }

    fn pass(&mut self, text: &str) -> Result<String, SyntaxError> {
        let mut out = String::with_capacity(text.len());
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let (body, newline) = match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            };

            match parse_directive(body) {
                None => out.push_str(line),
                Some(Err(message)) => {
                    return Err(SyntaxError::at(text, offset..offset + body.len(), message));
                }
                Some(Ok(directive)) => {
                    let start = offset + directive.column;
                    let span = start..offset + body.len();
                    let contents = self
                        .expand(directive.path)
                        .map_err(|message| SyntaxError::at(text, span, message))?;
                    out.push_str(contents.strip_suffix('\n').unwrap_or(&contents));
                    out.push_str(newline);
                }
            }

            offset += line.len();
        }

        Ok(out)
    }

    /// Read one included file, rewriting its own directives to absolute paths.
    fn expand(&mut self, path: &str) -> Result<String, String> {
        let resolved = self.options.source_folder.join(path);
        let canonical = resolved
            .canonicalize()
            .map_err(|e| format!("cannot read include '{path}': {e}"))?;

        if !self.expanded.insert(canonical.clone()) {
            return Err(format!(
                "include cycle: '{}' is already included",
                canonical.display()
            ));
        }

        let contents = std::fs::read_to_string(&canonical)
            .map_err(|e| format!("cannot read include '{path}': {e}"))?;
        tracing::debug!(path = %canonical.display(), "expanded include");

        let dir = canonical.parent().unwrap_or(Path::new("/"));
        Ok(rewrite_directives(&contents, dir))
    }
}

/// Rewrite the relative paths of every directive in `text` against `dir`.
fn rewrite_directives(text: &str, dir: &Path) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let (body, newline) = match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        };
        match parse_directive(body) {
            Some(Ok(directive)) => {
                let absolute = dir.join(directive.path);
                out.push_str(&body[..directive.column]);
                out.push_str(&format!("{DIRECTIVE} \"{}\"", absolute.display()));
                out.push_str(newline);
            }
            _ => out.push_str(line),
        }
    }
    out
}

/// Recognize `#include "path"` (or `'path'`), optionally followed by a
/// `//` comment. Returns `None` for ordinary lines.
fn parse_directive(line: &str) -> Option<Result<Directive<'_>, String>> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(DIRECTIVE)?;
    let column = line.len() - trimmed.len();

    let malformed = || Err(format!("malformed {DIRECTIVE} directive, expected {DIRECTIVE} \"path\""));

    if !rest.starts_with([' ', '\t']) {
        return Some(malformed());
    }
    let rest = rest.trim_start();
    let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return Some(malformed());
    };
    let Some(end) = rest[1..].find(quote) else {
        return Some(malformed());
    };
    let path = &rest[1..1 + end];
    let tail = rest[end + 2..].trim();
    if path.is_empty() || !(tail.is_empty() || tail.starts_with("//")) {
        return Some(malformed());
    }

    Some(Ok(Directive { column, path }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn text_without_directives_is_unchanged() {
        let options = PreprocessOptions::new(".");
        let source = "project P\ncomponent A { x: 1 }\n";
        assert_eq!(preprocess(source, &options).unwrap(), source);
    }

    #[test]
    fn include_replaces_the_line() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "health.cv", "component Health { hp: 10 }\n");

        let source = "project P\n#include \"health.cv\"\nsystem S {}\n";
        let out = preprocess(source, &PreprocessOptions::new(dir.path())).unwrap();
        assert_eq!(out, "project P\ncomponent Health { hp: 10 }\nsystem S {}\n");
    }

    #[test]
    fn nested_chain_resolves_relative_to_each_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.cv", "// a\n#include 'lib/b.cv'\n");
        write(dir.path(), "lib/b.cv", "// b\n  #include \"deeper/c.cv\" // leaf\n");
        write(dir.path(), "lib/deeper/c.cv", "component C {}\n");

        let options = PreprocessOptions::new(dir.path());
        let out = preprocess("#include \"a.cv\"\nproject P", &options).unwrap();
        assert_eq!(out, "// a\n// b\ncomponent C {}\nproject P");

        // A second run finds nothing left to expand.
        assert_eq!(preprocess(&out, &options).unwrap(), out);
    }

    #[test]
    fn missing_include_reports_location() {
        let dir = TempDir::new().unwrap();
        let source = "project P\n  #include \"nope.cv\"\n";
        let err = preprocess(source, &PreprocessOptions::new(dir.path())).unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert!(err.message.starts_with("cannot read include 'nope.cv'"));
    }

    #[test]
    fn self_include_of_root_file_is_a_cycle() {
        let dir = TempDir::new().unwrap();
        let root = write(dir.path(), "main.cv", "#include \"main.cv\"\n");
        let source = fs::read_to_string(&root).unwrap();

        let err = preprocess(&source, &PreprocessOptions::for_file(&root)).unwrap_err();
        assert!(err.message.starts_with("include cycle"), "{}", err.message);
    }

    #[test]
    fn mutual_includes_are_a_cycle() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.cv", "#include \"b.cv\"\n");
        write(dir.path(), "b.cv", "#include \"a.cv\"\n");

        let err = preprocess("#include \"a.cv\"", &PreprocessOptions::new(dir.path())).unwrap_err();
        assert!(err.message.contains("include cycle"));
    }

    #[test]
    fn including_a_file_twice_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.cv", "component A {}\n");

        let source = "#include \"a.cv\"\n#include \"a.cv\"\n";
        let err = preprocess(source, &PreprocessOptions::new(dir.path())).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn malformed_directive() {
        let options = PreprocessOptions::new(".");
        for source in ["#include", "#include nope.cv", "#include \"a.cv\" trailing", "#includes \"a\""] {
            let err = preprocess(source, &options).unwrap_err();
            assert!(err.message.starts_with("malformed #include"), "{source}");
        }
    }

    #[test]
    fn rewrite_makes_paths_absolute() {
        let out = rewrite_directives("x\n #include \"c.cv\"\n", Path::new("/base/dir"));
        assert_eq!(out, "x\n #include \"/base/dir/c.cv\"\n");
    }
}
