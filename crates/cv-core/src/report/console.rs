use std::io::{self, Write};

use colored::Colorize;

use super::Reporter;
use crate::artifact::Artifact;
use crate::error::{CvError, SyntaxError};

/// Prints one human-readable line per build event.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    /// A reporter printing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// A reporter printing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        // Report sink errors are ignored.
        let _ = writeln!(self.out, "{text}");
    }
}

fn skip_suffix(skipped: bool) -> &'static str {
    if skipped { " (skipped)" } else { "" }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn warning(&mut self, message: &str) {
        self.line(message.yellow());
    }

    fn syntax_error(&mut self, error: &SyntaxError) {
        self.line(error.to_string().red());
    }

    fn error(&mut self, error: &CvError) {
        self.line(format!("error: {error}").red());
    }

    fn rejected(&mut self, error: &CvError) {
        self.line(format!("error: {error}").red());
    }

    fn log_component(&mut self, artifact: &Artifact, skipped: bool) {
        self.line(format!(
            "Component:{}:{}{}",
            artifact.name,
            artifact.filename,
            skip_suffix(skipped)
        ));
    }

    fn log_system(&mut self, artifact: &Artifact, skipped: bool) {
        self.line(format!(
            "{}:{}:{}{}",
            artifact.type_label(),
            artifact.name,
            artifact.filename,
            skip_suffix(skipped)
        ));
    }

    fn log_factory(&mut self, artifact: &Artifact, skipped: bool) {
        self.line(format!(
            "Factory:{}{}",
            artifact.filename,
            skip_suffix(skipped)
        ));
        if skipped {
            return;
        }
        for function in artifact.factory_functions() {
            self.line(format!("\t{}:{}", function.entity_type, function.function_name));
        }
    }

    fn complete(&mut self, project_name: &str) {
        self.line(format!("'{project_name}' build completed").green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactKind, BaseClass, FactoryFunction};

    fn render(f: impl FnOnce(&mut ConsoleReporter<Vec<u8>>)) -> String {
        colored::control::set_override(false);
        let mut reporter = ConsoleReporter::new(Vec::new());
        f(&mut reporter);
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn component() -> Artifact {
        Artifact {
            name: "HealthComponent".into(),
            filename: "health.js".into(),
            source: String::new(),
            kind: ArtifactKind::Component,
        }
    }

    #[test]
    fn component_lines() {
        let out = render(|r| {
            r.log_component(&component(), false);
            r.log_component(&component(), true);
        });
        assert_eq!(
            out,
            "Component:HealthComponent:health.js\nComponent:HealthComponent:health.js (skipped)\n"
        );
    }

    #[test]
    fn system_line_uses_base_class() {
        let system = Artifact {
            name: "ShipRenderSystem".into(),
            filename: "ship-render.js".into(),
            source: String::new(),
            kind: ArtifactKind::System {
                base: Some(BaseClass::RenderSystem),
            },
        };
        let out = render(|r| r.log_system(&system, false));
        assert_eq!(out, "RenderSystem:ShipRenderSystem:ship-render.js\n");
    }

    #[test]
    fn factory_lists_functions_unless_skipped() {
        let factory = Artifact {
            name: "Factory".into(),
            filename: "factory.js".into(),
            source: String::new(),
            kind: ArtifactKind::Factory {
                functions: vec![FactoryFunction {
                    entity_type: "Goblin".into(),
                    function_name: "createGoblin".into(),
                }],
            },
        };
        let written = render(|r| r.log_factory(&factory, false));
        assert_eq!(written, "Factory:factory.js\n\tGoblin:createGoblin\n");

        let skipped = render(|r| r.log_factory(&factory, true));
        assert_eq!(skipped, "Factory:factory.js (skipped)\n");
    }

    #[test]
    fn syntax_error_and_completion() {
        let out = render(|r| {
            r.syntax_error(&SyntaxError {
                line: 2,
                column: 5,
                message: "expected '{'".into(),
                span: 0..1,
            });
            r.complete("Asteroids");
        });
        assert_eq!(
            out,
            "Line 2, Column 5: expected '{'\n'Asteroids' build completed\n"
        );
    }

    #[test]
    fn errors_are_prefixed() {
        let out = render(|r| {
            r.rejected(&CvError::EmptyRequirements {
                system: "Idle".into(),
            })
        });
        assert!(out.starts_with("error: System 'Idle'"));
    }
}
