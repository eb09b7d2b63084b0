use std::io::{self, Write};

use serde::Serialize;

use super::Reporter;
use crate::artifact::{Artifact, FactoryFunction};
use crate::error::{CvError, SyntaxError};

fn is_false(b: &bool) -> bool {
    !*b
}

/// One component or system entry of a [`BuildReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactEntry {
    /// Declared name.
    pub name: String,
    /// Generated file name.
    pub filename: String,
    /// Present (and `true`) when the file already existed and was kept.
    #[serde(skip_serializing_if = "is_false")]
    pub skipped: bool,
}

/// The factory entry of a [`BuildReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryEntry {
    /// Generated file name.
    pub filename: String,
    /// One builder per template.
    pub functions: Vec<FactoryFunction>,
    /// Present (and `true`) when the file already existed and was kept.
    #[serde(skip_serializing_if = "is_false")]
    pub skipped: bool,
}

/// Aggregate record of one build, emitted once at completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Name from the program's `project` declaration.
    pub project_name: String,
    /// Warnings in the order they were issued.
    pub warnings: Vec<String>,
    /// Non-fatal errors (rejected declarations).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Component files.
    pub components: Vec<ArtifactEntry>,
    /// System files.
    pub systems: Vec<ArtifactEntry>,
    /// The factory file, once it has been accounted for.
    pub factory: Option<FactoryEntry>,
}

#[derive(Serialize)]
struct ErrorDocument<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

/// Accumulates every event into one [`BuildReport`] and writes it as JSON
/// when the build completes.
///
/// Terminal failures (`syntax_error`, `error`) are written immediately as
/// an `{"error": {...}}` document instead, since `complete` never follows.
pub struct JsonReporter<W: Write> {
    out: W,
    pretty: bool,
    report: BuildReport,
}

impl JsonReporter<io::Stdout> {
    /// A reporter writing to standard output.
    pub fn stdout(pretty: bool) -> Self {
        Self::new(io::stdout(), pretty)
    }
}

impl<W: Write> JsonReporter<W> {
    /// A reporter writing to `out`, indented when `pretty` is set.
    pub fn new(out: W, pretty: bool) -> Self {
        Self {
            out,
            pretty,
            report: BuildReport::default(),
        }
    }

    /// The report accumulated so far.
    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit<T: Serialize>(&mut self, value: &T) {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        if let Ok(text) = rendered {
            let _ = writeln!(self.out, "{text}");
        }
    }

    fn entry(artifact: &Artifact, skipped: bool) -> ArtifactEntry {
        ArtifactEntry {
            name: artifact.name.clone(),
            filename: artifact.filename.clone(),
            skipped,
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn warning(&mut self, message: &str) {
        self.report.warnings.push(message.to_string());
    }

    fn syntax_error(&mut self, error: &SyntaxError) {
        self.emit(&ErrorDocument {
            error: ErrorBody {
                message: &error.message,
                line: Some(error.line),
                column: Some(error.column),
            },
        });
    }

    fn error(&mut self, error: &CvError) {
        let message = error.to_string();
        self.emit(&ErrorDocument {
            error: ErrorBody {
                message: &message,
                line: None,
                column: None,
            },
        });
    }

    fn rejected(&mut self, error: &CvError) {
        self.report.errors.push(error.to_string());
    }

    fn log_component(&mut self, artifact: &Artifact, skipped: bool) {
        self.report.components.push(Self::entry(artifact, skipped));
    }

    fn log_system(&mut self, artifact: &Artifact, skipped: bool) {
        self.report.systems.push(Self::entry(artifact, skipped));
    }

    fn log_factory(&mut self, artifact: &Artifact, skipped: bool) {
        self.report.factory = Some(FactoryEntry {
            filename: artifact.filename.clone(),
            functions: artifact.factory_functions().to_vec(),
            skipped,
        });
    }

    fn complete(&mut self, project_name: &str) {
        self.report.project_name = project_name.to_string();
        let report = std::mem::take(&mut self.report);
        self.emit(&report);
        self.report = report;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactKind;
    use serde_json::{Value, json};

    fn artifact(name: &str, filename: &str, kind: ArtifactKind) -> Artifact {
        Artifact {
            name: name.into(),
            filename: filename.into(),
            source: String::new(),
            kind,
        }
    }

    fn output(reporter: JsonReporter<Vec<u8>>) -> Value {
        let bytes = reporter.into_inner();
        serde_json::from_slice(&bytes).expect("valid JSON")
    }

    #[test]
    fn aggregate_document_matches_schema() {
        let mut r = JsonReporter::new(Vec::new(), false);
        r.warning("Ignoring system inheritance on 'Mover'");
        r.log_component(
            &artifact("HealthComponent", "health.js", ArtifactKind::Component),
            false,
        );
        r.log_system(
            &artifact("Mover", "mover.js", ArtifactKind::System { base: None }),
            true,
        );
        r.log_factory(
            &artifact(
                "Factory",
                "factory.js",
                ArtifactKind::Factory {
                    functions: vec![FactoryFunction {
                        entity_type: "Goblin".into(),
                        function_name: "createGoblin".into(),
                    }],
                },
            ),
            false,
        );
        r.complete("Dungeon");

        assert_eq!(
            output(r),
            json!({
                "projectName": "Dungeon",
                "warnings": ["Ignoring system inheritance on 'Mover'"],
                "components": [{"name": "HealthComponent", "filename": "health.js"}],
                "systems": [{"name": "Mover", "filename": "mover.js", "skipped": true}],
                "factory": {
                    "filename": "factory.js",
                    "functions": [{"entityType": "Goblin", "functionName": "createGoblin"}]
                }
            })
        );
    }

    #[test]
    fn nothing_written_before_complete() {
        let mut r = JsonReporter::new(Vec::new(), true);
        r.warning("w");
        r.log_component(&artifact("A", "a.js", ArtifactKind::Component), false);
        assert_eq!(r.report().warnings, vec!["w"]);
        assert!(r.into_inner().is_empty());
    }

    #[test]
    fn rejected_systems_listed_as_errors() {
        let mut r = JsonReporter::new(Vec::new(), false);
        r.rejected(&CvError::EmptyRequirements {
            system: "Idle".into(),
        });
        r.complete("P");
        let doc = output(r);
        assert_eq!(
            doc["errors"][0],
            "System 'Idle' does not have required components or entities"
        );
        assert_eq!(doc["factory"], Value::Null);
    }

    #[test]
    fn syntax_error_written_immediately() {
        let mut r = JsonReporter::new(Vec::new(), false);
        r.syntax_error(&SyntaxError {
            line: 4,
            column: 2,
            message: "unexpected end of input".into(),
            span: 10..10,
        });
        assert_eq!(
            output(r),
            json!({"error": {"message": "unexpected end of input", "line": 4, "column": 2}})
        );
    }

    #[test]
    fn pretty_output_is_indented() {
        let mut r = JsonReporter::new(Vec::new(), true);
        r.complete("P");
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("\n  \"projectName\": \"P\""));
    }
}
