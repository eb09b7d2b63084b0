//! Build event reporting.
//!
//! The compiler and the writer never print anything themselves: they emit
//! events to a [`Reporter`]. Per build the order is zero or more warnings,
//! at most one terminal syntax error, then one `log_*` event per artifact
//! (possibly flagged as skipped) and finally one `complete`.

mod console;
mod json;

pub use console::ConsoleReporter;
pub use json::{ArtifactEntry, BuildReport, FactoryEntry, JsonReporter};

use crate::artifact::{Artifact, ArtifactKind};
use crate::error::{CvError, SyntaxError};

/// Receives structured build events.
pub trait Reporter {
    /// A non-fatal warning.
    fn warning(&mut self, message: &str);

    /// Malformed source. Terminal: nothing is generated afterwards.
    fn syntax_error(&mut self, error: &SyntaxError);

    /// A fatal error. Terminal: `complete` will not follow.
    fn error(&mut self, error: &CvError);

    /// A declaration that was rejected and skipped; the build carries on.
    fn rejected(&mut self, error: &CvError);

    /// A component file was written (or skipped because it already exists).
    fn log_component(&mut self, artifact: &Artifact, skipped: bool);

    /// A system file was written (or skipped).
    fn log_system(&mut self, artifact: &Artifact, skipped: bool);

    /// The factory file was written (or skipped).
    fn log_factory(&mut self, artifact: &Artifact, skipped: bool);

    /// Every artifact has been accounted for.
    fn complete(&mut self, project_name: &str);

    /// Dispatch to the `log_*` method matching the artifact's kind.
    fn log_artifact(&mut self, artifact: &Artifact, skipped: bool) {
        match artifact.kind {
            ArtifactKind::Component => self.log_component(artifact, skipped),
            ArtifactKind::System { .. } => self.log_system(artifact, skipped),
            ArtifactKind::Factory { .. } => self.log_factory(artifact, skipped),
        }
    }
}

/// A recorded build event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// See [`Reporter::warning`].
    Warning(String),
    /// See [`Reporter::syntax_error`].
    SyntaxError(SyntaxError),
    /// See [`Reporter::error`]; holds the rendered message.
    Error(String),
    /// See [`Reporter::rejected`]; holds the rendered message.
    Rejected(String),
    /// See [`Reporter::log_component`].
    Component {
        /// Component name.
        name: String,
        /// Whether the file was left untouched.
        skipped: bool,
    },
    /// See [`Reporter::log_system`].
    System {
        /// System name.
        name: String,
        /// Whether the file was left untouched.
        skipped: bool,
    },
    /// See [`Reporter::log_factory`].
    Factory {
        /// Whether the file was left untouched.
        skipped: bool,
    },
    /// See [`Reporter::complete`].
    Complete(String),
}

/// A reporter that records every event in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Events in the order they were received.
    pub events: Vec<ReportEvent>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All warning messages received so far.
    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Warning(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether `complete` has been received.
    pub fn completed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ReportEvent::Complete(_)))
    }
}

impl Reporter for EventLog {
    fn warning(&mut self, message: &str) {
        self.events.push(ReportEvent::Warning(message.to_string()));
    }

    fn syntax_error(&mut self, error: &SyntaxError) {
        self.events.push(ReportEvent::SyntaxError(error.clone()));
    }

    fn error(&mut self, error: &CvError) {
        self.events.push(ReportEvent::Error(error.to_string()));
    }

    fn rejected(&mut self, error: &CvError) {
        self.events.push(ReportEvent::Rejected(error.to_string()));
    }

    fn log_component(&mut self, artifact: &Artifact, skipped: bool) {
        self.events.push(ReportEvent::Component {
            name: artifact.name.clone(),
            skipped,
        });
    }

    fn log_system(&mut self, artifact: &Artifact, skipped: bool) {
        self.events.push(ReportEvent::System {
            name: artifact.name.clone(),
            skipped,
        });
    }

    fn log_factory(&mut self, _artifact: &Artifact, skipped: bool) {
        self.events.push(ReportEvent::Factory { skipped });
    }

    fn complete(&mut self, project_name: &str) {
        self.events
            .push(ReportEvent::Complete(project_name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::BaseClass;

    #[test]
    fn log_artifact_dispatches_by_kind() {
        let mut log = EventLog::new();
        let system = Artifact {
            name: "Movement".into(),
            filename: "movement.js".into(),
            source: String::new(),
            kind: ArtifactKind::System {
                base: Some(BaseClass::BehaviorSystem),
            },
        };
        log.log_artifact(&system, true);
        log.complete("Demo");

        assert_eq!(
            log.events,
            vec![
                ReportEvent::System {
                    name: "Movement".into(),
                    skipped: true
                },
                ReportEvent::Complete("Demo".into()),
            ]
        );
        assert!(log.completed());
    }

    #[test]
    fn collects_warnings() {
        let mut log = EventLog::new();
        log.warning("first");
        log.rejected(&CvError::EmptyRequirements {
            system: "Idle".into(),
        });
        log.warning("second");
        assert_eq!(log.warnings(), vec!["first", "second"]);
        assert!(!log.completed());
    }
}
