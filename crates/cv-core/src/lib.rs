//! Core types for Clairvoyant: generated artifacts, build configuration,
//! errors, and build reporters.
//!
//! This crate is independent of the DSL front end. The compiler in `cv-dsl`
//! produces [`Artifact`] values and emits events to a [`Reporter`]; the
//! `cvt` binary persists the artifacts and picks the reporter.

/// Generated source artifacts and their metadata.
pub mod artifact;
/// Build configuration and reporter selection.
pub mod config;
/// Error types used throughout the workspace.
pub mod error;
/// Deterministic file-name derivation for generated classes.
pub mod filename;
/// Build event reporters (console, JSON aggregate, in-memory log).
pub mod report;
/// Target runtime variant (2D or 3D).
pub mod variant;

/// Re-export artifact types.
pub use artifact::{Artifact, ArtifactKind, BaseClass, FactoryFunction};
/// Re-export configuration types.
pub use config::{BuildConfig, ReporterKind};
/// Re-export error types.
pub use error::{CvError, CvResult, SyntaxError};
/// Re-export the file-name helper.
pub use filename::derive_file_name;
/// Re-export the reporter trait.
pub use report::Reporter;
/// Re-export the target variant.
pub use variant::Variant;
