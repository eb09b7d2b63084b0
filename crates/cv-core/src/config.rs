//! Configuration for a single build.

use std::fmt;
use std::str::FromStr;

use crate::variant::Variant;

/// Options fixed for the duration of one compile-and-write run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Target runtime variant.
    pub variant: Variant,
    /// Warning policy.
    ///
    /// When `false`, the first warning aborts the build with a non-zero
    /// exit. When `true`, warnings are reported and accumulate while the
    /// build carries on.
    pub fail_on_warning: bool,
    /// Overwrite files that already exist in the output directory.
    pub overwrite: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            variant: Variant::TwoD,
            fail_on_warning: false,
            overwrite: false,
        }
    }
}

impl BuildConfig {
    /// Set the target runtime variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the warning policy (see [`BuildConfig::fail_on_warning`]).
    pub fn with_fail_on_warning(mut self, fail_on_warning: bool) -> Self {
        self.fail_on_warning = fail_on_warning;
        self
    }

    /// Set whether existing output files are overwritten.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Whether a warning must abort the build under this configuration.
    pub fn warnings_abort(&self) -> bool {
        !self.fail_on_warning
    }
}

/// Which reporter renders build events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReporterKind {
    /// Human-readable lines on the console.
    #[default]
    Console,
    /// One compact JSON document per build.
    Json,
    /// One indented JSON document per build.
    JsonPretty,
}

impl FromStr for ReporterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" | "console" => Ok(ReporterKind::Console),
            "json" => Ok(ReporterKind::Json),
            "json-pretty" => Ok(ReporterKind::JsonPretty),
            other => Err(format!(
                "invalid reporter: \"{other}\". Use: default, json, json-pretty"
            )),
        }
    }
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterKind::Console => write!(f, "default"),
            ReporterKind::Json => write!(f, "json"),
            ReporterKind::JsonPretty => write!(f, "json-pretty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = BuildConfig::default();
        assert_eq!(cfg.variant, Variant::TwoD);
        assert!(!cfg.fail_on_warning);
        assert!(!cfg.overwrite);
        assert!(cfg.warnings_abort());
    }

    #[test]
    fn builder_methods() {
        let cfg = BuildConfig::default()
            .with_variant(Variant::ThreeD)
            .with_fail_on_warning(true)
            .with_overwrite(true);
        assert_eq!(cfg.variant, Variant::ThreeD);
        assert!(cfg.overwrite);
        assert!(!cfg.warnings_abort());
    }

    #[test]
    fn reporter_names() {
        assert_eq!("default".parse::<ReporterKind>().unwrap(), ReporterKind::Console);
        assert_eq!("console".parse::<ReporterKind>().unwrap(), ReporterKind::Console);
        assert_eq!("json".parse::<ReporterKind>().unwrap(), ReporterKind::Json);
        assert_eq!(
            "json-pretty".parse::<ReporterKind>().unwrap(),
            ReporterKind::JsonPretty
        );
        let err = "xml".parse::<ReporterKind>().unwrap_err();
        assert!(err.contains("invalid reporter"));
    }
}
