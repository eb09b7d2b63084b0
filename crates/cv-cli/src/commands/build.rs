use std::path::Path;

use cv_core::report::{ConsoleReporter, JsonReporter};
use cv_core::{BuildConfig, CvError, Reporter, ReporterKind};
use cv_dsl::{render_syntax_error, report_failure};

use crate::writer;

fn reporter_for(kind: ReporterKind) -> Box<dyn Reporter> {
    match kind {
        ReporterKind::Console => Box::new(ConsoleReporter::stdout()),
        ReporterKind::Json => Box::new(JsonReporter::stdout(false)),
        ReporterKind::JsonPretty => Box::new(JsonReporter::stdout(true)),
    }
}

/// Compile `src` and write the generated files under `output`.
///
/// Every outcome is sent to the selected reporter; the returned error is a
/// one-line summary for stderr.
pub fn run(
    src: &Path,
    output: &Path,
    config: &BuildConfig,
    reporter_kind: ReporterKind,
) -> Result<(), String> {
    let mut reporter = reporter_for(reporter_kind);

    let source = cv_dsl::load_source(src).map_err(|e| {
        report_failure(reporter.as_mut(), &e);
        e.to_string()
    })?;

    let compiled = match cv_dsl::compile_str(&source, config, reporter.as_mut()) {
        Ok(compiled) => compiled,
        Err(CvError::Syntax(e)) => {
            if reporter_kind == ReporterKind::Console {
                eprint!(
                    "{}",
                    render_syntax_error(&source, &src.display().to_string(), &e)
                );
            }
            return Err(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("cannot start async runtime: {e}"))?;
    let summary = runtime
        .block_on(writer::save(
            &compiled,
            output,
            config.overwrite,
            reporter.as_mut(),
        ))
        .map_err(|e| e.to_string())?;

    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        output = %output.display(),
        "saved artifacts"
    );

    if compiled.is_clean() {
        Ok(())
    } else {
        Err(format!(
            "{} system(s) rejected: {}",
            compiled.rejected_systems.len(),
            compiled.rejected_systems.join(", ")
        ))
    }
}
