//! Concurrent persistence of compiled artifacts.
//!
//! One task per artifact is spawned into a `JoinSet`. Outcomes are reported
//! from the joining task as they arrive, and `complete` fires only once every
//! task has been joined. The first error aborts the tasks still running;
//! files already written stay on disk.

use std::io;
use std::path::{Path, PathBuf};

use cv_core::artifact::{COMPONENTS_DIR, SYSTEMS_DIR};
use cv_core::{CvError, CvResult, Reporter};
use cv_dsl::CompileOutput;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

/// What happened to one artifact file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or replaced.
    Written,
    /// The file already existed and overwriting is off.
    Skipped,
}

/// Per-outcome counts of one save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    /// Files created or replaced.
    pub written: usize,
    /// Files left untouched.
    pub skipped: usize,
}

/// Write every artifact of `output` under `root`.
pub async fn save(
    output: &CompileOutput,
    root: &Path,
    overwrite: bool,
    reporter: &mut dyn Reporter,
) -> CvResult<SaveSummary> {
    for dir in [root.join(COMPONENTS_DIR), root.join(SYSTEMS_DIR)] {
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            let error = CvError::io(dir, e);
            reporter.error(&error);
            return Err(error);
        }
    }

    let artifacts: Vec<_> = output.artifacts().collect();
    let mut tasks = JoinSet::new();
    for (index, artifact) in artifacts.iter().enumerate() {
        let path = root.join(artifact.relative_path());
        let source = artifact.source.clone();
        tasks.spawn(async move { (index, write_file(path, source, overwrite).await) });
    }

    let mut summary = SaveSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let finished = match joined {
            Ok((index, result)) => result.map(|outcome| (index, outcome)),
            Err(e) => Err(CvError::io(root, io::Error::other(e))),
        };
        let (index, outcome) = match finished {
            Ok(finished) => finished,
            Err(error) => {
                tracing::error!("{error}");
                tasks.abort_all();
                reporter.error(&error);
                return Err(error);
            }
        };

        let artifact = artifacts[index];
        let skipped = outcome == WriteOutcome::Skipped;
        tracing::debug!(file = %artifact.relative_path().display(), ?outcome, "artifact saved");
        if skipped {
            summary.skipped += 1;
        } else {
            summary.written += 1;
        }
        reporter.log_artifact(artifact, skipped);
    }

    reporter.complete(&output.project_name);
    Ok(summary)
}

async fn write_file(path: PathBuf, source: String, overwrite: bool) -> CvResult<WriteOutcome> {
    if overwrite {
        tokio::fs::write(&path, source)
            .await
            .map_err(|e| CvError::io(&path, e))?;
        return Ok(WriteOutcome::Written);
    }

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(WriteOutcome::Skipped),
        Err(e) => return Err(CvError::io(&path, e)),
    };
    file.write_all(source.as_bytes())
        .await
        .map_err(|e| CvError::io(&path, e))?;
    file.flush().await.map_err(|e| CvError::io(&path, e))?;
    Ok(WriteOutcome::Written)
}
