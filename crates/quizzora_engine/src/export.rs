use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use engine_logging::engine_info;
use quizzora_core::{quiz_transcript, QuizPayload};
use tempfile::NamedTempFile;
use thiserror::Error;

const SUMMARY_PREFIX: &str = "quizzora-summary";
const QUIZ_PREFIX: &str = "quizzora-quiz";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output directory {path} is unusable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output path {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates `dir` when missing and checks that a file can be created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ExportError> {
    let unusable = |source| ExportError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        if !fs::metadata(dir).map_err(unusable)?.is_dir() {
            return Err(ExportError::NotADirectory(dir.to_path_buf()));
        }
    } else {
        fs::create_dir_all(dir).map_err(unusable)?;
    }
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}

/// Writes whole files into one directory via temp file + rename, so readers
/// never observe a half-written export.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, ExportError> {
        ensure_output_dir(&self.dir)?;
        let target = self.dir.join(filename);
        let failed = |source| ExportError::Write {
            path: target.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(failed)?;
        tmp.write_all(content.as_bytes()).map_err(failed)?;
        tmp.flush().map_err(failed)?;
        tmp.as_file_mut().sync_all().map_err(failed)?;
        tmp.persist(&target).map_err(|err| failed(err.error))?;
        Ok(target)
    }
}

pub fn summary_filename(date: NaiveDate) -> String {
    format!("{SUMMARY_PREFIX}-{}.txt", date.format("%Y-%m-%d"))
}

pub fn quiz_filename(date: NaiveDate) -> String {
    format!("{QUIZ_PREFIX}-{}.txt", date.format("%Y-%m-%d"))
}

/// Today's date in local time, as used for export names.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Saves the summary text as `quizzora-summary-YYYY-MM-DD.txt`. A second save
/// on the same day replaces the first.
pub fn save_summary(dir: &Path, date: NaiveDate, summary: &str) -> Result<PathBuf, ExportError> {
    let path = AtomicFileWriter::new(dir).write(&summary_filename(date), summary)?;
    engine_info!("Saved summary to {}", path.display());
    Ok(path)
}

/// Saves the quiz transcript as `quizzora-quiz-YYYY-MM-DD.txt`.
pub fn save_quiz(
    dir: &Path,
    date: NaiveDate,
    payload: &QuizPayload,
    source: &str,
) -> Result<PathBuf, ExportError> {
    let text = quiz_transcript(payload, source, &date.format("%Y-%m-%d").to_string());
    let path = AtomicFileWriter::new(dir).write(&quiz_filename(date), &text)?;
    engine_info!("Saved quiz to {}", path.display());
    Ok(path)
}
