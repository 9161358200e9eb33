use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use inquire::Confirm;
use netlog_decode::api::OutputRecord;
use netlog_decode::output::{render_report, write_csv};
use thiserror::Error;

const FALLBACK_BASE_NAME: &str = "netlog";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Asks whether existing output files may be replaced. Cancelling counts as "no".
pub trait OverwritePrompt {
    fn confirm_overwrite(&self, existing: &[&Path]) -> bool;
}

pub struct InquirePrompt;

impl OverwritePrompt for InquirePrompt {
    fn confirm_overwrite(&self, existing: &[&Path]) -> bool {
        for path in existing {
            tracing::debug!(path = %path.display(), "output file already exists");
        }
        Confirm::new("Output files already exist. Overwrite?")
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub report: PathBuf,
    pub table: PathBuf,
}

impl OutputPaths {
    /// `<dir>/<input stem>_decoded.{txt,csv}`
    pub fn for_input(output_dir: &Path, input: &Path) -> OutputPaths {
        let base_name = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string());
        OutputPaths {
            report: output_dir.join(format!("{base_name}_decoded.txt")),
            table: output_dir.join(format!("{base_name}_decoded.csv")),
        }
    }

    fn existing(&self) -> Vec<&Path> {
        [self.report.as_path(), self.table.as_path()]
            .into_iter()
            .filter(|path| path.exists())
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Declined,
}

pub fn save_outputs(
    records: &[OutputRecord],
    paths: &OutputPaths,
    assume_yes: bool,
    prompt: &dyn OverwritePrompt,
) -> Result<SaveOutcome, SaveError> {
    let existing = paths.existing();
    if !existing.is_empty() && !assume_yes && !prompt.confirm_overwrite(&existing) {
        return Ok(SaveOutcome::Declined);
    }

    fs::write(&paths.report, render_report(records)).map_err(|source| SaveError::Io {
        path: paths.report.clone(),
        source,
    })?;

    let table = File::create(&paths.table).map_err(|source| SaveError::Io {
        path: paths.table.clone(),
        source,
    })?;
    write_csv(records, BufWriter::new(table)).map_err(|source| SaveError::Csv {
        path: paths.table.clone(),
        source,
    })?;

    tracing::debug!(records = records.len(), "wrote outputs");
    Ok(SaveOutcome::Saved)
}
