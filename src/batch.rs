//! Depth-limited batch processing of directory trees.
//!
//! Every scanned directory gets its own output folder (see
//! [`BatchOptions::output_dir_name`]); those folders are never scanned
//! themselves. Documents are processed one at a time in file name order.

use crate::error::{Error, Result};
use crate::options::{output_path_for, BatchOptions, ErrorPolicy};
use crate::process::{process_file, Outcome};
use log::{debug, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name suffix of documents picked up by batch processing.
pub const DOCX_SUFFIX: &str = ".docx";

/// Progress notification emitted during a batch run.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A document is about to be processed
    Started(&'a Path),
    /// A document has been processed
    Finished(&'a Path, &'a Result<Outcome>),
}

/// Per-document entry of a [`BatchReport`].
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Source document
    pub source: PathBuf,
    /// Outcome, when processing succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Error message, when processing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Documents in processing order
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Number of documents that had protection removed.
    pub fn removed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome.as_ref().is_some_and(Outcome::is_written))
            .count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.error.is_some()).count()
    }
}

/// Process every `.docx` under `dir`, descending at most
/// `options.max_depth` levels (the starting directory is level 1).
///
/// With [`ErrorPolicy::Abort`] the first failing document stops the run and
/// its error is returned. With [`ErrorPolicy::Continue`] failures are
/// recorded in the report. Directory errors always stop the run.
///
/// # Example
///
/// ```no_run
/// use docxfree::{process_directory, BatchOptions};
///
/// let options = BatchOptions::new().with_max_depth(2);
/// let report = process_directory("protected_docs", &options, |_| {})?;
/// println!("{} unprotected", report.removed());
/// # Ok::<(), docxfree::Error>(())
/// ```
pub fn process_directory(
    dir: impl AsRef<Path>,
    options: &BatchOptions,
    mut on_event: impl FnMut(BatchEvent<'_>),
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    walk(dir.as_ref(), 1, options, &mut report, &mut on_event)?;
    Ok(report)
}

fn walk(
    dir: &Path,
    depth: usize,
    options: &BatchOptions,
    report: &mut BatchReport,
    on_event: &mut dyn FnMut(BatchEvent<'_>),
) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .and_then(|rd| rd.collect::<std::io::Result<Vec<_>>>())
        .map_err(|e| Error::directory(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    let output_dir = dir.join(&options.output_dir_name);
    fs::create_dir_all(&output_dir).map_err(|e| Error::directory(&output_dir, e))?;

    for entry in entries {
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::directory(&path, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("skipping non UTF-8 name {}", path.display());
            continue;
        };

        if file_type.is_dir() {
            if name == options.output_dir_name {
                continue;
            }
            if depth < options.max_depth {
                walk(&path, depth + 1, options, report, on_event)?;
            }
            continue;
        }

        if !name.ends_with(DOCX_SUFFIX) {
            continue;
        }

        on_event(BatchEvent::Started(&path));
        let destination = output_path_for(&output_dir, name);
        let result = process_file(&path, &destination, &options.process);
        on_event(BatchEvent::Finished(&path, &result));

        match result {
            Ok(outcome) => report.files.push(FileReport {
                source: path,
                outcome: Some(outcome),
                error: None,
            }),
            Err(err) => match options.error_policy {
                ErrorPolicy::Abort => return Err(err),
                ErrorPolicy::Continue => {
                    warn!("{}: {}", path.display(), err);
                    report.files.push(FileReport {
                        source: path,
                        outcome: None,
                        error: Some(err.to_string()),
                    });
                }
            },
        }
    }

    Ok(())
}
