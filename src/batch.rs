//! File-level entry points: one page, or every matching page in a folder

use crate::error::ExtractError;
use crate::preprocessing::{Extraction, SignatureExtractor};
use glob::Pattern;
use image::ImageFormat;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const DEFAULT_PATTERN: &str = "*.jpg";
pub const DEFAULT_SUFFIX: &str = "_signature.png";

/// Which files a folder run picks up and how outputs are named
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Case-sensitive file-name glob, e.g. `*.jpg` or `scan_??.[jp]*`
    pub pattern: String,
    /// Appended to the input stem to form the output file name
    pub suffix: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: String,
    /// Written file, absent when the file was skipped
    pub output: Option<String>,
    /// `OK` or the error code
    pub code: String,
    pub message: Option<String>,
    pub time_ms: u64,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }
}

/// Summary of a folder run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<FileOutcome>,
}

/// Decode `input`, extract its signature and write it to `output` as PNG
/// Nothing is left at `output` when any stage fails
pub fn extract_file(
    extractor: &SignatureExtractor,
    input: &Path,
    output: &Path,
) -> Result<Extraction, ExtractError> {
    let page = image::open(input)
        .map_err(|e| ExtractError::DecodeError(format!("{}: {}", input.display(), e)))?;

    let extraction = extractor.extract(&page)?;

    if let Err(e) = extraction.image.save_with_format(output, ImageFormat::Png) {
        // Drop whatever partial file the encoder left behind
        let _ = fs::remove_file(output);
        return Err(ExtractError::EncodeError(format!(
            "{}: {}",
            output.display(),
            e
        )));
    }

    Ok(extraction)
}

/// Process one file and log a status line; failures are reported, never raised
pub fn run_file(extractor: &SignatureExtractor, input: &Path, output: &Path) -> FileOutcome {
    let start = Instant::now();
    let result = extract_file(extractor, input, output);
    let time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(extraction) => {
            tracing::info!("Saved: {}", output.display());
            tracing::debug!(
                "{} processed in {}ms, ink region {:?}",
                input.display(),
                extraction.total_time_ms,
                extraction.ink_region
            );
            FileOutcome {
                input: input.display().to_string(),
                output: Some(output.display().to_string()),
                code: "OK".to_string(),
                message: None,
                time_ms,
            }
        }
        Err(e) => {
            match &e {
                ExtractError::DecodeError(_) => {
                    tracing::warn!("Failed to read: {}", input.display())
                }
                ExtractError::NoSignatureFound => {
                    tracing::warn!("No signature found in {}", input.display())
                }
                ExtractError::NoValidInkFound => {
                    tracing::warn!("No valid contours in {}", input.display())
                }
                ExtractError::EncodeError(_) => {
                    tracing::error!("Failed to write {}", output.display())
                }
                _ => tracing::error!("Failed to process {}: {}", input.display(), e),
            }
            FileOutcome {
                input: input.display().to_string(),
                output: None,
                code: e.code().to_string(),
                message: Some(e.to_string()),
                time_ms,
            }
        }
    }
}

/// Extract every file in `input_dir` matching the pattern into `output_dir`
///
/// The output directory is created if missing. Only the top level of
/// `input_dir` is scanned, in file-name order. Per-file failures end up in the
/// report; only directory-level I/O errors abort the run.
pub fn process_folder(
    extractor: &SignatureExtractor,
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport, ExtractError> {
    let pattern = Pattern::new(&options.pattern).map_err(|e| {
        ExtractError::InvalidConfig(format!("Invalid file pattern '{}': {}", options.pattern, e))
    })?;

    fs::create_dir_all(output_dir).map_err(|e| {
        ExtractError::Io(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let inputs = matching_files(input_dir, &pattern)?;
    tracing::info!(
        "Found {} file(s) matching '{}' in {}",
        inputs.len(),
        options.pattern,
        input_dir.display()
    );

    let mut report = BatchReport::default();
    for input in inputs {
        let output = output_path(&input, output_dir, &options.suffix);
        let outcome = run_file(extractor, &input, &output);

        report.processed += 1;
        if outcome.is_success() {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
        report.files.push(outcome);
    }

    tracing::info!(
        "Processed {} file(s): {} extracted, {} skipped",
        report.processed,
        report.succeeded,
        report.failed
    );

    Ok(report)
}

/// `<output_dir>/<input stem><suffix>`
pub fn output_path(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}{}", stem, suffix))
}

fn matching_files(dir: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>, ExtractError> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ExtractError::Io(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            ExtractError::Io(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        if pattern.matches(&name.to_string_lossy()) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
