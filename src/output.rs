//! Batch result types.
//!
//! Every file a batch touches ends in exactly one [`FileOutcome`]. Keeping
//! the outcome as data (rather than only log lines) lets tests and library
//! callers assert on what happened without capturing console output.

use crate::config::LayoutMode;
use crate::error::{FileError, ShotsError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// A screenshot PNG was written.
    Written {
        output: PathBuf,
        width: u32,
        height: u32,
    },
    /// A screenshot was placed in the workbook.
    Placed {
        sheet: String,
        row: u32,
        col: u16,
        width: u32,
        height: u32,
    },
    /// Nothing to do (output already exists).
    Skipped { reason: String },
    /// The file failed; the batch moved on.
    Failed { error: FileError },
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, FileOutcome::Written { .. } | FileOutcome::Placed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FileOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }

    /// Console prefix: `[OK]`, `[SKIP]` or `[ERROR]`.
    pub fn tag(&self) -> &'static str {
        match self {
            FileOutcome::Written { .. } | FileOutcome::Placed { .. } => "[OK]",
            FileOutcome::Skipped { .. } => "[SKIP]",
            FileOutcome::Failed { .. } => "[ERROR]",
        }
    }
}

/// Outcome of one file plus the time spent on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// File name (with extension) inside the scanned directory.
    pub file_name: String,
    pub outcome: FileOutcome,
    pub duration_ms: u64,
}

impl FileReport {
    /// One console line: `[OK] a.pdf`, `[SKIP] a.pdf`, `[ERROR] a.pdf: reason`.
    pub fn log_line(&self) -> String {
        match &self.outcome {
            FileOutcome::Failed { error } => format!("[ERROR] {}: {}", self.file_name, error),
            other => format!("{} {}", other.tag(), self.file_name),
        }
    }
}

/// Per-category counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub ok: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn from_reports(files: &[FileReport]) -> Self {
        let mut summary = Self {
            total: files.len(),
            ..Self::default()
        };
        for f in files {
            match &f.outcome {
                o if o.is_ok() => summary.ok += 1,
                o if o.is_skipped() => summary.skipped += 1,
                _ => summary.failed += 1,
            }
        }
        summary
    }

    /// `Summary: 9 ok, 0 skipped, 1 failed (10 total)`
    pub fn log_line(&self) -> String {
        format!(
            "Summary: {} ok, {} skipped, {} failed ({} total)",
            self.ok, self.skipped, self.failed, self.total
        )
    }
}

/// Complete result of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Reports in processing order.
    pub files: Vec<FileReport>,
    pub summary: BatchSummary,
    pub total_duration_ms: u64,
}

impl BatchReport {
    pub fn new(files: Vec<FileReport>, total_duration_ms: u64) -> Self {
        let summary = BatchSummary::from_reports(&files);
        Self {
            files,
            summary,
            total_duration_ms,
        }
    }

    /// Look up the report for a file name.
    pub fn get(&self, file_name: &str) -> Option<&FileReport> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    /// Treat any per-file failure as an error.
    pub fn into_result(self) -> Result<Self, ShotsError> {
        if self.summary.failed > 0 {
            return Err(ShotsError::PartialFailure {
                failed: self.summary.failed,
                total: self.summary.total,
            });
        }
        Ok(self)
    }
}

/// Result of [`crate::organize_screenshots`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizeReport {
    pub workbook: PathBuf,
    pub layout: LayoutMode,
    /// Number of worksheets written (including index / no-data sheets).
    pub sheet_count: usize,
    pub batch: BatchReport,
}

/// Page-1 geometry of a PDF, as reported by `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub width_pt: f32,
    pub height_pt: f32,
    pub dpi: u32,
    pub width_px: u32,
    pub height_px: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, outcome: FileOutcome) -> FileReport {
        FileReport {
            file_name: name.into(),
            outcome,
            duration_ms: 0,
        }
    }

    #[test]
    fn log_lines_carry_tags() {
        let ok = report(
            "a.pdf",
            FileOutcome::Written {
                output: "out/a.png".into(),
                width: 10,
                height: 10,
            },
        );
        let skip = report("b.pdf", FileOutcome::Skipped { reason: "exists".into() });
        let err = report("c.pdf", FileOutcome::Failed { error: FileError::NoPages });

        assert_eq!(ok.log_line(), "[OK] a.pdf");
        assert_eq!(skip.log_line(), "[SKIP] b.pdf");
        assert_eq!(err.log_line(), "[ERROR] c.pdf: PDF has no pages");
    }

    #[test]
    fn summary_counts_each_category() {
        let files = vec![
            report("a", FileOutcome::Skipped { reason: String::new() }),
            report("b", FileOutcome::Failed { error: FileError::NoPages }),
            report(
                "c",
                FileOutcome::Placed {
                    sheet: "S".into(),
                    row: 0,
                    col: 0,
                    width: 1,
                    height: 1,
                },
            ),
        ];
        let batch = BatchReport::new(files, 5);
        assert_eq!(
            batch.summary,
            BatchSummary {
                ok: 1,
                skipped: 1,
                failed: 1,
                total: 3
            }
        );
        assert_eq!(
            batch.summary.log_line(),
            "Summary: 1 ok, 1 skipped, 1 failed (3 total)"
        );
        assert!(batch.get("b").unwrap().outcome.is_failed());
        assert!(batch.into_result().is_err());
    }

    #[test]
    fn into_result_passes_clean_batches() {
        let batch = BatchReport::new(
            vec![report("a", FileOutcome::Skipped { reason: String::new() })],
            0,
        );
        assert!(batch.into_result().is_ok());
    }
}
