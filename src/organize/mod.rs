//! Spreadsheet batch: every PNG in the screenshot directory → one workbook.
//!
//! ```text
//! list *.png → sort → validate (decode) → plan layout → write sheets → save
//! ```
//!
//! A PNG that cannot be decoded is reported as `[ERROR]` and left out; the
//! rest of the workbook is still written. Only a missing screenshot
//! directory or a workbook that cannot be saved abort the batch.

pub mod layout;
pub mod workbook;

use crate::config::{BatchConfig, LayoutMode};
use crate::error::{FileError, ShotsError};
use crate::output::{BatchReport, FileOutcome, FileReport, OrganizeReport};
use crate::pipeline::input;
use crate::progress::Stage;
use image::ImageFormat;
use rust_xlsxwriter::{Image, Workbook, XlsxError};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use workbook::Placement;

/// A PNG that decoded cleanly and is ready to place.
#[derive(Clone)]
pub struct Screenshot {
    /// File name with extension, as listed in the index.
    pub file_name: String,
    /// Base name: the visible label and the source of sheet names.
    pub label: String,
    /// Native pixel size.
    pub width: u32,
    pub height: u32,
    pub image: Image,
}

/// Decode `path` and prepare it for insertion.
pub fn load_screenshot(path: &Path) -> Result<Screenshot, FileError> {
    let bytes = std::fs::read(path).map_err(|e| FileError::Unreadable {
        detail: e.to_string(),
    })?;

    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(|e| {
        FileError::ImageDecodeFailed {
            detail: e.to_string(),
        }
    })?;
    let image = Image::new_from_buffer(&bytes).map_err(|e| FileError::ImageDecodeFailed {
        detail: e.to_string(),
    })?;

    Ok(Screenshot {
        file_name: input::file_name_of(path),
        label: input::base_name_of(path),
        width: decoded.width(),
        height: decoded.height(),
        image,
    })
}

/// Build `config.workbook_path` from the PNGs in `config.screenshot_dir`.
///
/// # Errors
/// Returns `Err(ShotsError)` only for fatal errors:
/// - screenshot directory missing, not a directory, or unreadable
/// - workbook directory cannot be created or the workbook cannot be saved
///
/// Per-file problems are reported in [`OrganizeReport::batch`].
pub fn organize_screenshots(config: &BatchConfig) -> Result<OrganizeReport, ShotsError> {
    let total_start = Instant::now();
    info!(
        "Organizing screenshots: {} → {}",
        config.screenshot_dir.display(),
        config.workbook_path.display()
    );

    // ── Step 1: Enumerate and order PNGs ─────────────────────────────────
    input::ensure_dir(&config.screenshot_dir)?;
    let mut pngs = input::list_files_with_extension(&config.screenshot_dir, "png")?;
    layout::sort_screenshots(&mut pngs, config.sort);

    let total = pngs.len();
    if total == 0 {
        warn!("No PNG files found in {}", config.screenshot_dir.display());
    } else {
        info!("Found {} PNG files to organize", total);
    }
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(Stage::Organize, total);
    }

    // ── Step 2: Validate each image ──────────────────────────────────────
    let mut loaded: Vec<(String, u64, Result<Screenshot, FileError>)> = Vec::with_capacity(total);
    for (i, png) in pngs.iter().enumerate() {
        let file_name = input::file_name_of(png);
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(&file_name, i + 1, total);
        }
        let start = Instant::now();
        let result = load_screenshot(png);
        if let Err(ref e) = result {
            warn!("{}: {}", file_name, e);
        }
        loaded.push((file_name, start.elapsed().as_millis() as u64, result));
    }

    let shots: Vec<Screenshot> = loaded
        .iter()
        .filter_map(|(_, _, r)| r.as_ref().ok().cloned())
        .collect();

    // ── Step 3: Write the workbook ───────────────────────────────────────
    if let Some(parent) = config.workbook_path.parent() {
        if !parent.as_os_str().is_empty() {
            input::ensure_output_dir(parent)?;
        }
    }

    let mut book = Workbook::new();
    let write_err = |e: XlsxError| ShotsError::WorkbookWriteFailed {
        path: config.workbook_path.clone(),
        detail: e.to_string(),
    };

    let (placements, sheet_count) = if shots.is_empty() {
        if total > 0 {
            warn!("None of the {} PNG files could be decoded", total);
        }
        workbook::write_no_data(&mut book, &config.screenshot_dir).map_err(write_err)?;
        (Vec::new(), 1)
    } else {
        let display_width = config.display_width();
        match config.layout {
            LayoutMode::Grid => {
                let placed =
                    workbook::write_grid(&mut book, &shots, display_width).map_err(write_err)?;
                (placed, 1)
            }
            LayoutMode::OnePerSheet => {
                let placed = workbook::write_one_per_sheet(
                    &mut book,
                    &shots,
                    display_width,
                    config.index_sheet,
                )
                .map_err(write_err)?;
                let count = placed.len() + usize::from(config.index_sheet);
                (placed, count)
            }
        }
    };

    workbook::save_atomic(&mut book, &config.workbook_path)?;

    // ── Step 4: Report ───────────────────────────────────────────────────
    let files = build_reports(loaded, placements);
    for (i, report) in files.iter().enumerate() {
        debug!("{}", report.log_line());
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_complete(report, i + 1, total);
        }
    }

    let batch = BatchReport::new(files, total_start.elapsed().as_millis() as u64);
    info!(
        "Workbook saved: {} ({} sheets, {} placed, {} failed)",
        config.workbook_path.display(),
        sheet_count,
        batch.summary.ok,
        batch.summary.failed
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(Stage::Organize, &batch.summary);
    }

    Ok(OrganizeReport {
        workbook: config.workbook_path.clone(),
        layout: config.layout,
        sheet_count,
        batch,
    })
}

/// Pair each validated screenshot with its placement, in order.
fn build_reports(
    loaded: Vec<(String, u64, Result<Screenshot, FileError>)>,
    placements: Vec<Placement>,
) -> Vec<FileReport> {
    let mut placements = placements.into_iter();
    loaded
        .into_iter()
        .map(|(file_name, duration_ms, result)| {
            let outcome = match result {
                Ok(_) => match placements.next() {
                    Some(p) => FileOutcome::Placed {
                        sheet: p.sheet,
                        row: p.row,
                        col: p.col,
                        width: p.width,
                        height: p.height,
                    },
                    None => FileOutcome::Failed {
                        error: FileError::WriteFailed {
                            detail: "image was not placed".to_string(),
                        },
                    },
                },
                Err(error) => FileOutcome::Failed { error },
            };
            FileReport {
                file_name,
                outcome,
                duration_ms,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_non_png() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"not a png at all").unwrap();
        assert!(matches!(
            load_screenshot(&path),
            Err(FileError::ImageDecodeFailed { .. })
        ));
    }

    #[test]
    fn load_reads_dimensions() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("inv-3.png");
        image::RgbaImage::new(40, 10).save(&path).unwrap();
        let shot = load_screenshot(&path).unwrap();
        assert_eq!((shot.width, shot.height), (40, 10));
        assert_eq!(shot.label, "inv-3");
        assert_eq!(shot.file_name, "inv-3.png");
    }
}
