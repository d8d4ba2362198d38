//! Screenshot batch: every PDF in the input directory → one PNG.
//!
//! Per file: skip if the PNG exists, check the `%PDF` magic, render page 1,
//! crop/zoom, write atomically. Any per-file failure becomes a
//! [`FileOutcome::Failed`] and the loop moves on; only directory and engine
//! problems abort the batch, and those are checked before the first file.

use crate::config::BatchConfig;
use crate::error::{FileError, ShotsError};
use crate::output::{BatchReport, FileOutcome, FileReport};
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use crate::pipeline::{encode, input, transform};
use crate::progress::Stage;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Render every PDF in `config.input_dir` to `config.screenshot_dir`.
///
/// # Errors
/// Returns `Err(ShotsError)` only for fatal errors:
/// - input directory missing, not a directory, or unreadable
/// - screenshot directory cannot be created
///
/// Per-file problems are reported in the returned [`BatchReport`].
pub fn capture_screenshots(
    config: &BatchConfig,
    rasterizer: &dyn PageRasterizer,
) -> Result<BatchReport, ShotsError> {
    let total_start = Instant::now();
    info!(
        "Capturing screenshots: {} → {}",
        config.input_dir.display(),
        config.screenshot_dir.display()
    );

    // ── Step 1: Validate directories ─────────────────────────────────────
    input::ensure_dir(&config.input_dir)?;
    input::ensure_output_dir(&config.screenshot_dir)?;

    // ── Step 2: Enumerate PDFs ───────────────────────────────────────────
    let pdfs = input::list_files_with_extension(&config.input_dir, "pdf")?;
    if pdfs.is_empty() {
        warn!("No PDF files found in {}", config.input_dir.display());
    } else {
        info!("Found {} PDF files to process", pdfs.len());
    }

    let total = pdfs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(Stage::Capture, total);
    }

    // ── Step 3: Process each file ────────────────────────────────────────
    let mut files = Vec::with_capacity(total);
    for (i, pdf) in pdfs.iter().enumerate() {
        let file_name = input::file_name_of(pdf);
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(&file_name, i + 1, total);
        }

        let start = Instant::now();
        let outcome = capture_one(pdf, config, rasterizer);
        match &outcome {
            FileOutcome::Failed { error } => warn!("{}: {}", file_name, error),
            FileOutcome::Skipped { .. } => debug!("{}: screenshot exists, skipping", file_name),
            _ => debug!("{}: done", file_name),
        }

        let report = FileReport {
            file_name,
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_complete(&report, i + 1, total);
        }
        files.push(report);
    }

    let report = BatchReport::new(files, total_start.elapsed().as_millis() as u64);
    info!(
        "Capture complete: {} written, {} skipped, {} failed in {}ms",
        report.summary.ok, report.summary.skipped, report.summary.failed, report.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(Stage::Capture, &report.summary);
    }

    Ok(report)
}

/// [`capture_screenshots`] with a freshly bound pdfium engine.
///
/// `pdfium_library` is passed to [`crate::pipeline::render::bind_pdfium`].
/// A missing engine is fatal and reported before any file is touched.
pub fn capture_with_pdfium(
    config: &BatchConfig,
    pdfium_library: Option<&Path>,
) -> Result<BatchReport, ShotsError> {
    let rasterizer = PdfiumRasterizer::new(pdfium_library)?;
    capture_screenshots(config, &rasterizer)
}

/// Produce the outcome for a single PDF. Never returns early with an error.
fn capture_one(pdf: &Path, config: &BatchConfig, rasterizer: &dyn PageRasterizer) -> FileOutcome {
    let out_path = input::screenshot_path(pdf, &config.screenshot_dir);

    if out_path.exists() {
        return FileOutcome::Skipped {
            reason: format!("{} already exists", input::file_name_of(&out_path)),
        };
    }

    match render_and_write(pdf, &out_path, config, rasterizer) {
        Ok((width, height)) => FileOutcome::Written {
            output: out_path,
            width,
            height,
        },
        Err(error) => FileOutcome::Failed { error },
    }
}

fn render_and_write(
    pdf: &Path,
    out_path: &Path,
    config: &BatchConfig,
    rasterizer: &dyn PageRasterizer,
) -> Result<(u32, u32), FileError> {
    input::check_pdf_magic(pdf)?;

    let page = rasterizer.render_first_page(pdf, config.dpi, config.password.as_deref())?;
    let shot = transform::apply(page, config)?;
    encode::write_png_atomic(&shot, out_path)?;

    Ok((shot.width(), shot.height()))
}
