//! # invoice-shots
//!
//! Turn a folder of PDF invoices into page-1 screenshots and lay those
//! screenshots out in an Excel workbook for side-by-side review.
//!
//! ## Pipeline Overview
//!
//! ```text
//! invoices/*.pdf
//!  │
//!  ├─ capture   (skip existing PNGs)
//!  │   ├─ 1. Input   list *.pdf, check %PDF magic
//!  │   ├─ 2. Render  page 1 via pdfium at the configured DPI
//!  │   ├─ 3. Crop    fixed pixel rectangle (optional)
//!  │   ├─ 4. Zoom    Lanczos3 resize (optional)
//!  │   └─ 5. Encode  PNG, written atomically
//!  │
//!  output/screenshot/*.png
//!  │
//!  └─ organize
//!      ├─ 1. Input   list *.png, sort, decode
//!      ├─ 2. Layout  2-column grid, or one sheet per image (+ index)
//!      └─ 3. Save    XLSX, written atomically
//! ```
//!
//! Both batches are single-threaded and never stop on a bad file: each file
//! ends as `[OK]`, `[SKIP]` or `[ERROR]`, and the returned report carries
//! the per-file outcomes plus a summary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use invoice_shots::{capture_with_pdfium, organize_screenshots, BatchConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::default();
//!     let shots = capture_with_pdfium(&config, None)?;
//!     println!("{}", shots.summary.log_line());
//!
//!     let organized = organize_screenshots(&config)?;
//!     println!("workbook: {}", organized.workbook.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `invoice-shots` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! invoice-shots = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capture;
pub mod config;
pub mod error;
pub mod organize;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capture::{capture_screenshots, capture_with_pdfium};
pub use config::{BatchConfig, BatchConfigBuilder, CropRegion, LayoutMode, SortOrder};
pub use error::{FileError, ShotsError};
pub use organize::organize_screenshots;
pub use output::{
    BatchReport, BatchSummary, DocumentInfo, FileOutcome, FileReport, OrganizeReport,
};
pub use pipeline::render::{bind_pdfium, PageRasterizer, PdfiumRasterizer};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
