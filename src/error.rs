//! Error types for the invoice-shots library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ShotsError`] — **Fatal**: the batch cannot run at all (missing input
//!   directory, pdfium not loadable, workbook cannot be written). Returned as
//!   `Err(ShotsError)` from [`crate::capture_screenshots`] and
//!   [`crate::organize_screenshots`].
//!
//! * [`FileError`] — **Non-fatal**: a single file failed (corrupt PDF, bad
//!   PNG, write error) but every other file is fine. Stored inside
//!   [`crate::output::FileOutcome::Failed`] so one bad invoice never costs
//!   the rest of the batch.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the invoice-shots library.
///
/// Per-file failures use [`FileError`] and are recorded in the batch report
/// rather than propagated here.
#[derive(Debug, Error)]
pub enum ShotsError {
    // ── Directory errors ──────────────────────────────────────────────────
    /// The input (or screenshot) directory does not exist.
    #[error("Directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputDirNotFound { path: PathBuf },

    /// The path exists but is a file, not a directory.
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Listing the directory failed (permissions, I/O).
    #[error("Failed to list directory '{path}': {source}")]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory did not exist and could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide, or point\n\
PDFIUM_LIB_PATH (or --pdfium-lib) at the library file or its directory.\n\
Pre-built libraries: https://github.com/bblanchon/pdfium-binaries/releases"
    )]
    EngineUnavailable(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The workbook could not be saved (e.g. locked by a spreadsheet app).
    #[error("Failed to write workbook '{path}': {detail}\nClose the file if it is open in another program.")]
    WorkbookWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Some files failed.
    ///
    /// Returned by [`crate::output::BatchReport::into_result`] when the
    /// caller wants to treat any per-file failure as an error.
    #[error("{failed}/{total} files failed")]
    PartialFailure { failed: usize, total: usize },
}

/// A non-fatal error for a single file.
///
/// The batch continues past it; the file is reported as `[ERROR]`.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    /// The file could not be opened or read.
    #[error("unreadable: {detail}")]
    Unreadable { detail: String },

    /// The file does not start with the `%PDF` magic bytes.
    #[error("not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The PDF is encrypted and no password was configured.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// The configured password was rejected.
    #[error("wrong password for encrypted PDF")]
    WrongPassword,

    /// pdfium could not parse the document.
    #[error("corrupt PDF: {detail}")]
    CorruptPdf { detail: String },

    /// The document has zero pages.
    #[error("PDF has no pages")]
    NoPages,

    /// pdfium returned an error while rasterising page 1.
    #[error("rasterisation failed: {detail}")]
    RenderFailed { detail: String },

    /// The crop region lies entirely outside the rendered page.
    #[error(
        "crop region ({x1},{y1})-({x2},{y2}) is outside the {page_width}x{page_height} px page"
    )]
    CropOutOfBounds {
        x1: u32,
        y1: u32,
        x2: u32,
        y2: u32,
        page_width: u32,
        page_height: u32,
    },

    /// Encoding or writing the output PNG failed.
    #[error("write failed: {detail}")]
    WriteFailed { detail: String },

    /// A screenshot PNG could not be decoded.
    #[error("unreadable image: {detail}")]
    ImageDecodeFailed { detail: String },
}
