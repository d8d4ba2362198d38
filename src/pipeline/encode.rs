//! PNG output: encode a screenshot and move it into place atomically.
//!
//! The idempotency check only looks at whether `<base>.png` exists, so a
//! half-written file from an interrupted run would be skipped forever. The
//! image is therefore written to `<base>.png.tmp` and renamed; the final
//! name only ever refers to a complete PNG.

use crate::error::FileError;
use image::{DynamicImage, ImageFormat};
use std::path::Path;
use tracing::debug;

/// Encode `img` as PNG at `path` via a temporary sibling file.
pub fn write_png_atomic(img: &DynamicImage, path: &Path) -> Result<(), FileError> {
    let tmp_path = path.with_extension("png.tmp");

    if let Err(e) = img.save_with_format(&tmp_path, ImageFormat::Png) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(FileError::WriteFailed {
            detail: e.to_string(),
        });
    }

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        FileError::WriteFailed {
            detail: e.to_string(),
        }
    })?;

    debug!(
        "Wrote {}x{} PNG → {}",
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}
