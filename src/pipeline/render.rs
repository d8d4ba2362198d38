//! PDF rasterisation: render page 1 to a `DynamicImage` via pdfium.
//!
//! Rendering sits behind the [`PageRasterizer`] trait. Production code uses
//! [`PdfiumRasterizer`]; tests plug in a fake that paints a blank page of
//! the right size, so the batch logic is exercised without the native
//! library.
//!
//! ## Pixel size
//!
//! PDF page boxes are in points (1/72 in). A page of `w × h` points
//! rendered at `dpi` is `round(w·dpi/72) × round(h·dpi/72)` pixels, so
//! US-Letter (612 × 792 pt) at 150 DPI is exactly 1275 × 1650 px. The crop
//! region is expressed in these pixels.

use crate::error::{FileError, ShotsError};
use crate::output::DocumentInfo;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF points per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Environment variable naming the pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Rasterises the first page of a PDF.
pub trait PageRasterizer {
    /// Render page 1 of `pdf_path` at `dpi`.
    fn render_first_page(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
    ) -> Result<DynamicImage, FileError>;
}

/// Pixel size of a `width_pt × height_pt` page rendered at `dpi`.
pub fn page_pixel_size(width_pt: f32, height_pt: f32, dpi: u32) -> (u32, u32) {
    let scale = dpi as f32 / POINTS_PER_INCH;
    let w = (width_pt * scale).round().max(1.0) as u32;
    let h = (height_pt * scale).round().max(1.0) as u32;
    (w, h)
}

/// Bind to a pdfium shared library.
///
/// `library` may name the library file or the directory containing it.
/// Without it, `PDFIUM_LIB_PATH` is used if set; otherwise the working
/// directory is tried first, then the system library search path.
pub fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, ShotsError> {
    let location = library_location(library, std::env::var_os(PDFIUM_LIB_PATH_ENV));
    let bindings = match location.as_deref() {
        Some(path) => {
            let lib_path = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.to_path_buf()
            };
            info!("Binding pdfium from {}", lib_path.display());
            Pdfium::bind_to_library(&lib_path).map_err(|e| {
                ShotsError::EngineUnavailable(format!("{}: {e}", lib_path.display()))
            })?
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| ShotsError::EngineUnavailable(e.to_string()))?,
    };

    Ok(Pdfium::new(bindings))
}

/// An explicit location wins over the environment; an empty variable
/// counts as unset.
fn library_location(explicit: Option<&Path>, from_env: Option<OsString>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
}

/// [`PageRasterizer`] backed by pdfium.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind the engine; see [`bind_pdfium`].
    pub fn new(library: Option<&Path>) -> Result<Self, ShotsError> {
        Ok(Self {
            pdfium: bind_pdfium(library)?,
        })
    }

    /// Wrap an already-bound engine.
    pub fn from_pdfium(pdfium: Pdfium) -> Self {
        Self { pdfium }
    }

    /// Page count and page-1 geometry at `dpi`, without rendering.
    pub fn inspect(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
    ) -> Result<DocumentInfo, FileError> {
        let document = self.load(pdf_path, password)?;
        let pages = document.pages();
        let page_count = pages.len() as usize;
        if page_count == 0 {
            return Err(FileError::NoPages);
        }

        let page = pages.get(0).map_err(|e| FileError::RenderFailed {
            detail: format!("{:?}", e),
        })?;
        let width_pt = page.width().value;
        let height_pt = page.height().value;
        let (width_px, height_px) = page_pixel_size(width_pt, height_pt, dpi);

        Ok(DocumentInfo {
            page_count,
            width_pt,
            height_pt,
            dpi,
            width_px,
            height_px,
        })
    }

    fn load<'a>(
        &'a self,
        pdf_path: &Path,
        password: Option<&'a str>,
    ) -> Result<PdfDocument<'a>, FileError> {
        self.pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| classify_load_error(&format!("{:?}", e), password.is_some()))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn render_first_page(
        &self,
        pdf_path: &Path,
        dpi: u32,
        password: Option<&str>,
    ) -> Result<DynamicImage, FileError> {
        let document = self.load(pdf_path, password)?;
        let pages = document.pages();
        if pages.len() == 0 {
            return Err(FileError::NoPages);
        }

        let page = pages.get(0).map_err(|e| FileError::RenderFailed {
            detail: format!("{:?}", e),
        })?;

        let (width, height) = page_pixel_size(page.width().value, page.height().value, dpi);
        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| FileError::RenderFailed {
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page 1 of {} → {}x{} px at {} DPI",
            pdf_path.display(),
            image.width(),
            image.height(),
            dpi
        );

        Ok(image)
    }
}

/// Map a pdfium load error to the per-file error a reviewer can act on.
fn classify_load_error(detail: &str, password_given: bool) -> FileError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            FileError::WrongPassword
        } else {
            FileError::PasswordRequired
        }
    } else {
        FileError::CorruptPdf {
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_at_150_dpi() {
        assert_eq!(page_pixel_size(612.0, 792.0, 150), (1275, 1650));
    }

    #[test]
    fn letter_at_other_dpis() {
        assert_eq!(page_pixel_size(612.0, 792.0, 72), (612, 792));
        assert_eq!(page_pixel_size(612.0, 792.0, 120), (1020, 1320));
        assert_eq!(page_pixel_size(612.0, 792.0, 200), (1700, 2200));
    }

    #[test]
    fn a4_rounds_to_nearest_pixel() {
        // 595.28 × 841.89 pt at 150 DPI = 1240.17 × 1753.94
        assert_eq!(page_pixel_size(595.28, 841.89, 150), (1240, 1754));
    }

    #[test]
    fn library_location_prefers_explicit_path() {
        let env = Some(OsString::from("/opt/pdfium/lib"));
        assert_eq!(
            library_location(Some(Path::new("/usr/lib/libpdfium.so")), env.clone()),
            Some(PathBuf::from("/usr/lib/libpdfium.so"))
        );
        assert_eq!(
            library_location(None, env),
            Some(PathBuf::from("/opt/pdfium/lib"))
        );
        assert_eq!(library_location(None, Some(OsString::new())), None);
        assert_eq!(library_location(None, None), None);
    }

    #[test]
    fn missing_library_file_is_engine_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("libpdfium-missing.so");
        assert!(matches!(
            bind_pdfium(Some(&missing)),
            Err(ShotsError::EngineUnavailable(msg)) if msg.contains("libpdfium-missing.so")
        ));
    }

    #[test]
    fn load_errors_are_classified() {
        assert_eq!(
            classify_load_error("PdfiumLibraryInternalError(PasswordError)", false),
            FileError::PasswordRequired
        );
        assert_eq!(
            classify_load_error("PdfiumLibraryInternalError(PasswordError)", true),
            FileError::WrongPassword
        );
        assert!(matches!(
            classify_load_error("PdfiumLibraryInternalError(FormatError)", false),
            FileError::CorruptPdf { .. }
        ));
    }
}
