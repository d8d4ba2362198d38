//! Configuration types for the screenshot and organizer batches.
//!
//! All batch behaviour is controlled through one [`BatchConfig`], built via
//! its [`BatchConfigBuilder`]. Both components take the same config so a
//! `run` invocation captures and organises with identical paths, and tests
//! can vary any parameter without touching module-level constants.

use crate::error::ShotsError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rasterisation DPI.
pub const MIN_DPI: u32 = 72;
/// Highest accepted rasterisation DPI.
pub const MAX_DPI: u32 = 600;
/// Largest accepted zoom factor.
pub const MAX_ZOOM: f64 = 8.0;

/// Configuration shared by [`crate::capture_screenshots`] and
/// [`crate::organize_screenshots`].
///
/// # Example
/// ```rust
/// use invoice_shots::{BatchConfig, CropRegion, LayoutMode};
///
/// let config = BatchConfig::builder()
///     .dpi(200)
///     .crop(CropRegion::new(100, 300, 1300, 700))
///     .zoom(1.5)
///     .layout(LayoutMode::OnePerSheet)
///     .build()
///     .unwrap();
/// assert_eq!(config.display_width(), 800);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Rendering DPI used to rasterise page 1. Range: 72–600. Default: 150.
    ///
    /// A US-Letter page at 150 DPI is 1275 × 1650 px. The crop region is in
    /// pixels of that render, so changing DPI moves the crop.
    pub dpi: u32,

    /// Fixed pixel rectangle kept from the rendered page. `None` keeps the
    /// full page. Default: `(100, 300, 1300, 700)`.
    pub crop: Option<CropRegion>,

    /// Multiplier applied to the (cropped) image. `1.0` disables resizing.
    /// Default: 2.0.
    pub zoom: f64,

    /// Directory scanned for `*.pdf`. Default: `invoices`.
    pub input_dir: PathBuf,

    /// Directory receiving the PNG screenshots and scanned by the organizer.
    /// Default: `output/screenshot`.
    pub screenshot_dir: PathBuf,

    /// Workbook written by the organizer.
    /// Default: `output/invoice_screenshots_organized.xlsx`.
    pub workbook_path: PathBuf,

    /// Workbook layout. Default: [`LayoutMode::Grid`].
    pub layout: LayoutMode,

    /// Pixel width images are scaled to inside the workbook.
    /// `None` uses [`LayoutMode::default_display_width`].
    pub display_width: Option<u32>,

    /// Ordering of screenshots in the workbook. Default: lexicographic.
    pub sort: SortOrder,

    /// Add a hyperlinked `Index` sheet in one-per-sheet mode. Default: true.
    pub index_sheet: bool,

    /// Password for encrypted invoices.
    pub password: Option<String>,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            crop: Some(CropRegion::default()),
            zoom: 2.0,
            input_dir: PathBuf::from("invoices"),
            screenshot_dir: PathBuf::from("output").join("screenshot"),
            workbook_path: PathBuf::from("output").join("invoice_screenshots_organized.xlsx"),
            layout: LayoutMode::default(),
            display_width: None,
            sort: SortOrder::default(),
            index_sheet: true,
            password: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("dpi", &self.dpi)
            .field("crop", &self.crop)
            .field("zoom", &self.zoom)
            .field("input_dir", &self.input_dir)
            .field("screenshot_dir", &self.screenshot_dir)
            .field("workbook_path", &self.workbook_path)
            .field("layout", &self.layout)
            .field("display_width", &self.display_width)
            .field("sort", &self.sort)
            .field("index_sheet", &self.index_sheet)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Effective workbook image width in pixels.
    pub fn display_width(&self) -> u32 {
        self.display_width
            .unwrap_or_else(|| self.layout.default_display_width())
    }

    /// Whether the zoom factor actually changes the image size.
    pub fn zoom_enabled(&self) -> bool {
        (self.zoom - 1.0).abs() > f64::EPSILON
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn crop(mut self, region: CropRegion) -> Self {
        self.config.crop = Some(region);
        self
    }

    /// Keep the whole rendered page.
    pub fn full_page(mut self) -> Self {
        self.config.crop = None;
        self
    }

    pub fn zoom(mut self, factor: f64) -> Self {
        self.config.zoom = factor;
        self
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.screenshot_dir = dir.into();
        self
    }

    pub fn workbook_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.workbook_path = path.into();
        self
    }

    pub fn layout(mut self, layout: LayoutMode) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn display_width(mut self, px: u32) -> Self {
        self.config.display_width = Some(px.max(16));
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.config.sort = order;
        self
    }

    pub fn index_sheet(mut self, v: bool) -> Self {
        self.config.index_sheet = v;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, ShotsError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(ShotsError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if !c.zoom.is_finite() || c.zoom <= 0.0 || c.zoom > MAX_ZOOM {
            return Err(ShotsError::InvalidConfig(format!(
                "Zoom factor must be > 0 and ≤ {MAX_ZOOM}, got {}",
                c.zoom
            )));
        }
        if let Some(region) = c.crop {
            region.validate()?;
        }
        Ok(self.config)
    }
}

// ── Crop region ──────────────────────────────────────────────────────────

/// Pixel rectangle `(x1, y1)`–`(x2, y2)` on the rendered page, top-left
/// origin, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Default for CropRegion {
    /// The transaction-table box of the statement layout at 150 DPI.
    fn default() -> Self {
        Self::new(100, 300, 1300, 700)
    }
}

impl CropRegion {
    pub const fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    pub fn validate(&self) -> Result<(), ShotsError> {
        if self.x2 <= self.x1 || self.y2 <= self.y1 {
            return Err(ShotsError::InvalidConfig(format!(
                "Crop region must satisfy x1 < x2 and y1 < y2, got ({},{},{},{})",
                self.x1, self.y1, self.x2, self.y2
            )));
        }
        Ok(())
    }

    /// Whether the region lies fully inside a `width × height` image. A
    /// region that does not is padded with white when cropped.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x2 <= width && self.y2 <= height
    }
}

impl fmt::Display for CropRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

impl std::str::FromStr for CropRegion {
    type Err = ShotsError;

    /// Parse `"x1,y1,x2,y2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| ShotsError::InvalidConfig(format!("Invalid crop region '{s}': {e}")))?;

        let [x1, y1, x2, y2] = parts[..] else {
            return Err(ShotsError::InvalidConfig(format!(
                "Crop region needs four values x1,y1,x2,y2, got '{s}'"
            )));
        };

        let region = Self::new(x1, y1, x2, y2);
        region.validate()?;
        Ok(region)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How screenshots are arranged in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// Two images per row on a single sheet, label below each. (default)
    #[default]
    Grid,
    /// One worksheet per image, label above it.
    OnePerSheet,
}

impl LayoutMode {
    /// Display width used when none is configured.
    pub fn default_display_width(&self) -> u32 {
        match self {
            LayoutMode::Grid => 300,
            LayoutMode::OnePerSheet => 800,
        }
    }
}

/// Ordering of screenshots in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending by file name. (default)
    #[default]
    Lexicographic,
    /// Ascending by trailing `-N` in the base name (none = 0), then by name.
    NumericSuffix,
}
