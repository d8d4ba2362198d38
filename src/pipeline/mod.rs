//! Pipeline stages for the screenshot batch.
//!
//! Each submodule implements exactly one transformation step so each is
//! testable on its own, and the rasteriser can be swapped for a fake in
//! tests without touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ transform ──▶ encode
//! (scan dir) (pdfium)  (crop/zoom)   (PNG, atomic)
//! ```
//!
//! 1. [`input`]     — list `*.pdf` / `*.png` in a flat directory, check magic
//!    bytes, map a PDF to its screenshot path
//! 2. [`render`]    — rasterise page 1 at the configured DPI behind the
//!    [`render::PageRasterizer`] trait
//! 3. [`transform`] — fixed-rectangle crop and Lanczos3 zoom
//! 4. [`encode`]    — PNG-encode to a temp file and rename into place

pub mod encode;
pub mod input;
pub mod render;
pub mod transform;
