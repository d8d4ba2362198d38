//! XLSX writing with rust_xlsxwriter.
//!
//! Each writer takes validated screenshots in display order and returns one
//! [`Placement`] per screenshot, in the same order. Geometry comes from
//! [`super::layout`]; this module only talks to the workbook.

use super::layout::{self, column_width_chars, grid_positions, internal_link, scaled_size};
use super::Screenshot;
use crate::error::ShotsError;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::debug;

/// Sheet name used in grid mode.
pub const GRID_SHEET_NAME: &str = "Invoice Screenshots";

/// First sheet in one-per-sheet mode, linking to every screenshot.
pub const INDEX_SHEET_NAME: &str = "Index";

/// Sheet written when there is nothing to organise.
pub const NO_DATA_SHEET_NAME: &str = "No Data";

/// Names Excel or this tool already use; screenshot sheets avoid them.
pub const RESERVED_SHEET_NAMES: &[&str] = &[INDEX_SHEET_NAME, "History"];

/// Grid images start below the title and a blank row.
const GRID_FIRST_IMAGE_ROW: u32 = 2;

/// In one-per-sheet mode the label is in A1 and the image starts at A3.
const SHEET_IMAGE_ROW: u32 = 2;

/// Where a screenshot ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub sheet: String,
    pub row: u32,
    pub col: u16,
    /// Displayed size in pixels.
    pub width: u32,
    pub height: u32,
}

// ── Grid ─────────────────────────────────────────────────────────────────────

/// All screenshots on one sheet, two per row, each labelled underneath.
pub fn write_grid(
    workbook: &mut Workbook,
    shots: &[Screenshot],
    display_width: u32,
) -> Result<Vec<Placement>, XlsxError> {
    let sizes: Vec<(u32, u32)> = shots
        .iter()
        .map(|s| scaled_size(s.width, s.height, display_width))
        .collect();
    let heights: Vec<u32> = sizes.iter().map(|&(_, h)| h).collect();
    let cells = grid_positions(&heights, GRID_FIRST_IMAGE_ROW);

    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(GRID_SHEET_NAME)?;
    sheet.write_string_with_format(0, 0, GRID_SHEET_NAME, &bold)?;
    sheet.set_column_width(0, column_width_chars(display_width))?;
    sheet.set_column_width(1, column_width_chars(display_width))?;

    let mut placements = Vec::with_capacity(shots.len());
    for ((shot, cell), &(width, height)) in shots.iter().zip(&cells).zip(&sizes) {
        insert_scaled(sheet, cell.row, cell.col, shot, (width, height))?;
        sheet.write_string(cell.label_row, cell.col, shot.label.as_str())?;
        placements.push(Placement {
            sheet: GRID_SHEET_NAME.to_string(),
            row: cell.row,
            col: cell.col,
            width,
            height,
        });
    }

    debug!(
        "Grid sheet: {} images in {} rows",
        shots.len(),
        shots.len().div_ceil(2)
    );
    Ok(placements)
}

// ── One per sheet ────────────────────────────────────────────────────────────

/// One worksheet per screenshot, named after its base name, optionally
/// preceded by an index sheet of hyperlinks.
pub fn write_one_per_sheet(
    workbook: &mut Workbook,
    shots: &[Screenshot],
    display_width: u32,
    with_index: bool,
) -> Result<Vec<Placement>, XlsxError> {
    let labels: Vec<&str> = shots.iter().map(|s| s.label.as_str()).collect();
    let names = layout::unique_sheet_names(&labels, RESERVED_SHEET_NAMES);
    let bold = Format::new().set_bold();

    if with_index {
        let index = workbook.add_worksheet();
        index.set_name(INDEX_SHEET_NAME)?;
        index.write_string_with_format(0, 0, "Screenshot", &bold)?;
        index.write_string_with_format(0, 1, "Sheet", &bold)?;
        index.set_column_width(0, 50.0)?;
        index.set_column_width(1, 34.0)?;
        for (i, (shot, name)) in shots.iter().zip(&names).enumerate() {
            let row = i as u32 + 1;
            index.write_string(row, 0, shot.file_name.as_str())?;
            index.write_url_with_text(row, 1, internal_link(name).as_str(), name.as_str())?;
        }
    }

    let mut placements = Vec::with_capacity(shots.len());
    for (shot, name) in shots.iter().zip(names) {
        let (width, height) = scaled_size(shot.width, shot.height, display_width);

        let sheet = workbook.add_worksheet();
        sheet.set_name(name.as_str())?;
        sheet.write_string_with_format(0, 0, shot.label.as_str(), &bold)?;
        sheet.set_column_width(0, column_width_chars(display_width))?;
        insert_scaled(sheet, SHEET_IMAGE_ROW, 0, shot, (width, height))?;

        if name != shot.label {
            debug!("{}: sheet renamed to '{}'", shot.file_name, name);
        }
        placements.push(Placement {
            sheet: name,
            row: SHEET_IMAGE_ROW,
            col: 0,
            width,
            height,
        });
    }

    Ok(placements)
}

// ── Empty ────────────────────────────────────────────────────────────────────

/// Single placeholder sheet for a directory with nothing to show.
pub fn write_no_data(workbook: &mut Workbook, screenshot_dir: &Path) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(NO_DATA_SHEET_NAME)?;
    let message = format!("No screenshots found in {}", screenshot_dir.display());
    sheet.write_string(0, 0, message.as_str())?;
    Ok(())
}

// ── Save ─────────────────────────────────────────────────────────────────────

/// Save to `<path>.tmp` and rename, so an existing workbook is replaced
/// only by a complete one.
pub fn save_atomic(workbook: &mut Workbook, path: &Path) -> Result<(), ShotsError> {
    let tmp_path = path.with_extension("xlsx.tmp");
    let write_err = |detail: String| ShotsError::WorkbookWriteFailed {
        path: path.to_path_buf(),
        detail,
    };

    if let Err(e) = workbook.save(&tmp_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_err(e.to_string()));
    }
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        write_err(e.to_string())
    })?;

    debug!("Saved workbook → {}", path.display());
    Ok(())
}

/// Insert `shot` drawn at exactly `size` pixels. Sizing goes through
/// `set_scale_to_size` so a PNG carrying pHYs DPI is not drawn smaller or
/// larger than its placement says.
fn insert_scaled(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    shot: &Screenshot,
    (width, height): (u32, u32),
) -> Result<(), XlsxError> {
    let image = shot.image.clone().set_scale_to_size(width, height, false);
    sheet.insert_image(row, col, &image)?;
    Ok(())
}
