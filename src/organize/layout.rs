//! Pure layout planning: ordering, scaling, grid rows and sheet names.
//!
//! Nothing here touches the filesystem or the workbook, so every placement
//! rule is unit-tested directly.

use crate::config::SortOrder;
use crate::pipeline::input::base_name_of;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;

/// Height of a default Excel row in pixels (15 pt).
pub const DEFAULT_ROW_HEIGHT_PX: u32 = 20;

/// Excel's sheet-name length limit, in characters.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Rows between the label under one grid pair and the next pair's images.
const GRID_SPACER_ROWS: u32 = 2;

/// Extra pixels of column width around each image.
const COLUMN_PADDING_PX: u32 = 20;

/// Characters Excel rejects in sheet names (plus `'`, which complicates
/// internal hyperlinks).
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\', '\''];

static RE_NUMERIC_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(\d+)$").unwrap());

// ── Ordering ─────────────────────────────────────────────────────────────────

/// Sort screenshot paths in place.
pub fn sort_screenshots(paths: &mut [PathBuf], order: SortOrder) {
    match order {
        SortOrder::Lexicographic => paths.sort_by(|a, b| a.file_name().cmp(&b.file_name())),
        SortOrder::NumericSuffix => paths.sort_by(|a, b| {
            let ka = numeric_suffix(&base_name_of(a));
            let kb = numeric_suffix(&base_name_of(b));
            ka.cmp(&kb).then_with(|| a.file_name().cmp(&b.file_name()))
        }),
    }
}

/// Trailing `-N` of a base name, or 0 when there is none.
///
/// `Account Activity-12` → 12, `Account Activity` → 0.
pub fn numeric_suffix(base_name: &str) -> u64 {
    RE_NUMERIC_SUFFIX
        .captures(base_name)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

// ── Scaling ──────────────────────────────────────────────────────────────────

/// Scale `width × height` to `display_width`, preserving aspect ratio.
pub fn scaled_size(width: u32, height: u32, display_width: u32) -> (u32, u32) {
    if width == 0 {
        return (display_width, 0);
    }
    let scale = display_width as f64 / width as f64;
    let h = (height as f64 * scale).round().max(1.0) as u32;
    (display_width, h)
}

/// Default-height rows covered by an image `height_px` tall.
pub fn rows_spanned(height_px: u32) -> u32 {
    height_px.div_ceil(DEFAULT_ROW_HEIGHT_PX).max(1)
}

/// Excel column width (character units) that fits `image_px` plus padding.
pub fn column_width_chars(image_px: u32) -> f64 {
    // Calibri 11 default: one character unit ≈ 7 px.
    (image_px + COLUMN_PADDING_PX) as f64 / 7.0
}

// ── Grid ─────────────────────────────────────────────────────────────────────

/// Position of one image in grid mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: u32,
    pub col: u16,
    /// Row of the filename label, directly under the image.
    pub label_row: u32,
}

/// Lay out images two per row, starting at `first_row`.
///
/// `heights` are the scaled image heights in display order. Each pair
/// occupies as many rows as its taller image, then its labels, then a
/// spacer.
pub fn grid_positions(heights: &[u32], first_row: u32) -> Vec<GridCell> {
    let mut cells = Vec::with_capacity(heights.len());
    let mut row = first_row;

    for pair in heights.chunks(2) {
        let rows = pair.iter().map(|&h| rows_spanned(h)).max().unwrap_or(1);
        for col in 0..pair.len() {
            cells.push(GridCell {
                row,
                col: col as u16,
                label_row: row + rows,
            });
        }
        row += rows + GRID_SPACER_ROWS;
    }

    cells
}

// ── Sheet names ──────────────────────────────────────────────────────────────

/// Make a label usable as an Excel sheet name: forbidden characters
/// dropped, trimmed, at most 31 characters, never empty.
pub fn sanitize_sheet_name(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| !FORBIDDEN_SHEET_CHARS.contains(c) && !c.is_control())
        .collect();
    let truncated: String = cleaned.trim().chars().take(MAX_SHEET_NAME_CHARS).collect();
    let truncated = truncated.trim_end().to_string();

    if truncated.is_empty() {
        "Sheet".to_string()
    } else {
        truncated
    }
}

/// One sheet name per label, unique ignoring case and distinct from
/// `reserved`.
///
/// Collisions (often caused by truncation to 31 characters) get ` (2)`,
/// ` (3)`, … with the base shortened so the result still fits.
pub fn unique_sheet_names<S: AsRef<str>>(labels: &[S], reserved: &[&str]) -> Vec<String> {
    let mut taken: HashSet<String> = reserved.iter().map(|r| r.to_lowercase()).collect();
    let mut names = Vec::with_capacity(labels.len());

    for label in labels {
        let base = sanitize_sheet_name(label.as_ref());
        let mut candidate = base.clone();
        let mut n = 2u32;

        while taken.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
            let stem: String = base.chars().take(keep).collect();
            candidate = format!("{}{}", stem.trim_end(), suffix);
            n += 1;
        }

        taken.insert(candidate.to_lowercase());
        names.push(candidate);
    }

    names
}

/// Internal hyperlink target for the top-left cell of `sheet`.
pub fn internal_link(sheet: &str) -> String {
    format!("internal:'{sheet}'!A1")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn lexicographic_order_of_dates() {
        let mut paths: Vec<PathBuf> = ["2024-01-01.png", "2023-12-31.png", "2024-02-01.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_screenshots(&mut paths, SortOrder::Lexicographic);
        assert_eq!(
            names(&paths),
            vec!["2023-12-31.png", "2024-01-01.png", "2024-02-01.png"]
        );
    }

    #[test]
    fn numeric_suffix_order() {
        let mut paths: Vec<PathBuf> = [
            "Activity-10.png",
            "Activity-2.png",
            "Activity.png",
            "Activity-1.png",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        sort_screenshots(&mut paths, SortOrder::NumericSuffix);
        assert_eq!(
            names(&paths),
            vec![
                "Activity.png",
                "Activity-1.png",
                "Activity-2.png",
                "Activity-10.png"
            ]
        );
    }

    #[test]
    fn numeric_suffix_parsing() {
        assert_eq!(numeric_suffix("Account Activity-12"), 12);
        assert_eq!(numeric_suffix("Account Activity"), 0);
        assert_eq!(numeric_suffix("2024-01-01"), 1);
        assert_eq!(numeric_suffix("x-"), 0);
    }

    #[test]
    fn scaling_preserves_aspect_ratio() {
        assert_eq!(scaled_size(2400, 800, 300), (300, 100));
        assert_eq!(scaled_size(1275, 1650, 800), (800, 1035));
        assert_eq!(scaled_size(100, 50, 300), (300, 150));
    }

    #[test]
    fn rows_spanned_rounds_up() {
        assert_eq!(rows_spanned(100), 5);
        assert_eq!(rows_spanned(101), 6);
        assert_eq!(rows_spanned(0), 1);
    }

    #[test]
    fn grid_pairs_share_rows() {
        // Pair 1: 100px and 160px tall → 8 rows; pair 2: one 40px image.
        let cells = grid_positions(&[100, 160, 40], 2);
        assert_eq!(
            cells,
            vec![
                GridCell { row: 2, col: 0, label_row: 10 },
                GridCell { row: 2, col: 1, label_row: 10 },
                GridCell { row: 12, col: 0, label_row: 14 },
            ]
        );
    }

    #[test]
    fn grid_of_nothing_is_empty() {
        assert!(grid_positions(&[], 0).is_empty());
    }

    #[test]
    fn sanitizes_sheet_names() {
        assert_eq!(sanitize_sheet_name("a/b:c*d?[e]"), "abcde");
        assert_eq!(sanitize_sheet_name("  it's  "), "its");
        assert_eq!(sanitize_sheet_name("???"), "Sheet");
        let long = "American Express - Account Activity-17";
        let s = sanitize_sheet_name(long);
        assert_eq!(s.chars().count(), 31);
        assert!(long.starts_with(&s));
    }

    #[test]
    fn truncation_collisions_get_suffixes() {
        let labels = [
            "American Express - Account Activity-1",
            "American Express - Account Activity-2",
            "american express - account activity-3",
        ];
        let names = unique_sheet_names(&labels, &[]);
        assert_eq!(names[0], "American Express - Account Acti");
        assert_eq!(names[1], "American Express - Account (2)");
        assert_eq!(names[2], "american express - account (3)");
        for n in &names {
            assert!(n.chars().count() <= MAX_SHEET_NAME_CHARS, "{n}");
        }
        let lower: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        assert_eq!(lower.len(), 3);
    }

    #[test]
    fn reserved_names_are_avoided() {
        let names = unique_sheet_names(&["Index", "index", "History"], &["Index", "History"]);
        assert_eq!(names, vec!["Index (2)", "index (3)", "History (2)"]);
    }

    #[test]
    fn internal_link_quotes_sheet() {
        assert_eq!(internal_link("Inv 01"), "internal:'Inv 01'!A1");
    }
}
