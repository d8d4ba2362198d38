//! Input resolution: scan flat directories and validate PDF files.
//!
//! Both batches read a single, non-recursive directory. Listings are sorted
//! by file name so runs are deterministic regardless of the order the
//! filesystem returns entries in.

use crate::error::{FileError, ShotsError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic bytes every PDF starts with.
const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Check that `dir` exists and is a directory.
pub fn ensure_dir(dir: &Path) -> Result<(), ShotsError> {
    if !dir.exists() {
        return Err(ShotsError::InputDirNotFound {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(ShotsError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Create `dir` and any missing parents.
pub fn ensure_output_dir(dir: &Path) -> Result<(), ShotsError> {
    std::fs::create_dir_all(dir).map_err(|e| ShotsError::OutputDirCreateFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// List regular files in `dir` whose extension equals `extension`
/// (ASCII case-insensitive), sorted by file name.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ShotsError> {
    let read_err = |e| ShotsError::DirectoryReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} *.{} files in {}", files.len(), extension, dir.display());
    Ok(files)
}

/// File name (with extension) as a display string.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Base name (file name without its final extension).
pub fn base_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name_of(path))
}

/// Where the screenshot for `pdf_path` lives: same base name, `.png`.
pub fn screenshot_path(pdf_path: &Path, screenshot_dir: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    let mut name = stem;
    name.push(".png");
    screenshot_dir.join(name)
}

/// Verify the file is readable and starts with `%PDF`.
pub fn check_pdf_magic(path: &Path) -> Result<(), FileError> {
    let file = File::open(path).map_err(|e| FileError::Unreadable {
        detail: e.to_string(),
    })?;

    let mut magic = Vec::with_capacity(PDF_MAGIC.len());
    file.take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut magic)
        .map_err(|e| FileError::Unreadable {
            detail: e.to_string(),
        })?;

    if magic.as_slice() != PDF_MAGIC {
        return Err(FileError::NotAPdf { magic });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screenshot_path_keeps_suffixes() {
        let out = Path::new("out");
        assert_eq!(
            screenshot_path(Path::new("in/American Express - Account Activity-1.pdf"), out),
            out.join("American Express - Account Activity-1.png")
        );
        assert_eq!(
            screenshot_path(Path::new("in/2024.01.15 invoice.PDF"), out),
            out.join("2024.01.15 invoice.png")
        );
    }

    #[test]
    fn base_name_strips_only_last_extension() {
        assert_eq!(base_name_of(Path::new("a/b.c.png")), "b.c");
        assert_eq!(file_name_of(Path::new("a/b.c.png")), "b.c.png");
    }

    #[test]
    fn ensure_dir_reports_missing_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            ensure_dir(&missing),
            Err(ShotsError::InputDirNotFound { .. })
        ));

        let file = tmp.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_dir(&file),
            Err(ShotsError::NotADirectory { .. })
        ));

        assert!(ensure_dir(tmp.path()).is_ok());
    }

    #[test]
    fn listing_filters_sorts_and_ignores_subdirs() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "c.txt", "d.pdf.tmp"] {
            std::fs::write(tmp.path().join(name), b"%PDF").unwrap();
        }
        std::fs::create_dir(tmp.path().join("nested.pdf")).unwrap();

        let names: Vec<String> = list_files_with_extension(tmp.path(), "pdf")
            .unwrap()
            .iter()
            .map(|p| file_name_of(p))
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn magic_check() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("good.pdf");
        let bad = tmp.path().join("bad.pdf");
        let short = tmp.path().join("short.pdf");
        std::fs::write(&good, b"%PDF-1.7\n").unwrap();
        std::fs::write(&bad, b"PK\x03\x04rest").unwrap();
        std::fs::write(&short, b"%P").unwrap();

        assert!(check_pdf_magic(&good).is_ok());
        assert_eq!(
            check_pdf_magic(&bad),
            Err(FileError::NotAPdf {
                magic: b"PK\x03\x04".to_vec()
            })
        );
        assert!(matches!(
            check_pdf_magic(&short),
            Err(FileError::NotAPdf { .. })
        ));
        assert!(matches!(
            check_pdf_magic(&tmp.path().join("missing.pdf")),
            Err(FileError::Unreadable { .. })
        ));
    }
}
