//! Path utilities for detecting image assets and their sequence numbers.
//!
//! Local portfolios are folders of sequentially named assets
//! (`1.jpg`, `2.jpg`, ... or `frame-01.jpg`, `frame-02.jpg`, ...). These
//! helpers decide which files are photos and in which order they belong.

use std::path::Path;

/// List of supported image file extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff", "heic"];

/// Check if a path has an image file extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use contactsheet_common::paths::is_image_file;
///
/// assert!(is_image_file(Path::new("frame.jpg")));
/// assert!(is_image_file(Path::new("/path/to/scan.TIFF")));
/// assert!(!is_image_file(Path::new("notes.txt")));
/// ```
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extract the trailing number from a file stem, if any.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use contactsheet_common::paths::sequence_number;
///
/// assert_eq!(sequence_number(Path::new("12.jpg")), Some(12));
/// assert_eq!(sequence_number(Path::new("photo (3).jpg")), Some(3));
/// assert_eq!(sequence_number(Path::new("frame-007.png")), Some(7));
/// assert_eq!(sequence_number(Path::new("cover.jpg")), None);
/// ```
pub fn sequence_number(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let trimmed = stem.trim_end_matches(|c: char| !c.is_ascii_digit());
    let digits: String = trimmed
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    digits.parse().ok()
}

/// Get the list of image file extensions.
#[must_use]
pub fn image_extensions() -> &'static [&'static str] {
    IMAGE_EXTENSIONS
}
