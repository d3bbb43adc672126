//! Names derived from image paths: output identifier, row label, plot.

use std::path::Path;

use crate::error::{Result, SegmentationError};

/// Extract the shared identifier from an image file name: the second-to-last
/// `_`-delimited token of the file stem, with any extension-like `.suffix`
/// removed from the token, e.g.:
///   "plots/42/42_20200823T101500_ps2.tif" → "20200823T101500"
///   "A_B.tif"                             → "A"
///   "P_2020.08_x.tif"                     → "2020"
///   "single.tif"                          → error (one token)
pub fn output_identifier(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let malformed = |reason: &'static str| SegmentationError::MalformedName { name: name.clone(), reason };

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| malformed("no UTF-8 file name"))?;

    let tokens: Vec<&str> = stem.split('_').collect();
    if tokens.len() < 2 {
        return Err(malformed("expected at least two '_'-separated tokens"));
    }
    let token = strip_extension(tokens[tokens.len() - 2]);
    if token.is_empty() {
        return Err(malformed("identifier token is empty"));
    }
    Ok(token.to_owned())
}

/// `"2020.08"` → `"2020"`; leading dots are not an extension (`".x"` stays).
fn strip_extension(token: &str) -> &str {
    match token.rfind('.') {
        Some(i) if token[..i].chars().any(|c| c != '.') => &token[..i],
        _ => token,
    }
}

/// Output file name for a table: `{identifier}_segmentation.csv`.
pub fn table_file_name(identifier: &str) -> String {
    format!("{identifier}_segmentation.csv")
}

/// Row label: the image's file name including extension.
pub fn image_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Plot id: the name of the image's parent directory. Parents without a name
/// component (`.`, `..`, bare file names) are resolved on disk first.
pub fn plot_name(path: &Path) -> String {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    if let Some(name) = parent.file_name() {
        return name.to_string_lossy().into_owned();
    }
    parent
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}
