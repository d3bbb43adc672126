//! Flat discovery of input rasters within one directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SegmentationError};

/// Input raster extension (matched exactly, case-sensitive).
pub const RASTER_EXTENSION: &str = "tif";

/// Regular `.tif` files directly under `dir`, sorted lexicographically by path.
/// Hidden files (name starting with `.`, e.g. `._x.tif` AppleDouble sidecars)
/// are skipped. Subdirectories are not descended into. An empty result is not
/// an error here.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source: std::io::Error| SegmentationError::ReadDir { path: dir.to_path_buf(), source };
    let mut images = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let is_raster = path.extension().is_some_and(|e| e == RASTER_EXTENSION);
        if is_raster && path.is_file() && !is_hidden(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('.'))
}
