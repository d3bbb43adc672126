//! Error types for segmentation runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SegmentationError {
    #[error("cannot list directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no .tif images found in {}", path.display())]
    EmptyDirectory { path: PathBuf },

    #[error("cannot derive output name from {name:?}: {reason}")]
    MalformedName { name: String, reason: &'static str },

    #[error("cannot open raster {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode raster {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: tiff::TiffError,
    },

    #[error("unsupported pixel type {kind} in {} (expected unsigned 8/16-bit)", path.display())]
    UnsupportedPixelType { path: PathBuf, kind: &'static str },

    #[error("raster buffer of {len} samples does not cover {width}x{height} pixels")]
    DimensionMismatch { width: usize, height: usize, len: usize },

    #[error("cannot write table {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SegmentationError>;
